pub use kurbo::{Point, Rect, Size, Vec2};

/// Stable identifier of a render pass, unique within one frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RenderPassId(pub u64);

/// Opaque handle to an upstream-owned resource (tile, video frame, ...).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ResourceId(pub u64);

/// Integer pixel dimensions of a texture or viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl PixelSize {
    /// Build a size from width and height.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Smallest pixel size that covers `size` (fractional extents round up).
    pub fn covering(size: Size) -> Self {
        fn ceil_px(v: f64) -> u32 {
            if v.is_finite() && v > 0.0 {
                v.ceil().min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        }
        Self {
            width: ceil_px(size.width),
            height: ceil_px(size.height),
        }
    }

    /// `true` when either dimension is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when both dimensions are at least those of `other`.
    pub fn contains(self, other: PixelSize) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Grow both dimensions by `amount`, saturating.
    pub fn enlarged(self, amount: PixelSize) -> Self {
        Self {
            width: self.width.saturating_add(amount.width),
            height: self.height.saturating_add(amount.height),
        }
    }

    /// Convert to a floating point [`Size`].
    pub fn to_size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Rect of this size anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.to_size())
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 to premultiplied form.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// `true` when alpha is 255.
    pub fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }
}

/// Color space of the device output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Standard sRGB.
    #[default]
    Srgb,
    /// Display P3 primaries with the sRGB transfer function.
    DisplayP3,
    /// Linear extended-range sRGB, typically backed by half-float targets.
    ExtendedSrgbLinear,
}

/// Pixel format of a texture or overlay buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// 8-bit RGBA.
    #[default]
    Rgba8,
    /// 8-bit BGRA.
    Bgra8,
    /// 16-bit float RGBA.
    Rgba16F,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
