//! Projection, window and space-conversion helpers.
//!
//! Draw space is the coordinate system of the render pass being drawn (its `output_rect`).
//! Window space is pixel coordinates of the bound framebuffer; when the framebuffer stores rows
//! bottom-up the y axis is flipped against the framebuffer height.

use crate::foundation::core::{Point, Rect, Size, Vec2};
use crate::transform::matrix::Transform3d;

/// Orthographic projection mapping the rectangle to the canonical clip square.
///
/// Depth always collapses to zero because no depth buffer is used. Zero width or height yields
/// the identity instead of dividing by zero.
pub fn ortho_projection(left: f64, right: f64, bottom: f64, top: f64) -> Transform3d {
    let delta_x = right - left;
    let delta_y = top - bottom;
    if delta_x == 0.0 || delta_y == 0.0 {
        return Transform3d::IDENTITY;
    }
    let mut proj = Transform3d::IDENTITY;
    proj.cols[0][0] = 2.0 / delta_x;
    proj.cols[3][0] = -(right + left) / delta_x;
    proj.cols[1][1] = 2.0 / delta_y;
    proj.cols[3][1] = -(top + bottom) / delta_y;
    proj.cols[2][2] = 0.0;
    proj
}

/// Map canonical clip space (`[-1, 1]²`) to window pixels at the given offset and size.
pub fn window_matrix(x: f64, y: f64, width: f64, height: f64) -> Transform3d {
    // Window position and pixel scale, then [-1, 1] -> [0, 1].
    Transform3d::from_translation(x, y, 0.0)
        .pre_scale(width, height, 0.0)
        .pre_translate(0.5, 0.5, 0.5)
        .pre_scale(0.5, 0.5, 0.5)
}

/// The unit quad every draw places with [`quad_rect_transform`].
pub fn quad_vertex_rect() -> Rect {
    Rect::new(-0.5, -0.5, 0.5, 0.5)
}

/// Compose `quad_transform` with the translate+scale that stretches the unit quad onto
/// `quad_rect`.
pub fn quad_rect_transform(quad_transform: Transform3d, quad_rect: Rect) -> Transform3d {
    quad_transform
        .pre_translate(
            0.5 * quad_rect.width() + quad_rect.x0,
            0.5 * quad_rect.height() + quad_rect.y0,
            0.0,
        )
        .pre_scale(quad_rect.width(), quad_rect.height(), 1.0)
}

/// Space mapping for the render pass currently bound.
///
/// Only valid while that pass is the active one; the compositor replaces it on every bind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    /// The pass output rect, in draw space.
    pub draw_rect: Rect,
    /// Where draw space lands in the framebuffer, before any flip.
    pub viewport_rect: Rect,
    /// Size of the bound framebuffer.
    pub surface_size: Size,
    /// The device viewport (`0,0 .. viewport size`) of the whole frame.
    pub device_viewport_rect: Rect,
    /// Whether the bound framebuffer stores rows bottom-up.
    pub flipped: bool,
    /// Whether the bound pass is the root pass.
    pub is_root: bool,
}

impl ViewportState {
    /// Projection matrix for the bound pass (flips y when the framebuffer is flipped).
    pub fn projection_matrix(&self) -> Transform3d {
        let d = self.draw_rect;
        if self.flipped {
            ortho_projection(d.x0, d.x1, d.y1, d.y0)
        } else {
            ortho_projection(d.x0, d.x1, d.y0, d.y1)
        }
    }

    /// Viewport rect in window space (flipped when the framebuffer is flipped).
    pub fn window_space_viewport(&self) -> Rect {
        self.flip_if_needed(self.viewport_rect)
    }

    /// Window matrix for the bound pass.
    pub fn window_matrix(&self) -> Transform3d {
        let w = self.window_space_viewport();
        window_matrix(w.x0, w.y0, w.width(), w.height())
    }

    /// Move a draw-space rect into window space.
    pub fn move_from_draw_to_window_space(&self, draw_rect: Rect) -> Rect {
        let offset = self.viewport_rect.origin() - self.draw_rect.origin();
        self.flip_if_needed(draw_rect + offset)
    }

    /// Inverse of [`Self::move_from_draw_to_window_space`].
    pub fn move_from_window_to_draw_space(&self, window_rect: Rect) -> Rect {
        let offset = self.draw_rect.origin() - self.viewport_rect.origin();
        self.flip_if_needed(window_rect) + offset
    }

    /// The device viewport expressed in draw space.
    pub fn device_viewport_rect_in_draw_space(&self) -> Rect {
        self.device_viewport_rect + self.draw_offset()
    }

    /// The whole bound framebuffer expressed in draw space.
    ///
    /// For offscreen passes that is simply the pass output rect.
    pub fn output_surface_rect_in_draw_space(&self) -> Rect {
        if self.is_root {
            Rect::from_origin_size(Point::ORIGIN, self.surface_size) + self.draw_offset()
        } else {
            self.draw_rect
        }
    }

    fn draw_offset(&self) -> Vec2 {
        self.draw_rect.origin() - self.viewport_rect.origin()
    }

    fn flip_if_needed(&self, r: Rect) -> Rect {
        if !self.flipped {
            return r;
        }
        let h = self.surface_size.height;
        Rect::new(r.x0, h - r.y1, r.x1, h - r.y0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/coords.rs"]
mod tests;
