use crate::foundation::core::{ColorSpace, PixelSize, TextureFormat};
use crate::foundation::error::CompositorResult;

/// Handle to a texture owned by a [`TextureAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

/// Usage bits a texture was (or must be) allocated with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureHint {
    /// Usable as a framebuffer attachment.
    pub framebuffer: bool,
    /// Has storage for a mip chain.
    pub mipmap: bool,
}

impl TextureHint {
    /// Render target without mipmaps.
    pub const FRAMEBUFFER: Self = Self {
        framebuffer: true,
        mipmap: false,
    };

    /// Same hint with the mipmap bit set to `mipmap`.
    pub fn with_mipmap(mut self, mipmap: bool) -> Self {
        self.mipmap = mipmap;
        self
    }

    /// `true` when every bit set in `required` is also set here.
    pub fn covers(self, required: TextureHint) -> bool {
        (self.framebuffer || !required.framebuffer) && (self.mipmap || !required.mipmap)
    }
}

/// Everything an allocator needs to create a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Pixel dimensions.
    pub size: PixelSize,
    /// Usage bits.
    pub hint: TextureHint,
    /// Storage format.
    pub format: TextureFormat,
    /// Color space the content is encoded in.
    pub color_space: ColorSpace,
}

impl TextureDesc {
    /// `true` when a texture allocated as `self` can stand in for `required`.
    pub fn satisfies(&self, required: &TextureDesc) -> bool {
        self.size.contains(required.size)
            && self.hint.covers(required.hint)
            && self.format == required.format
            && self.color_space == required.color_space
    }
}

/// GPU resource allocator backing offscreen pass textures.
pub trait TextureAllocator {
    /// Allocate a texture; failure drops only the pass that asked for it.
    fn allocate_texture(&mut self, desc: &TextureDesc) -> CompositorResult<TextureId>;

    /// Release a texture previously returned by [`Self::allocate_texture`].
    fn free_texture(&mut self, id: TextureId);
}
