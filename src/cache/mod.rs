/// Strategies deciding when a pass can skip its offscreen texture.
pub mod bypass;
/// Persistent render-pass texture cache.
pub mod pass_textures;
/// Texture handles and the allocator contract.
pub mod texture;
