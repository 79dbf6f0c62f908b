/// Target-space polygons and plane splitting.
pub mod polygon;
/// Arena BSP tree and back-to-front traversal.
pub mod tree;
