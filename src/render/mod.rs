//! CPU raster primitives used by the compositor.

pub mod blend;
pub mod blur;
pub mod crop;
pub mod raster;
