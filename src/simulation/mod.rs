//! Blob-field physics and rasterization.
//!
//! A field of soft blobs drifts, damps and bounces inside the unit square.
//! Each step renders the field into an RGBA pixel buffer that the
//! conditioning stage samples. Visual fidelity does not matter here; what
//! matters is that consecutive frames differ in ways that are hard to
//! predict without the simulator's private random stream.

mod blob;
mod color;
mod field;
mod frame;
mod render;

pub use blob::Blob;
pub use color::{ColorMode, Rgb};
pub use field::{BlobField, FieldConfig, DAMPING};
pub use frame::PixelBuffer;
pub use render::render;
