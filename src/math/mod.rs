pub mod blob;
pub mod vector;

pub use blob::Blob;
