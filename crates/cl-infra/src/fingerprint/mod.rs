mod blake3_fingerprinter;
mod thumbnail;

pub use blake3_fingerprinter::Blake3Fingerprinter;
pub use thumbnail::THUMBNAIL_EDGE;
