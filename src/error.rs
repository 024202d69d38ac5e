use thiserror::Error;

// Engine error type. Seeded misses and empty extraction results are ordinary
// outcomes (None / empty list), not errors; only precondition violations and
// raster decoding land here.

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Empty raster: {width}x{height}")]
    EmptyRaster { width: u32, height: u32 },
    #[error("Image Error: {0}")]
    ImageError(#[from] image::ImageError),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}
