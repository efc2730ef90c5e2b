use thiserror::Error;

#[derive(Debug, Error)]
pub enum JigsawError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid grid: {rows} rows x {columns} columns")]
    InvalidGrid { rows: u32, columns: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Source image {width}x{height} is smaller than one {piece_size}px piece")]
    ImageTooSmall {
        width: u32,
        height: u32,
        piece_size: u32,
    },
    #[error("Largest atlas ({atlas_size}px) cannot hold a single {unit_size}px unit")]
    ZeroCapacity { atlas_size: u32, unit_size: u32 },
    #[error(
        "Atlas {atlas_index} ({size}px) asked to hold {requested} pieces, capacity is {capacity}"
    )]
    OverCapacity {
        atlas_index: usize,
        size: u32,
        requested: usize,
        capacity: usize,
    },
    #[error("Mask '{key}' for {kind} piece at row {row}, column {column} unavailable: {reason}")]
    MaskUnavailable {
        row: u32,
        column: u32,
        kind: String,
        key: String,
        reason: String,
    },
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, JigsawError>;
