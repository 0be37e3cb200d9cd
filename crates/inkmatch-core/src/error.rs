use crate::PixelRect;

/// Errors raised when a raw pixel buffer cannot be interpreted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("rectangle {rect:?} does not fit a {width}x{height} image")]
    RectOutOfBounds {
        rect: PixelRect,
        width: usize,
        height: usize,
    },
}
