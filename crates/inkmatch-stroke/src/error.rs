/// Why no signature stroke could be isolated.
///
/// These are expected outcomes on blank or cluttered crops, not faults.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("region {width}x{height} is too small to analyze")]
    RegionTooSmall { width: usize, height: usize },

    #[error("no ink survived thresholding and cleanup")]
    NoInk,

    #[error("dominant blob covers {area} px (minimum {min})")]
    BlobTooSmall { area: usize, min: usize },

    #[error("dominant blob covers {area} of {total} px (limit {limit}); background captured")]
    BackgroundCaptured {
        area: usize,
        limit: usize,
        total: usize,
    },

    #[error("dominant blob holds {area} stroke px (minimum {min})")]
    TooFewStrokePixels { area: usize, min: usize },

    #[error("no signature detected after {attempts} contrast attempts (last: {last})")]
    NoSignature {
        attempts: usize,
        last: Box<ExtractError>,
    },
}
