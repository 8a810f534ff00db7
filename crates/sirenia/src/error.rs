#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("barnes-hut theta must lie in [0, 1], got {theta}")]
    InvalidTheta { theta: f64 },
    #[error("region must have a finite, positive extent, got {width}x{height}")]
    DegenerateRegion { width: f64, height: f64 },
    #[error("point ({x}, {y}) lies outside the indexed region")]
    PointOutsideRegion { x: f64, y: f64 },
    #[error("invalid value for option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
