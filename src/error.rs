use thiserror::Error;

pub type LivelineResult<T> = Result<T, LivelineError>;

#[derive(Debug, Error)]
pub enum LivelineError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("render backend error: {0}")]
    Backend(String),
}
