use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid settings at `{path}`: {message}")]
    InvalidSettings { path: String, message: String },

    /// A user style function returned something other than a style object.
    #[error("{found} instead of style object")]
    InvalidStyle { found: String },

    #[error("user function failed: {0}")]
    UserFunction(String),

    #[error("subscription failure: {0}")]
    Subscription(String),

    #[error("rendering backend failure: {0}")]
    Backend(String),

    #[error("chart has been destroyed")]
    Destroyed,
}
