use thiserror::Error;

/// Errors that can occur while extracting a recipe
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A located Recipe node lacks a field the mapper cannot do without
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// An ld+json script block is not valid JSON
    #[error("Malformed structured data: {0}")]
    MalformedStructuredData(String),

    /// Every extraction strategy was exhausted
    #[error("No recipe found at {0}")]
    NoRecipeFound(String),

    /// Failed to fetch the page
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The page answered with a non-success status
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Error building HTTP headers from configuration
    #[error("Header parse error: {0}")]
    HeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Failed to read a local HTML file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether the orchestrator absorbs this error and moves on to the next strategy
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::MissingRequiredField(_) | ExtractError::MalformedStructuredData(_)
        )
    }
}
