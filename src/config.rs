use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level settings for the extractor and its fetch collaborator
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// HTTP fetching (used only when extracting from a URL)
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction tuning
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Configuration for fetching recipe pages
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept header
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Accept-Language header
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
        }
    }
}

/// Configuration for the extraction strategies
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Absolute recursion bound for the JSON-LD graph search
    #[serde(default = "default_max_graph_depth")]
    pub max_graph_depth: usize,
    /// Longest `og:site_name` accepted as an author fallback
    #[serde(default = "default_site_name_max_len")]
    pub site_name_max_len: usize,
    /// Longest HTML author candidate accepted before it is treated as page noise
    #[serde(default = "default_max_author_len")]
    pub max_author_len: usize,
    /// Rewrite unicode vulgar fractions in ingredient lines
    #[serde(default)]
    pub normalize_fractions: bool,
    /// Fill a missing image from `og:image` / `twitter:image`
    #[serde(default = "default_true")]
    pub image_meta_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_graph_depth: default_max_graph_depth(),
            site_name_max_len: default_site_name_max_len(),
            max_author_len: default_max_author_len(),
            normalize_fractions: false,
            image_meta_fallback: true,
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_max_graph_depth() -> usize {
    64
}

fn default_site_name_max_len() -> usize {
    50
}

fn default_max_author_len() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_EXTRACT__ prefix
    /// 2. recipe-extract.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_EXTRACT__FETCH__TIMEOUT_SECS
    pub fn load() -> Result<Self, ConfigError> {
        load_settings()
    }
}

/// Load settings from file and environment variables
///
/// See [`Settings::load`] for the precedence rules.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe-extract").required(false))
        // Use double underscore for nested: RECIPE_EXTRACT__EXTRACTION__MAX_GRAPH_DEPTH
        .add_source(
            Environment::with_prefix("RECIPE_EXTRACT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
