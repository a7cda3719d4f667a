pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod pipelines;
pub mod text;

pub use config::{ExtractionConfig, FetchConfig, Settings};
pub use error::ExtractError;
pub use model::{ExtractionMethod, ParsedRecipe, Rating, Recipe};
pub use pipelines::RecipeExtractor;

/// Extract a recipe from an HTML document with the default configuration.
///
/// `source_url` is the page's address; it is never fetched, only recorded and
/// used for the author fallback.
///
/// # Example
/// ```
/// let html = r#"<script type="application/ld+json">
///     {"@type": "Recipe", "name": "Toast", "recipeIngredient": ["1 slice bread"]}
/// </script>"#;
/// let recipe = recipe_extract::extract_recipe(html, "https://www.example.com/toast").unwrap();
/// assert_eq!(recipe.name, "Toast");
/// assert_eq!(recipe.author, "example.com");
/// ```
pub fn extract_recipe(html: &str, source_url: &str) -> Result<Recipe, ExtractError> {
    RecipeExtractor::default().extract(html, source_url)
}

/// Fetch a page and extract its recipe.
pub async fn extract_recipe_from_url(url: &str, settings: &Settings) -> Result<Recipe, ExtractError> {
    pipelines::url::process(url, settings).await
}
