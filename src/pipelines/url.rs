use crate::config::Settings;
use crate::error::ExtractError;
use crate::fetchers::RequestFetcher;
use crate::model::Recipe;
use crate::pipelines::RecipeExtractor;

/// Fetch `url` and extract a recipe from the returned page.
///
/// The fetched body is parsed only after the request completes, so no parsed
/// document is held across an await point.
pub async fn process(url: &str, settings: &Settings) -> Result<Recipe, ExtractError> {
    let fetcher = RequestFetcher::new(&settings.fetch)?;
    let html = fetcher.fetch(url).await?;

    RecipeExtractor::new(settings.extraction.clone()).extract(&html, url)
}
