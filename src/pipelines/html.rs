use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extractors::meta::{meta_content, page_info};
use crate::extractors::{
    AuthorResolver, Extractor, HtmlFallbackExtractor, JsonLdExtractor, ParsingContext,
};
use crate::model::Recipe;
use log::debug;

/// Runs the extraction strategies over one HTML document
///
/// This pipeline:
/// 1. Parses the HTML once
/// 2. Tries the JSON-LD extractor, then the HTML fallback extractor
/// 3. Fills a missing image from the page's social meta tags
/// 4. Resolves the author and completes the `Recipe`
pub struct RecipeExtractor {
    config: ExtractionConfig,
}

impl RecipeExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract a recipe from `html`, using `source_url` for provenance and fallbacks.
    ///
    /// Every strategy failure is absorbed; only total exhaustion is reported,
    /// as `NoRecipeFound`.
    pub fn extract(&self, html: &str, source_url: &str) -> Result<Recipe, ExtractError> {
        let context = ParsingContext::new(html, source_url);

        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(JsonLdExtractor::new(self.config.clone())),
            Box::new(HtmlFallbackExtractor::new(self.config.clone())),
        ];

        let mut parsed = None;
        for extractor in extractors {
            match extractor.parse(&context) {
                Ok(recipe) if recipe.has_content() => {
                    parsed = Some(recipe);
                    break;
                }
                Ok(_) => debug!("RecipeExtractor: Strategy produced an empty recipe"),
                Err(e) if e.is_recoverable() => {
                    debug!("RecipeExtractor: Skipping unusable structured data: {}", e)
                }
                Err(e) => debug!("RecipeExtractor: Strategy found nothing: {}", e),
            }
        }

        let Some(mut parsed) = parsed else {
            return Err(ExtractError::NoRecipeFound(source_url.to_string()));
        };

        if parsed.image_url.is_none() && self.config.image_meta_fallback {
            parsed.image_url = meta_content(&context.document, &["og:image", "twitter:image"]);
        }

        let author = AuthorResolver::new(&self.config).resolve(&parsed, &context.document);
        let page = page_info(&context.document, source_url);

        parsed
            .finalize(author, page)
            .ok_or_else(|| ExtractError::NoRecipeFound(source_url.to_string()))
    }
}

impl Default for RecipeExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
