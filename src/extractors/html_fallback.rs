use super::author::usable_author;
use super::html_class::{self, ClassField};
use super::json_ld::sum_minutes;
use super::meta::{document_title, meta_content};
use super::microdata::MicrodataScope;
use super::{dedup_lines, element_text, normalize_ingredient_lines, Extractor, ParsingContext};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::model::{ExtractionMethod, ParsedRecipe, Rating};
use crate::text::{
    clean_title, collapse_whitespace, decode_entities, filter_editorial_notes, format_diet,
    parse_iso_duration, strip_title_site_suffix,
};
use log::debug;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("Invalid h1 selector"));

/// The lookups available to every field strategy
struct Sources<'a> {
    document: &'a Html,
    microdata: MicrodataScope<'a>,
    max_author_len: usize,
}

type TextStrategy = fn(&Sources<'_>) -> Option<String>;
type ListStrategy = fn(&Sources<'_>) -> Vec<String>;

const NAME: &[TextStrategy] = &[
    |s| s.microdata.text("name"),
    |s| {
        meta_content(s.document, &["og:title", "twitter:title"])
            .map(|title| strip_title_site_suffix(&title).to_string())
    },
    |s| s.document.select(&H1_SELECTOR).map(element_text).find(|t| !t.is_empty()),
    |s| html_class::find_text(s.document, ClassField::Title),
    |s| document_title(s.document).map(|title| strip_title_site_suffix(&title).to_string()),
];

const DESCRIPTION: &[TextStrategy] = &[
    |s| s.microdata.text("description"),
    |s| meta_content(s.document, &["og:description", "twitter:description", "description"]),
    |s| html_class::find_text(s.document, ClassField::Description),
];

const IMAGE: &[TextStrategy] = &[
    |s| s.microdata.image(),
    |s| meta_content(s.document, &["og:image", "og:image:url", "twitter:image"]),
];

const AUTHOR: &[TextStrategy] = &[
    |s| {
        s.microdata
            .text("author")
            .and_then(|author| usable_author(&author, s.max_author_len))
    },
    |s| {
        html_class::find_text(s.document, ClassField::Author)
            .and_then(|author| usable_author(&author, s.max_author_len))
    },
];

const SERVINGS: &[TextStrategy] = &[
    |s| s.microdata.text("recipeYield"),
    |s| html_class::find_text(s.document, ClassField::Servings),
];

const CUISINE: &[TextStrategy] = &[
    |s| s.microdata.text("recipeCuisine"),
    |s| html_class::find_text(s.document, ClassField::Cuisine),
];

const CATEGORY: &[TextStrategy] = &[
    |s| s.microdata.text("recipeCategory"),
    |s| html_class::find_text(s.document, ClassField::Category),
];

const COOKING_METHOD: &[TextStrategy] = &[|s| s.microdata.text("cookingMethod")];

const INGREDIENTS: &[ListStrategy] = &[
    |s| s.microdata.texts("recipeIngredient"),
    |s| s.microdata.texts("ingredients"),
    |s| html_class::find_list(s.document, ClassField::Ingredients),
];

const INSTRUCTIONS: &[ListStrategy] = &[
    |s| s.microdata.lines("recipeInstructions"),
    |s| html_class::find_list(s.document, ClassField::Instructions),
];

fn first_text(sources: &Sources<'_>, chain: &[TextStrategy]) -> Option<String> {
    chain
        .iter()
        .filter_map(|strategy| strategy(sources))
        .map(|text| collapse_whitespace(&decode_entities(&text)))
        .find(|text| !text.is_empty())
}

fn first_list(sources: &Sources<'_>, chain: &[ListStrategy]) -> Vec<String> {
    chain
        .iter()
        .map(|strategy| strategy(sources))
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// Reconstructs a recipe from microdata, meta tags and CSS class conventions
pub struct HtmlFallbackExtractor {
    config: ExtractionConfig,
}

impl HtmlFallbackExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, document: &Html, source_url: &str) -> Option<ParsedRecipe> {
        let sources = Sources {
            document,
            microdata: MicrodataScope::find(document),
            max_author_len: self.config.max_author_len,
        };

        let ingredients = normalize_ingredient_lines(
            first_list(&sources, INGREDIENTS),
            self.config.normalize_fractions,
        );
        let instructions = filter_editorial_notes(first_list(&sources, INSTRUCTIONS));
        if ingredients.is_empty() && instructions.is_empty() {
            debug!("HtmlFallbackExtractor: no ingredients or instructions found");
            return None;
        }

        let Some(name) = first_text(&sources, NAME)
            .map(|name| clean_title(&name))
            .filter(|name| !name.is_empty())
        else {
            debug!("HtmlFallbackExtractor: no recipe name found");
            return None;
        };

        let mut recipe = ParsedRecipe::new(name, source_url, ExtractionMethod::HtmlFallback);
        recipe.ingredients = ingredients;
        recipe.instructions = instructions;
        recipe.description = first_text(&sources, DESCRIPTION);
        recipe.image_url = first_text(&sources, IMAGE);
        recipe.author = first_text(&sources, AUTHOR);
        recipe.servings = first_text(&sources, SERVINGS);
        recipe.cuisine = first_text(&sources, CUISINE);
        recipe.category = first_text(&sources, CATEGORY);
        recipe.keywords = keywords(&sources);
        recipe.rating = rating(&sources);
        recipe.equipment = dedup_lines(sources.microdata.texts("tool"));
        recipe.dietary_restrictions = dedup_lines(
            sources
                .microdata
                .attr_values("suitableForDiet")
                .iter()
                .map(|diet| format_diet(diet))
                .filter(|diet| !diet.is_empty())
                .collect(),
        );
        recipe.cooking_method = first_text(&sources, COOKING_METHOD);
        recipe.nutrients = sources.microdata.nutrition();

        let duration =
            |prop: &str| sources.microdata.machine_value(prop).as_deref().and_then(parse_iso_duration);
        recipe.prep_time_minutes = duration("prepTime");
        recipe.cook_time_minutes = duration("cookTime");
        recipe.total_time_minutes = duration("totalTime")
            .or_else(|| sum_minutes(recipe.prep_time_minutes, recipe.cook_time_minutes));

        debug!(
            "HtmlFallbackExtractor: extracted {} with {} ingredients and {} instructions",
            recipe.name,
            recipe.ingredients.len(),
            recipe.instructions.len()
        );
        Some(recipe)
    }
}

impl Default for HtmlFallbackExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl Extractor for HtmlFallbackExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, ExtractError> {
        self.extract(&context.document, &context.url)
            .ok_or_else(|| ExtractError::NoRecipeFound(context.url.clone()))
    }
}

/// Run the HTML fallback with the default configuration.
pub fn extract_from_html(document: &Html, source_url: &str) -> Option<ParsedRecipe> {
    HtmlFallbackExtractor::default().extract(document, source_url)
}

fn keywords(sources: &Sources<'_>) -> Vec<String> {
    sources
        .microdata
        .text("keywords")
        .map(|keywords| {
            keywords
                .split(',')
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn rating(sources: &Sources<'_>) -> Option<Rating> {
    let value = sources
        .microdata
        .nested_text("ratingValue")?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)?;
    let count = ["ratingCount", "reviewCount"]
        .iter()
        .filter_map(|prop| sources.microdata.nested_text(prop))
        .find_map(|count| count.replace(',', "").parse::<u32>().ok());
    Some(Rating { value, count })
}
