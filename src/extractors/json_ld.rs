use super::graph::{IdIndex, RecipeLocator};
use super::{dedup_lines, normalize_ingredient_lines, Extractor, ParsingContext};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::model::{ExtractionMethod, ParsedRecipe, Rating};
use crate::text::{
    clean_title, collapse_whitespace, decode_entities, format_diet, normalize_fractions,
    parse_iso_duration,
};
use log::debug;
use scraper::Selector;
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static JSON_LD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("Invalid JSON-LD selector")
});

/// JSON-LD vocabulary that sometimes leaks into instruction lists as bare strings
const JSON_LD_KEYWORDS: [&str; 13] = [
    "@type",
    "@context",
    "type",
    "text",
    "url",
    "name",
    "image",
    "video",
    "position",
    "howto",
    "howtostep",
    "howtosection",
    "itemlistelement",
];

pub struct JsonLdExtractor {
    config: ExtractionConfig,
}

impl JsonLdExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Default for JsonLdExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl Extractor for JsonLdExtractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, ExtractError> {
        debug!("JsonLdExtractor: Starting parse for URL: {}", context.url);
        let mut last_error = None;

        // Try each script element until we find a valid recipe
        for (index, script) in context.document.select(&JSON_LD_SELECTOR).enumerate() {
            let raw_json: String = script.text().collect();

            let json_ld = match parse_json_ld(&raw_json) {
                Ok(value) => value,
                Err(e) => {
                    debug!("JsonLdExtractor: Skipping script {}: {}", index, e);
                    last_error = Some(e);
                    continue;
                }
            };

            let ids = IdIndex::with_max_depth(&json_ld, self.config.max_graph_depth);
            if !ids.is_empty() {
                debug!("JsonLdExtractor: Script {} has {} identified nodes", index, ids.len());
            }
            let Some(node) = RecipeLocator::new(&ids, self.config.max_graph_depth).find(&json_ld)
            else {
                debug!("JsonLdExtractor: No Recipe node in script {}", index);
                continue;
            };

            match map_recipe_node_with(node, &ids, &context.url) {
                Ok(mut recipe) if recipe.has_content() => {
                    debug!("JsonLdExtractor: Mapped recipe from script {}", index);
                    if self.config.normalize_fractions {
                        recipe.ingredients =
                            recipe.ingredients.iter().map(|line| normalize_fractions(line)).collect();
                    }
                    return Ok(recipe);
                }
                Ok(_) => {
                    debug!("JsonLdExtractor: Recipe in script {} has no ingredients or instructions", index);
                    last_error = Some(ExtractError::MissingRequiredField(
                        "recipeIngredient or recipeInstructions".to_string(),
                    ));
                }
                Err(e) => {
                    debug!("JsonLdExtractor: Failed to map recipe in script {}: {}", index, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExtractError::NoRecipeFound(context.url.clone())))
    }
}

/// Parse the text of one ld+json script block.
pub fn parse_json_ld(raw: &str) -> Result<Value, ExtractError> {
    let cleaned = sanitize_json(raw);
    serde_json::from_str(&cleaned).map_err(|e| ExtractError::MalformedStructuredData(e.to_string()))
}

/// Escape raw control characters inside string literals and drop comment
/// wrappers some CMSs put around the block.
fn sanitize_json(json: &str) -> String {
    let trimmed = json
        .trim()
        .trim_start_matches("<!--")
        .trim_end_matches("-->")
        .trim();

    let mut result = String::with_capacity(trimmed.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in trimmed.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    result.push(c);
                }
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c if c.is_control() => {}
                _ => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    result
}

/// Map a located Recipe node into a [`ParsedRecipe`].
pub fn map_recipe_node(node: &Value, source_url: &str) -> Result<ParsedRecipe, ExtractError> {
    map_recipe_node_with(node, &IdIndex::default(), source_url)
}

/// Map a Recipe node, following `@id` references through `ids`.
pub fn map_recipe_node_with<'a>(
    node: &'a Value,
    ids: &IdIndex<'a>,
    source_url: &str,
) -> Result<ParsedRecipe, ExtractError> {
    let name = match node.get("name") {
        Some(Value::String(name)) => clean_title(&collapse_whitespace(&decode_entities(name))),
        _ => return Err(ExtractError::MissingRequiredField("name".to_string())),
    };
    if name.is_empty() {
        return Err(ExtractError::MissingRequiredField("name".to_string()));
    }

    let mut recipe = ParsedRecipe::new(name, source_url, ExtractionMethod::StructuredData);

    recipe.author = field::<AuthorField>(node, "author")
        .and_then(|author| author.resolve_name(ids))
        .or_else(|| field::<AuthorField>(node, "publisher").and_then(|p| p.resolve_name(ids)));

    let prep = string_field(node, "prepTime").and_then(parse_iso_duration);
    let cook = string_field(node, "cookTime").and_then(parse_iso_duration);
    recipe.prep_time_minutes = prep;
    recipe.cook_time_minutes = cook;
    recipe.total_time_minutes = string_field(node, "totalTime")
        .and_then(parse_iso_duration)
        .or_else(|| sum_minutes(prep, cook));

    recipe.servings = field::<YieldField>(node, "recipeYield").and_then(YieldField::into_servings);
    recipe.image_url = field::<ImageField>(node, "image")
        .and_then(ImageField::best_url)
        .map(|url| decode_entities(url.trim()));

    recipe.ingredients = field::<StepsField>(node, "recipeIngredient")
        .or_else(|| field::<StepsField>(node, "ingredients"))
        .map(|lines| normalize_ingredient_lines(lines.into_lines(), false))
        .unwrap_or_default();
    recipe.instructions = field::<StepsField>(node, "recipeInstructions")
        .map(StepsField::into_lines)
        .unwrap_or_default()
        .into_iter()
        .filter(|step| !is_json_ld_keyword(step))
        .collect();

    recipe.description = text_field(node, "description");
    recipe.cuisine = text_field(node, "recipeCuisine");
    recipe.category = text_field(node, "recipeCategory");
    recipe.keywords = field::<KeywordsField>(node, "keywords")
        .map(KeywordsField::into_keywords)
        .unwrap_or_default();
    // aggregateRating is occasionally a reference into @graph
    recipe.rating = node
        .get("aggregateRating")
        .map(|rating| ids.resolve(rating))
        .and_then(|rating| AggregateRating::deserialize(rating).ok())
        .and_then(AggregateRating::into_rating);

    recipe.equipment = dedup_lines(texts_field(node, "tool"));
    recipe.dietary_restrictions = dedup_lines(
        texts_field(node, "suitableForDiet")
            .iter()
            .map(|diet| format_diet(diet))
            .filter(|diet| !diet.is_empty())
            .collect(),
    );
    recipe.cooking_method = text_field(node, "cookingMethod");
    recipe.nutrients = node
        .get("nutrition")
        .map(|nutrition| nutrition_facts(ids.resolve(nutrition)))
        .unwrap_or_default();

    Ok(recipe)
}

/// Sum of two optional durations; absent when neither is present or the sum is zero
pub(crate) fn sum_minutes(prep: Option<u32>, cook: Option<u32>) -> Option<u32> {
    if prep.is_none() && cook.is_none() {
        return None;
    }
    let total = prep.unwrap_or(0).saturating_add(cook.unwrap_or(0));
    (total > 0).then_some(total)
}

fn field<'de, T: Deserialize<'de>>(node: &'de Value, key: &str) -> Option<T> {
    node.get(key).and_then(|value| T::deserialize(value).ok())
}

fn string_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str)
}

fn text_field(node: &Value, key: &str) -> Option<String> {
    field::<TextField>(node, key).and_then(TextField::first_text)
}

fn texts_field(node: &Value, key: &str) -> Vec<String> {
    field::<TextField>(node, key)
        .map(TextField::all_texts)
        .unwrap_or_default()
}

/// Scalar properties of a `NutritionInformation` node, keyed by property name
fn nutrition_facts(nutrition: &Value) -> BTreeMap<String, String> {
    let Value::Object(map) = nutrition else {
        return BTreeMap::new();
    };
    map.iter()
        .filter(|(key, _)| !key.starts_with('@'))
        .filter_map(|(key, value)| {
            let fact = match value {
                Value::String(text) => clean_text(text)?,
                Value::Number(number) => format_number(number),
                _ => return None,
            };
            Some((key.clone(), fact))
        })
        .collect()
}

fn clean_text(text: &str) -> Option<String> {
    let cleaned = collapse_whitespace(&decode_entities(text));
    (!cleaned.is_empty()).then_some(cleaned)
}

fn is_json_ld_keyword(step: &str) -> bool {
    let lowered = step.trim().to_lowercase();
    JSON_LD_KEYWORDS.contains(&lowered.as_str())
}

/// A plain text property: a string, an array of them, or a `{text}` / `{name}` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextField {
    String(String),
    Multiple(Vec<TextField>),
    Object(TextObject),
}

#[derive(Debug, Deserialize)]
struct TextObject {
    text: Option<String>,
    name: Option<String>,
}

impl TextField {
    fn first_text(self) -> Option<String> {
        match self {
            TextField::String(s) => clean_text(&s),
            TextField::Multiple(items) => items.into_iter().find_map(TextField::first_text),
            TextField::Object(obj) => obj.text.or(obj.name).as_deref().and_then(clean_text),
        }
    }

    /// Every text value, with comma-separated strings split into entries
    fn all_texts(self) -> Vec<String> {
        match self {
            TextField::String(s) => s.split(',').filter_map(clean_text).collect(),
            TextField::Multiple(items) => items.into_iter().flat_map(TextField::all_texts).collect(),
            TextField::Object(obj) => obj
                .text
                .or(obj.name)
                .as_deref()
                .and_then(clean_text)
                .into_iter()
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Multiple(Vec<AuthorField>),
    Object(AuthorObject),
}

#[derive(Debug, Deserialize)]
struct AuthorObject {
    name: Option<String>,
    #[serde(rename = "@id")]
    id: Option<String>,
}

impl AuthorField {
    fn resolve_name(self, ids: &IdIndex) -> Option<String> {
        match self {
            AuthorField::Name(name) => clean_text(&name),
            AuthorField::Multiple(authors) => authors
                .into_iter()
                .find_map(|author| author.resolve_name(ids)),
            AuthorField::Object(obj) => match obj.name {
                Some(name) => clean_text(&name),
                // Person nodes are often only referenced by @id
                None => obj
                    .id
                    .and_then(|id| ids.get(&id))
                    .and_then(|person| person.get("name"))
                    .and_then(Value::as_str)
                    .and_then(clean_text),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YieldField {
    String(String),
    Number(Number),
    Multiple(Vec<YieldField>),
}

impl YieldField {
    fn into_servings(self) -> Option<String> {
        match self {
            YieldField::String(s) => clean_text(&s),
            YieldField::Number(n) => Some(format!("{} servings", format_number(&n))),
            YieldField::Multiple(items) => match items.into_iter().next()? {
                YieldField::String(s) => clean_text(&s),
                YieldField::Number(n) => Some(format_number(&n)),
                YieldField::Multiple(_) => None,
            },
        }
    }
}

fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImageField {
    Url(String),
    Multiple(Vec<ImageField>),
    Object(ImageObject),
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    url: Option<String>,
    #[serde(rename = "contentUrl")]
    content_url: Option<String>,
    width: Option<Dimension>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Dimension {
    Number(f64),
    Text(String),
    Quantity { value: f64 },
}

impl Dimension {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Dimension::Number(n) => Some(*n),
            Dimension::Text(s) => s.trim().trim_end_matches("px").parse().ok(),
            Dimension::Quantity { value } => Some(*value),
        }
    }
}

impl ImageField {
    /// Pick the image to keep.
    ///
    /// Arrays whose entries declare a width yield the widest entry; otherwise
    /// the last entry wins, since publishers list sizes smallest first.
    fn best_url(self) -> Option<String> {
        match self {
            ImageField::Url(url) => (!url.trim().is_empty()).then_some(url),
            ImageField::Object(obj) => obj.into_url_and_width().map(|(url, _)| url),
            ImageField::Multiple(items) => {
                let candidates: Vec<(String, Option<f64>)> = items
                    .into_iter()
                    .filter_map(|item| match item {
                        ImageField::Object(obj) => obj.into_url_and_width(),
                        other => other.best_url().map(|url| (url, None)),
                    })
                    .collect();

                if candidates.iter().any(|(_, width)| width.is_some()) {
                    candidates
                        .into_iter()
                        .filter_map(|(url, width)| width.map(|w| (url, w)))
                        .fold(None, |best: Option<(String, f64)>, (url, width)| match best {
                            Some((_, best_width)) if best_width >= width => best,
                            _ => Some((url, width)),
                        })
                        .map(|(url, _)| url)
                } else {
                    candidates.into_iter().last().map(|(url, _)| url)
                }
            }
        }
    }
}

impl ImageObject {
    fn into_url_and_width(self) -> Option<(String, Option<f64>)> {
        let width = self.width.as_ref().and_then(Dimension::as_f64);
        self.url
            .or(self.content_url)
            .filter(|url| !url.trim().is_empty())
            .map(|url| (url, width))
    }
}

/// `recipeIngredient` / `recipeInstructions` in any of their published shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepsField {
    Text(String),
    Multiple(Vec<StepItem>),
    Single(StepItem),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepItem {
    Text(String),
    Nested(Vec<StepItem>),
    Section(Box<HowToSection>),
    Step(HowToStep),
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct HowToSection {
    #[serde(rename = "itemListElement")]
    item_list_element: StepsField,
}

#[derive(Debug, Deserialize)]
struct HowToStep {
    text: Option<String>,
    name: Option<String>,
}

impl StepsField {
    fn into_lines(self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            StepsField::Text(text) => lines.extend(clean_text(&text)),
            StepsField::Multiple(items) => {
                for item in items {
                    item.collect_into(&mut lines);
                }
            }
            StepsField::Single(item) => item.collect_into(&mut lines),
        }
        lines
    }
}

impl StepItem {
    fn collect_into(self, lines: &mut Vec<String>) {
        match self {
            StepItem::Text(text) => lines.extend(clean_text(&text)),
            StepItem::Nested(items) => {
                for item in items {
                    item.collect_into(lines);
                }
            }
            StepItem::Section(section) => lines.extend(section.item_list_element.into_lines()),
            // Prefer text over name
            StepItem::Step(step) => lines.extend(step.text.or(step.name).as_deref().and_then(clean_text)),
            StepItem::Other(_) => {}
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordsField {
    Text(String),
    Multiple(Vec<String>),
}

impl KeywordsField {
    fn into_keywords(self) -> Vec<String> {
        let raw = match self {
            KeywordsField::Text(text) => text.split(',').map(str::to_string).collect(),
            KeywordsField::Multiple(items) => items,
        };
        raw.iter().filter_map(|k| clean_text(k)).collect()
    }
}

#[derive(Debug, Deserialize)]
struct AggregateRating {
    #[serde(rename = "ratingValue")]
    rating_value: Option<NumberLike>,
    #[serde(rename = "ratingCount")]
    rating_count: Option<NumberLike>,
    #[serde(rename = "reviewCount")]
    review_count: Option<NumberLike>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberLike::Number(n) => Some(*n),
            NumberLike::Text(s) => s.trim().replace(',', ".").parse().ok(),
        }
    }
}

impl AggregateRating {
    fn into_rating(self) -> Option<Rating> {
        let value = self.rating_value.as_ref().and_then(NumberLike::as_f64)?;
        let count = self
            .rating_count
            .as_ref()
            .or(self.review_count.as_ref())
            .and_then(NumberLike::as_f64)
            .filter(|c| *c >= 0.0 && *c <= u32::MAX as f64)
            .map(|c| c as u32);
        Some(Rating { value, count })
    }
}
