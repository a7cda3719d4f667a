use serde::Serialize;
use std::collections::BTreeMap;

/// Which strategy produced a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionMethod {
    /// Found in an embedded JSON-LD graph
    StructuredData,
    /// Reconstructed from microdata attributes, meta tags and CSS heuristics
    HtmlFallback,
}

/// Aggregate rating published alongside a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub value: f64,
    pub count: Option<u32>,
}

/// Recipe data as produced by a single extraction strategy.
///
/// Identical to [`Recipe`] except that the author may still be missing; the
/// orchestrator fills it in through the author resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    pub name: String,
    pub source_url: String,
    pub extraction_method: ExtractionMethod,
    pub author: Option<String>,
    pub total_time_minutes: Option<u32>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub rating: Option<Rating>,
    pub equipment: Vec<String>,
    /// Nutrition facts keyed by schema.org property, e.g. `calories`
    pub nutrients: BTreeMap<String, String>,
    pub dietary_restrictions: Vec<String>,
    pub cooking_method: Option<String>,
}

impl ParsedRecipe {
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        extraction_method: ExtractionMethod,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            extraction_method,
            author: None,
            total_time_minutes: None,
            prep_time_minutes: None,
            cook_time_minutes: None,
            servings: None,
            image_url: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            description: None,
            cuisine: None,
            category: None,
            keywords: Vec::new(),
            rating: None,
            equipment: Vec::new(),
            nutrients: BTreeMap::new(),
            dietary_restrictions: Vec::new(),
            cooking_method: None,
        }
    }

    /// A recipe needs at least one ingredient or one instruction step to count
    pub fn has_content(&self) -> bool {
        !self.ingredients.is_empty() || !self.instructions.is_empty()
    }

    /// Complete the record with a resolved author.
    ///
    /// Returns `None` when both ingredients and instructions are empty, so a
    /// `Recipe` without content can never exist.
    pub fn finalize(self, author: String, page: PageInfo) -> Option<Recipe> {
        if !self.has_content() {
            return None;
        }

        Some(Recipe {
            name: self.name,
            source_url: self.source_url,
            extraction_method: self.extraction_method,
            author,
            total_time_minutes: self.total_time_minutes,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            image_url: self.image_url,
            ingredients: self.ingredients,
            instructions: self.instructions,
            description: self.description,
            cuisine: self.cuisine,
            category: self.category,
            keywords: self.keywords,
            rating: self.rating,
            equipment: self.equipment,
            nutrients: self.nutrients,
            dietary_restrictions: self.dietary_restrictions,
            cooking_method: self.cooking_method,
            site_name: page.site_name,
            canonical_url: page.canonical_url,
            language: page.language,
            host: page.host,
        })
    }
}

/// Page-level facts that are not part of the recipe node itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageInfo {
    pub site_name: Option<String>,
    pub canonical_url: Option<String>,
    pub language: Option<String>,
    /// Host part of the source URL, as published
    pub host: Option<String>,
}

/// A fully extracted recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub source_url: String,
    pub extraction_method: ExtractionMethod,
    pub author: String,
    pub total_time_minutes: Option<u32>,
    pub prep_time_minutes: Option<u32>,
    pub cook_time_minutes: Option<u32>,
    pub servings: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub rating: Option<Rating>,
    pub equipment: Vec<String>,
    pub nutrients: BTreeMap<String, String>,
    pub dietary_restrictions: Vec<String>,
    pub cooking_method: Option<String>,
    pub site_name: Option<String>,
    pub canonical_url: Option<String>,
    pub language: Option<String>,
    pub host: Option<String>,
}
