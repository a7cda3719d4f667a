use crate::error::ExtractError;
use crate::model::ParsedRecipe;
use crate::text::{collapse_whitespace, normalize_fractions, normalize_ingredient_parens};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

pub mod author;
pub mod graph;
pub mod html_class;
pub mod html_fallback;
pub mod json_ld;
pub mod meta;
pub mod microdata;

pub use author::{resolve_author, AuthorResolver};
pub use graph::{find_recipe_node, IdIndex, RecipeLocator};
pub use html_fallback::{extract_from_html, HtmlFallbackExtractor};
pub use json_ld::{map_recipe_node, JsonLdExtractor};
pub use microdata::MicrodataScope;

/// A page parsed once and shared by every extraction strategy
pub struct ParsingContext {
    pub url: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(html: &str, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            document: Html::parse_document(html),
        }
    }
}

pub trait Extractor {
    fn parse(&self, context: &ParsingContext) -> Result<ParsedRecipe, ExtractError>;
}

/// Visible text of an element with whitespace collapsed
pub(crate) fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub(crate) fn normalize_ingredient_lines(lines: Vec<String>, fractions: bool) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            let line = normalize_ingredient_parens(&line);
            if fractions {
                normalize_fractions(&line)
            } else {
                line
            }
        })
        .collect()
}

/// Drop repeated entries, keeping the first occurrence
pub(crate) fn dedup_lines(lines: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.to_lowercase()))
        .collect()
}
