use super::element_text;
use crate::text::decode_entities;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest text accepted from a single class match; anything larger is
/// almost certainly a page wrapper rather than a recipe field
const MAX_TEXT_LEN: usize = 5000;
const MAX_LIST_ITEM_LEN: usize = 500;

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid li selector"));

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("Invalid p selector"));

/// Recipe fields that plugin and theme markup commonly tags with CSS classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassField {
    Title,
    Description,
    Ingredients,
    Instructions,
    Servings,
    Cuisine,
    Category,
    Author,
}

impl ClassField {
    /// Class names used by the common recipe card plugins
    fn exact(self) -> &'static [&'static str] {
        match self {
            ClassField::Title => &[
                "wprm-recipe-name",
                "tasty-recipes-title",
                "mv-create-title",
                "recipe-name",
                "recipe-title",
                "recipe-card-title",
                "wpzoom-recipe-card-title",
                "recipe-card__title",
            ],
            ClassField::Description => &[
                "wprm-recipe-summary",
                "tasty-recipes-description",
                "mv-create-description",
                "recipe-summary",
                "recipe-description",
                "recipe-card-summary",
            ],
            ClassField::Ingredients => &[
                "wprm-recipe-ingredients-container",
                "tasty-recipes-ingredients",
                "mv-create-ingredients",
                "recipe-ingredients",
                "recipe-ingredient-list",
                "recipe-card-ingredients",
                "wpzoom-recipe-ingredients",
                "structured-ingredients",
            ],
            ClassField::Instructions => &[
                "wprm-recipe-instructions-container",
                "tasty-recipes-instructions",
                "mv-create-instructions",
                "recipe-instructions",
                "recipe-instruction-list",
                "recipe-card-instructions",
                "wpzoom-recipe-instructions",
                "recipe-directions",
                "directions",
            ],
            ClassField::Servings => &[
                "wprm-recipe-servings",
                "tasty-recipes-yield",
                "mv-create-yield",
                "recipe-yield",
                "recipe-servings",
            ],
            ClassField::Cuisine => &["wprm-recipe-cuisine", "tasty-recipes-cuisine", "recipe-cuisine"],
            ClassField::Category => &[
                "wprm-recipe-course",
                "tasty-recipes-category",
                "recipe-category",
                "recipe-course",
            ],
            ClassField::Author => &[
                "wprm-recipe-author",
                "tasty-recipes-author-name",
                "mv-create-author",
                "recipe-author",
                "author-name",
                "byline",
            ],
        }
    }

    /// Class-name substrings tried after every exact class failed
    fn fuzzy(self) -> &'static [&'static str] {
        match self {
            ClassField::Ingredients => &["ingredient"],
            ClassField::Instructions => &["instruction", "direction", "step"],
            ClassField::Author => &["author", "byline"],
            ClassField::Description => &["summary"],
            ClassField::Title
            | ClassField::Servings
            | ClassField::Cuisine
            | ClassField::Category => &[],
        }
    }

    fn selectors(self) -> impl Iterator<Item = (String, Selector)> {
        let exact = self.exact().iter().map(|class| format!(".{class}"));
        let fuzzy = self.fuzzy().iter().map(|pattern| format!("[class*='{pattern}']"));
        exact
            .chain(fuzzy)
            .filter_map(|source| Selector::parse(&source).ok().map(|selector| (source, selector)))
    }
}

/// Text of the first class match for `field`
pub fn find_text(document: &Html, field: ClassField) -> Option<String> {
    for (source, selector) in field.selectors() {
        let found = document
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty() && text.len() < MAX_TEXT_LEN);
        if let Some(text) = found {
            debug!("HtmlClass: Found {:?} using {}", field, source);
            return Some(decode_entities(&text));
        }
    }
    None
}

/// One entry per list item (or per innermost matched element) for `field`
pub fn find_list(document: &Html, field: ClassField) -> Vec<String> {
    for (source, selector) in field.selectors() {
        let matched: Vec<ElementRef> = document.select(&selector).collect();
        if matched.is_empty() {
            continue;
        }

        let items = list_items(&matched);
        if !items.is_empty() {
            debug!("HtmlClass: Found {} {:?} using {}", items.len(), field, source);
            return items;
        }
    }
    Vec::new()
}

fn list_items(matched: &[ElementRef]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut items: Vec<String> = matched
        .iter()
        .flat_map(|container| container.select(&LIST_ITEM_SELECTOR))
        .filter(|li| seen.insert(li.id()))
        .filter_map(list_item_text)
        .collect();
    if !items.is_empty() {
        return items;
    }

    // No list markup: each innermost match is one entry, or one per paragraph
    let matched_ids: HashSet<_> = matched.iter().map(|element| element.id()).collect();
    let innermost = matched.iter().filter(|element| {
        !is_heading(element)
            && !element
                .descendants()
                .skip(1)
                .any(|node| matched_ids.contains(&node.id()))
    });
    for element in innermost {
        let paragraphs: Vec<ElementRef> = element.select(&PARAGRAPH_SELECTOR).collect();
        if paragraphs.len() > 1 {
            items.extend(paragraphs.into_iter().filter_map(list_item_text));
        } else {
            items.extend(list_item_text(*element));
        }
    }
    items
}

fn list_item_text(element: ElementRef) -> Option<String> {
    let text = element_text(element);
    (!text.is_empty() && text.len() < MAX_LIST_ITEM_LEN).then(|| decode_entities(&text))
}

fn is_heading(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}
