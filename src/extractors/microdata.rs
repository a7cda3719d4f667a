use super::element_text;
use crate::text::decode_entities;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

const RECIPE_ITEMTYPES: [&str; 2] = ["http://schema.org/Recipe", "https://schema.org/Recipe"];

static ITEMTYPE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemtype]").expect("Invalid itemtype selector"));

static NAME_PROP_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemprop~='name']").expect("Invalid name selector"));

static ANY_ITEMPROP_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemprop]").expect("Invalid itemprop selector"));

static LIST_ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid li selector"));

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("Invalid p selector"));

/// `itemprop` lookups scoped to the page's schema.org Recipe container.
///
/// Without a container every lookup runs against the whole document.
pub struct MicrodataScope<'a> {
    document: &'a Html,
    container: Option<ElementRef<'a>>,
}

impl<'a> MicrodataScope<'a> {
    pub fn find(document: &'a Html) -> Self {
        let container = document
            .select(&ITEMTYPE_SELECTOR)
            .find(|element| element.value().attr("itemtype").is_some_and(is_recipe_itemtype));
        debug!("MicrodataScope: Recipe container found: {}", container.is_some());
        Self {
            document,
            container,
        }
    }

    pub fn container(&self) -> Option<ElementRef<'a>> {
        self.container
    }

    /// Elements carrying `prop` that belong to the recipe itself, not to an
    /// item nested inside it (such as the author's `Person`)
    fn owned(&self, prop: &str) -> Vec<ElementRef<'a>> {
        let elements = self.all(prop);
        match self.container {
            Some(container) => elements
                .into_iter()
                .filter(|element| {
                    nearest_scope(*element).map(|scope| scope.id()) == Some(container.id())
                })
                .collect(),
            None => elements,
        }
    }

    /// Every element carrying `prop` inside the scope, nested items included
    fn all(&self, prop: &str) -> Vec<ElementRef<'a>> {
        let Ok(selector) = Selector::parse(&format!("[itemprop~='{prop}']")) else {
            return Vec::new();
        };
        match self.container {
            Some(container) => container.select(&selector).collect(),
            None => self.document.select(&selector).collect(),
        }
    }

    /// First non-empty value of `prop`
    pub fn text(&self, prop: &str) -> Option<String> {
        self.owned(prop).into_iter().find_map(itemprop_value)
    }

    /// First non-empty value of `prop`, including values of nested items
    pub fn nested_text(&self, prop: &str) -> Option<String> {
        self.all(prop).into_iter().find_map(itemprop_value)
    }

    /// Every non-empty value of `prop`, one per element
    pub fn texts(&self, prop: &str) -> Vec<String> {
        self.owned(prop).into_iter().filter_map(itemprop_value).collect()
    }

    /// Values of `prop` split into lines: an element wrapping a list or
    /// paragraphs contributes one line per item
    pub fn lines(&self, prop: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for element in self.owned(prop) {
            let items: Vec<String> = element
                .select(&LIST_ITEM_SELECTOR)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect();
            if !items.is_empty() {
                lines.extend(items.into_iter().map(|text| decode_entities(&text)));
                continue;
            }

            let paragraphs: Vec<String> = element
                .select(&PARAGRAPH_SELECTOR)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect();
            if paragraphs.len() > 1 {
                lines.extend(paragraphs.into_iter().map(|text| decode_entities(&text)));
                continue;
            }

            lines.extend(itemprop_value(element));
        }
        lines
    }

    /// Machine-readable value of `prop`: `content` or `datetime` before text
    pub fn machine_value(&self, prop: &str) -> Option<String> {
        self.owned(prop).into_iter().find_map(|element| {
            ["content", "datetime"]
                .iter()
                .find_map(|attr| element.value().attr(attr))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| itemprop_value(element))
        })
    }

    /// Every value of `prop`, reading `content` or `href` (as on `<meta>` and
    /// `<link>` enumeration values) before the element text
    pub fn attr_values(&self, prop: &str) -> Vec<String> {
        self.owned(prop)
            .into_iter()
            .filter_map(|element| {
                ["content", "href"]
                    .iter()
                    .find_map(|attr| element.value().attr(attr))
                    .map(|value| decode_entities(value.trim()))
                    .filter(|value| !value.is_empty())
                    .or_else(|| itemprop_value(element))
            })
            .collect()
    }

    /// Properties of the recipe's `NutritionInformation` item
    pub fn nutrition(&self) -> BTreeMap<String, String> {
        let mut facts = BTreeMap::new();
        let Some(item) = self.owned("nutrition").into_iter().next() else {
            return facts;
        };
        for element in item.select(&ANY_ITEMPROP_SELECTOR) {
            if element.id() == item.id() {
                continue;
            }
            let Some(key) = element
                .value()
                .attr("itemprop")
                .and_then(|props| props.split_whitespace().next())
            else {
                continue;
            };
            let value = element
                .value()
                .attr("content")
                .map(|content| decode_entities(content.trim()))
                .filter(|content| !content.is_empty())
                .or_else(|| itemprop_value(element));
            if let Some(value) = value {
                facts.entry(key.to_string()).or_insert(value);
            }
        }
        facts
    }

    /// Image URL of the recipe
    pub fn image(&self) -> Option<String> {
        self.owned("image").into_iter().find_map(|element| {
            ["src", "content", "href", "data-src"]
                .iter()
                .find_map(|attr| element.value().attr(attr))
                .map(|value| decode_entities(value.trim()))
                .filter(|value| !value.is_empty())
                .or_else(|| {
                    let url = element
                        .select(&NAME_PROP_SELECTOR)
                        .next()
                        .map(element_text)
                        .unwrap_or_else(|| element_text(element));
                    (!url.is_empty()).then_some(url)
                })
        })
    }
}

fn is_recipe_itemtype(itemtype: &str) -> bool {
    itemtype.split_whitespace().any(|token| {
        let token = token.trim_end_matches('/');
        RECIPE_ITEMTYPES
            .iter()
            .any(|recipe| token.eq_ignore_ascii_case(recipe))
    })
}

/// Closest ancestor that opens an item scope
fn nearest_scope(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().attr("itemscope").is_some())
}

/// Value of one `itemprop` element.
///
/// A nested `itemprop="name"` child wins over the element's own text, which
/// may carry labels such as "By"; then the text, then a `content` attribute
/// for meta-style tags.
pub fn itemprop_value(element: ElementRef) -> Option<String> {
    if let Some(name) = element
        .select(&NAME_PROP_SELECTOR)
        .filter(|child| child.id() != element.id())
        .map(element_text)
        .find(|text| !text.is_empty())
    {
        return Some(decode_entities(&name));
    }

    let text = element_text(element);
    if !text.is_empty() {
        return Some(decode_entities(&text));
    }

    element
        .value()
        .attr("content")
        .map(|content| decode_entities(content.trim()))
        .filter(|content| !content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE_HTML: &str = r#"
        <html><body>
        <span itemprop="name">Site Header Name</span>
        <div itemscope itemtype="https://schema.org/Recipe">
            <div itemprop="author" itemscope itemtype="http://schema.org/Person">
                <span itemprop="name">Cooking Divine</span>
            </div>
            <h2 itemprop="name">Banana Bread</h2>
            <meta itemprop="totalTime" content="PT1H10M">
            <time itemprop="cookTime" datetime="PT1H">1 hour</time>
            <img itemprop="image" src="https://example.com/bread.jpg">
            <ul>
                <li itemprop="recipeIngredient">3 bananas</li>
                <li itemprop="recipeIngredient">2 cups flour</li>
            </ul>
            <div itemprop="recipeInstructions">
                <ol><li>Mash the bananas.</li><li>Fold in the flour.</li></ol>
            </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_container_scoping() {
        let document = Html::parse_document(RECIPE_HTML);
        let scope = MicrodataScope::find(&document);

        assert!(scope.container().is_some());
        assert_eq!(scope.text("name").as_deref(), Some("Banana Bread"));
        assert_eq!(scope.text("author").as_deref(), Some("Cooking Divine"));
        assert_eq!(scope.texts("recipeIngredient"), vec!["3 bananas", "2 cups flour"]);
    }

    #[test]
    fn test_lines_split_nested_lists() {
        let document = Html::parse_document(RECIPE_HTML);
        let scope = MicrodataScope::find(&document);
        assert_eq!(
            scope.lines("recipeInstructions"),
            vec!["Mash the bananas.", "Fold in the flour."]
        );
    }

    #[test]
    fn test_machine_values_and_image() {
        let document = Html::parse_document(RECIPE_HTML);
        let scope = MicrodataScope::find(&document);
        assert_eq!(scope.machine_value("totalTime").as_deref(), Some("PT1H10M"));
        assert_eq!(scope.machine_value("cookTime").as_deref(), Some("PT1H"));
        assert_eq!(scope.image().as_deref(), Some("https://example.com/bread.jpg"));
    }

    #[test]
    fn test_unscoped_lookup() {
        let html = r#"<html><body>
            <h1 itemprop="name">Loose Soup</h1>
            <li itemprop="recipeIngredient">water</li>
        </body></html>"#;
        let document = Html::parse_document(html);
        let scope = MicrodataScope::find(&document);
        assert!(scope.container().is_none());
        assert_eq!(scope.text("name").as_deref(), Some("Loose Soup"));
        assert_eq!(scope.texts("recipeIngredient"), vec!["water"]);
    }

    #[test]
    fn test_nested_name_preferred_without_itemscope() {
        let html = r#"<span itemprop="author"><a href="/about">By</a> <span itemprop="name">Jane</span></span>"#;
        let document = Html::parse_document(html);
        let scope = MicrodataScope::find(&document);
        assert_eq!(scope.text("author").as_deref(), Some("Jane"));
    }

    #[test]
    fn test_attr_values_and_nutrition() {
        let html = r#"<div itemscope itemtype="https://schema.org/Recipe">
            <h1 itemprop="name">Porridge</h1>
            <link itemprop="suitableForDiet" href="https://schema.org/VeganDiet">
            <span itemprop="tool">Saucepan</span>
            <div itemprop="nutrition" itemscope itemtype="https://schema.org/NutritionInformation">
                <span itemprop="calories">150 calories</span>
                <meta itemprop="fatContent" content="3 g">
            </div>
        </div>"#;
        let document = Html::parse_document(html);
        let scope = MicrodataScope::find(&document);

        assert_eq!(scope.attr_values("suitableForDiet"), vec!["https://schema.org/VeganDiet"]);
        assert_eq!(scope.attr_values("tool"), vec!["Saucepan"]);

        let nutrition = scope.nutrition();
        assert_eq!(nutrition.len(), 2);
        assert_eq!(nutrition["calories"], "150 calories");
        assert_eq!(nutrition["fatContent"], "3 g");
    }

    #[test]
    fn test_recipe_itemtype_variants() {
        assert!(is_recipe_itemtype("http://schema.org/Recipe"));
        assert!(is_recipe_itemtype("https://schema.org/Recipe/"));
        assert!(!is_recipe_itemtype("https://schema.org/Person"));
        assert!(!is_recipe_itemtype("https://schema.org/RecipeCollection"));
    }
}
