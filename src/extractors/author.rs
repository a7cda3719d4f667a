use super::element_text;
use super::html_class::{self, ClassField};
use super::meta::{host, meta_content, site_name};
use super::microdata::itemprop_value;
use crate::config::ExtractionConfig;
use crate::model::ParsedRecipe;
use crate::text::clean_author;
use log::debug;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ITEMPROP_AUTHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemprop~='author']").expect("Invalid author selector"));

static REL_AUTHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[rel~='author']").expect("Invalid rel selector"));

/// Everything an author strategy may look at
pub struct AuthorInput<'a> {
    pub parsed: &'a ParsedRecipe,
    pub document: &'a Html,
    pub site_name_max_len: usize,
    pub max_author_len: usize,
}

type AuthorStrategy = fn(&AuthorInput<'_>) -> Option<String>;

/// Tried in order; the first strategy yielding a name wins
const STRATEGIES: [(&str, AuthorStrategy); 5] = [
    ("extracted", from_parsed),
    ("html", from_html),
    ("site name", from_site_name),
    ("hostname", from_hostname),
    ("source url", from_source_url),
];

/// Resolves the author of an extracted recipe, falling back to the publishing site
pub struct AuthorResolver {
    site_name_max_len: usize,
    max_author_len: usize,
}

impl AuthorResolver {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            site_name_max_len: config.site_name_max_len,
            max_author_len: config.max_author_len,
        }
    }

    pub fn resolve(&self, parsed: &ParsedRecipe, document: &Html) -> String {
        let input = AuthorInput {
            parsed,
            document,
            site_name_max_len: self.site_name_max_len,
            max_author_len: self.max_author_len,
        };

        for (label, strategy) in STRATEGIES {
            if let Some(author) = strategy(&input) {
                debug!("AuthorResolver: resolved from {label}: {author}");
                return author;
            }
        }

        // from_source_url only fails on an empty source
        parsed.source_url.clone()
    }
}

impl Default for AuthorResolver {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// Resolve with the default limits.
pub fn resolve_author(parsed: &ParsedRecipe, document: &Html) -> String {
    AuthorResolver::default().resolve(parsed, document)
}

/// Clean a scraped author candidate and reject obvious non-names.
pub fn usable_author(candidate: &str, max_len: usize) -> Option<String> {
    let author = clean_author(candidate);
    if author.is_empty() || author.chars().count() > max_len || author.starts_with("http") {
        return None;
    }
    Some(author)
}

fn from_parsed(input: &AuthorInput<'_>) -> Option<String> {
    input
        .parsed
        .author
        .as_deref()
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(str::to_string)
}

/// Author markup anywhere on the page, regardless of any Recipe scope
fn from_html(input: &AuthorInput<'_>) -> Option<String> {
    let document = input.document;
    let max_len = input.max_author_len;

    let itemprop = document
        .select(&ITEMPROP_AUTHOR_SELECTOR)
        .filter_map(itemprop_value)
        .find_map(|candidate| usable_author(&candidate, max_len));
    if itemprop.is_some() {
        return itemprop;
    }

    let rel = document
        .select(&REL_AUTHOR_SELECTOR)
        .map(element_text)
        .find_map(|candidate| usable_author(&candidate, max_len));
    if rel.is_some() {
        return rel;
    }

    meta_content(document, &["author", "article:author"])
        .and_then(|candidate| usable_author(&candidate, max_len))
        .or_else(|| {
            html_class::find_text(document, ClassField::Author)
                .and_then(|candidate| usable_author(&candidate, max_len))
        })
}

fn from_site_name(input: &AuthorInput<'_>) -> Option<String> {
    site_name(input.document).filter(|name| name.chars().count() < input.site_name_max_len)
}

fn from_hostname(input: &AuthorInput<'_>) -> Option<String> {
    let host = host(&input.parsed.source_url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host);
    (!host.is_empty()).then(|| host.to_string())
}

fn from_source_url(input: &AuthorInput<'_>) -> Option<String> {
    let source = input.parsed.source_url.trim();
    (!source.is_empty()).then(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractionMethod;

    fn parsed(source_url: &str, author: Option<&str>) -> ParsedRecipe {
        let mut recipe = ParsedRecipe::new("Soup", source_url, ExtractionMethod::HtmlFallback);
        recipe.author = author.map(str::to_string);
        recipe
    }

    #[test]
    fn test_extracted_author_wins() {
        let document = Html::parse_document(r#"<meta name="author" content="Other">"#);
        let recipe = parsed("https://www.example.com/soup", Some("Jane Doe"));
        assert_eq!(resolve_author(&recipe, &document), "Jane Doe");
    }

    #[test]
    fn test_html_author_outside_recipe_scope() {
        let html = r#"<html><body>
            <header><span itemprop="author" itemscope><span itemprop="name">By Sam Cook</span></span></header>
            <div itemscope itemtype="https://schema.org/Recipe"><h1 itemprop="name">Soup</h1></div>
        </body></html>"#;
        let document = Html::parse_document(html);
        let recipe = parsed("https://www.example.com/soup", None);
        assert_eq!(resolve_author(&recipe, &document), "Sam Cook");
    }

    #[test]
    fn test_rel_author_and_meta() {
        let document = Html::parse_document(r#"<a rel="author" href="/about">Ann Lee</a>"#);
        let recipe = parsed("https://example.com/soup", None);
        assert_eq!(resolve_author(&recipe, &document), "Ann Lee");

        let document = Html::parse_document(
            r#"<meta property="article:author" content="https://facebook.com/someone">
               <meta name="author" content="Kim Park">"#,
        );
        assert_eq!(resolve_author(&recipe, &document), "Kim Park");
    }

    #[test]
    fn test_long_class_author_rejected() {
        let html = format!(r#"<div class="author-bio">{}</div>"#, "word ".repeat(40));
        let document = Html::parse_document(&html);
        let recipe = parsed("https://www.example.com/soup", None);
        assert_eq!(resolve_author(&recipe, &document), "example.com");
    }

    #[test]
    fn test_site_name_length_limit() {
        let document =
            Html::parse_document(r#"<meta property="og:site_name" content="Serious Eats">"#);
        let recipe = parsed("https://www.seriouseats.com/soup", None);
        assert_eq!(resolve_author(&recipe, &document), "Serious Eats");

        let long_name = "A".repeat(60);
        let document = Html::parse_document(&format!(
            r#"<meta property="og:site_name" content="{long_name}">"#
        ));
        assert_eq!(resolve_author(&recipe, &document), "seriouseats.com");
    }

    #[test]
    fn test_source_url_last_resort() {
        let document = Html::parse_document("<html></html>");
        let recipe = parsed("recipes/soup.html", None);
        assert_eq!(resolve_author(&recipe, &document), "recipes/soup.html");
    }

    #[test]
    fn test_usable_author() {
        assert_eq!(usable_author("  By: Jane  ", 100).as_deref(), Some("Jane"));
        assert!(usable_author("https://example.com/jane", 100).is_none());
        assert!(usable_author("   ", 100).is_none());
        assert!(usable_author("Jane Doe", 4).is_none());
    }
}
