use crate::model::PageInfo;
use crate::text::{collapse_whitespace, decode_entities};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("link[rel~='canonical'][href]").expect("Invalid canonical selector")
});

static HTML_LANG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html[lang]").expect("Invalid lang selector"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Invalid title selector"));

/// Content of the first non-empty `<meta>` tag whose `property` or `name`
/// matches one of `keys`, tried in order.
pub fn meta_content(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        ["property", "name"].iter().find_map(|attr| {
            let selector = Selector::parse(&format!("meta[{attr}='{key}'][content]")).ok()?;
            document
                .select(&selector)
                .filter_map(|element| element.value().attr("content"))
                .map(|content| collapse_whitespace(&decode_entities(content)))
                .find(|content| !content.is_empty())
        })
    })
}

pub fn site_name(document: &Html) -> Option<String> {
    meta_content(document, &["og:site_name", "application-name"])
}

pub fn canonical_url(document: &Html) -> Option<String> {
    document
        .select(&CANONICAL_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
        .or_else(|| meta_content(document, &["og:url"]))
}

/// Declared page language: `<html lang>`, then `og:locale`
pub fn language(document: &Html) -> Option<String> {
    document
        .select(&HTML_LANG_SELECTOR)
        .filter_map(|element| element.value().attr("lang"))
        .map(str::trim)
        .find(|lang| !lang.is_empty())
        .map(str::to_string)
        .or_else(|| meta_content(document, &["og:locale"]))
}

/// Text of the document `<title>`
pub fn document_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .map(|element| collapse_whitespace(&decode_entities(&element.text().collect::<String>())))
        .find(|title| !title.is_empty())
}

/// Host of `source_url`; absent for local paths and unparseable input
pub fn host(source_url: &str) -> Option<String> {
    let url = Url::parse(source_url.trim()).ok()?;
    url.host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

pub fn page_info(document: &Html, source_url: &str) -> PageInfo {
    PageInfo {
        site_name: site_name(document),
        canonical_url: canonical_url(document),
        language: language(document),
        host: host(source_url),
    }
}
