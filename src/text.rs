//! Text normalization shared by every extraction strategy.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

/// Longest trailing `" - suffix"` that `clean_title` treats as an appended byline
const TITLE_SUFFIX_MAX_LEN: usize = 50;

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").expect("Invalid duration regex")
});

static DOUBLE_PARENS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*\(\s*([^()]*?)\s*\)\s*\)").expect("Invalid parentheses regex")
});

static EDITORS_NOTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)editor(?:'|\u{2019})?s\s+note\s*:").expect("Invalid editor's note regex")
});

static BYLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:written\s+)?by\b\s*:?\s*").expect("Invalid byline regex")
});

const FRACTIONS: [(char, &str); 15] = [
    ('½', "1/2"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
];

/// Decode named, decimal and hex HTML entities.
///
/// Publishers regularly double-encode (`&amp;amp;`), so decoding repeats until
/// the text stops changing. Every effective pass shortens the text, which
/// bounds the loop and makes the function idempotent.
pub fn decode_entities(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let decoded = decode_html_entities(&current);
        if decoded == current.as_str() {
            return current;
        }
        current = decoded.into_owned();
    }
}

/// Replace unicode vulgar fractions with ASCII `n/d`.
pub fn normalize_fractions(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match FRACTIONS.iter().find(|(fraction, _)| *fraction == c) {
            Some((_, ascii)) => result.push_str(ascii),
            None => result.push(c),
        }
    }
    result
}

/// Parse an ISO-8601 duration of the form `PT(nH)?(nM)?(nS)?` into minutes.
///
/// Seconds are accepted but do not contribute to the total. A zero total is
/// reported as `None`.
pub fn parse_iso_duration(text: &str) -> Option<u32> {
    let captures = ISO_DURATION_REGEX.captures(text.trim())?;
    let component = |index: usize| -> Option<u32> {
        match captures.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let hours = component(1)?;
    let minutes = component(2)?;
    let total = hours.checked_mul(60)?.checked_add(minutes)?;

    (total > 0).then_some(total)
}

/// Strip a trailing " Recipe" and a trailing " - Author Name" from a title.
///
/// The dash suffix is only removed when it holds no comma and is shorter than
/// 50 characters; "One-Pot Salmon, Spinach, and Tomatoes" keeps its dash.
pub fn clean_title(name: &str) -> String {
    let mut title = name.trim();

    if let Some(stripped) = strip_suffix_ignore_case(title, " recipe") {
        if !stripped.trim().is_empty() {
            title = stripped.trim_end();
        }
    }

    if let Some(pos) = title.rfind(" - ") {
        let suffix = &title[pos + 3..];
        let head = title[..pos].trim_end();
        if !suffix.contains(',') && suffix.chars().count() < TITLE_SUFFIX_MAX_LEN && !head.is_empty()
        {
            title = head;
        }
    }

    title.to_string()
}

/// Drop a trailing `" | Site Name"` segment from a page `<title>`.
pub fn strip_title_site_suffix(title: &str) -> &str {
    match title.rfind(" | ") {
        Some(pos) if !title[..pos].trim().is_empty() => title[..pos].trim_end(),
        _ => title,
    }
}

/// Human-readable name for a schema.org `suitableForDiet` value:
/// `https://schema.org/GlutenFreeDiet` becomes `Gluten Free`.
pub fn format_diet(text: &str) -> String {
    let name = text.trim();
    let name = name.rsplit('/').next().unwrap_or(name);
    let name = strip_suffix_ignore_case(name, "diet").unwrap_or(name);

    let mut words = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && previous.is_some_and(char::is_lowercase) {
            words.push(' ');
        }
        words.push(c);
        previous = Some(c);
    }
    collapse_whitespace(&words)
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Collapse `((x))` into `(x)`.
pub fn normalize_ingredient_parens(text: &str) -> String {
    DOUBLE_PARENS_REGEX.replace_all(text, "($1)").into_owned()
}

/// Remove "Editor's note:" asides from instruction steps.
///
/// A step that starts with the marker is dropped; a step that carries it later
/// is cut at the marker. Steps left empty are removed.
pub fn filter_editorial_notes(steps: Vec<String>) -> Vec<String> {
    steps
        .into_iter()
        .filter_map(|step| {
            let kept = match EDITORS_NOTE_REGEX.find(&step) {
                Some(m) => step[..m.start()].trim().to_string(),
                None => step.trim().to_string(),
            };
            (!kept.is_empty()).then_some(kept)
        })
        .collect()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tidy an author string scraped from a byline.
pub fn clean_author(text: &str) -> String {
    let collapsed = collapse_whitespace(&decode_entities(text));
    BYLINE_REGEX.replace(&collapsed, "").trim().to_string()
}
