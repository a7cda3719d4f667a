use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Default absolute depth bound for [`find_recipe_node`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Properties searched before the catch-all walk over the remaining ones
const PRIORITY_KEYS: [&str; 5] = [
    "@graph",
    "mainEntity",
    "mainEntityOfPage",
    "itemListElement",
    "@type",
];

/// Index of the identified nodes (`"@id"` plus at least one other property)
/// of one JSON-LD document, used to follow `{"@id": ...}` references.
#[derive(Debug, Default)]
pub struct IdIndex<'a> {
    nodes: HashMap<&'a str, &'a Value>,
}

impl<'a> IdIndex<'a> {
    pub fn build(root: &'a Value) -> Self {
        Self::with_max_depth(root, DEFAULT_MAX_DEPTH)
    }

    /// Index nodes down to `max_depth`, the same bound the locator searches to.
    pub fn with_max_depth(root: &'a Value, max_depth: usize) -> Self {
        let mut index = IdIndex::default();
        index.collect(root, 0, max_depth);
        index
    }

    fn collect(&mut self, value: &'a Value, depth: usize, max_depth: usize) {
        if depth > max_depth {
            return;
        }
        match value {
            Value::Object(map) => {
                if let Some(id) = map.get("@id").and_then(Value::as_str) {
                    if map.len() > 1 {
                        self.nodes.entry(id).or_insert(value);
                    }
                }
                for child in map.values() {
                    self.collect(child, depth + 1, max_depth);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item, depth + 1, max_depth);
                }
            }
            _ => {}
        }
    }

    /// Follow a bare `{"@id": ...}` reference; any other value is returned as is.
    pub fn resolve(&self, value: &'a Value) -> &'a Value {
        match value {
            Value::Object(map) if map.len() == 1 => map
                .get("@id")
                .and_then(Value::as_str)
                .and_then(|id| self.nodes.get(id).copied())
                .unwrap_or(value),
            _ => value,
        }
    }

    /// Look up an identified node by its `@id`.
    pub fn get(&self, id: &str) -> Option<&'a Value> {
        self.nodes.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Whether a node's `@type` is `Recipe`, either directly or inside an array
pub fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Find the first Recipe-typed node in a parsed JSON-LD document.
pub fn find_recipe_node(root: &Value) -> Option<&Value> {
    let index = IdIndex::build(root);
    RecipeLocator::new(&index, DEFAULT_MAX_DEPTH).find(root)
}

/// Depth-first search for a Recipe node.
///
/// Objects are tracked by address so that a node reached twice, typically
/// through `@id` references pointing back at an ancestor, is never re-entered.
pub struct RecipeLocator<'a, 'i> {
    index: &'i IdIndex<'a>,
    max_depth: usize,
    visited: HashSet<*const Value>,
}

impl<'a, 'i> RecipeLocator<'a, 'i> {
    pub fn new(index: &'i IdIndex<'a>, max_depth: usize) -> Self {
        Self {
            index,
            max_depth,
            visited: HashSet::new(),
        }
    }

    pub fn find(mut self, root: &'a Value) -> Option<&'a Value> {
        self.search(root, 0)
    }

    fn search(&mut self, value: &'a Value, depth: usize) -> Option<&'a Value> {
        if depth > self.max_depth {
            debug!("RecipeLocator: depth limit {} reached", self.max_depth);
            return None;
        }

        let value = self.index.resolve(value);
        match value {
            Value::Array(items) => items
                .iter()
                .find_map(|item| self.search(item, depth + 1)),
            Value::Object(map) => {
                if !self.visited.insert(value as *const Value) {
                    return None;
                }
                if is_recipe_type(value) {
                    return Some(value);
                }

                for key in ["@graph", "mainEntity", "mainEntityOfPage", "itemListElement"] {
                    if let Some(found) = map.get(key).and_then(|v| self.search(v, depth + 1)) {
                        return Some(found);
                    }
                }

                // Publishers nest recipes under arbitrary properties
                map.iter()
                    .filter(|(key, _)| !PRIORITY_KEYS.contains(&key.as_str()))
                    .filter(|(_, child)| child.is_object() || child.is_array())
                    .find_map(|(_, child)| self.search(child, depth + 1))
            }
            _ => None,
        }
    }
}
