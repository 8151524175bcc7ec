//! ADO.NET-style connection string parsing
//!
//! Connection strings of the form `Server=db;Database=shop;User Id=app;Password=...`
//! are what most existing deployments carry, so drivers accept them alongside
//! their native formats.

use std::collections::HashMap;

/// Key/value pairs of an ADO-style connection string.
///
/// Keys are matched case-insensitively and with surrounding whitespace
/// removed. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStringParams {
    params: HashMap<String, String>,
}

impl ConnectionStringParams {
    /// Parse `key=value` segments separated by `;`.
    ///
    /// Values may be wrapped in single or double quotes to include `;`.
    /// Segments without `=` are ignored.
    pub fn parse(input: &str) -> Self {
        let mut params = HashMap::new();
        for segment in split_segments(input) {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            params.insert(key, unquote(value.trim()).to_string());
        }
        Self { params }
    }

    /// First value present among `keys` (aliases of one setting)
    pub fn get(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.params.get(&key.to_lowercase()))
            .map(String::as_str)
    }

    /// Keys present, lowercased
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

fn split_segments(input: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ';') => {
                segments.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&input[start..]);
    segments
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
