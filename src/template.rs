//! Placeholder substitution for the Lua and wikitext templates.
//!
//! Templates carry literal `%%NAME%%` tokens. Rendering is a single left-to-right
//! pass: replacement text is emitted as is and never scanned for further tokens,
//! and tokens without a replacement stay in the output untouched.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%([A-Z][A-Z0-9_]*)%%").expect("valid placeholder regex"));

/// Placeholder name (without the `%%` delimiters) -> replacement text.
#[derive(Debug, Clone, Default)]
pub struct Placeholders(BTreeMap<String, String>);

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl ToString) -> &mut Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The `%%NAME%%` form of a placeholder name.
pub fn token(name: &str) -> String {
    format!("%%{name}%%")
}

/// Substitute every known placeholder in `template`.
pub fn render(template: &str, placeholders: &Placeholders) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures| match placeholders.get(&caps[1]) {
            Some(text) => text.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names referenced by `template`, deduplicated and sorted.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = TOKEN
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Reads templates by file name from a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self, name: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(name)).map_err(|source| Error::TemplateUnavailable {
            name: name.to_string(),
            source,
        })
    }

    /// Load `name` and substitute `placeholders` into it.
    pub fn apply(&self, name: &str, placeholders: &Placeholders) -> Result<String> {
        let text = self.load(name)?;
        let unresolved: Vec<String> = placeholder_names(&text)
            .into_iter()
            .filter(|n| placeholders.get(n).is_none())
            .collect();
        if !unresolved.is_empty() {
            log::debug!("template {name} keeps unresolved placeholders: {}", unresolved.join(", "));
        }
        Ok(render(&text, placeholders))
    }
}
