//! Resolution of stable base statistic names to the dataset's versioned keys.
//!
//! CBS appends a column index to every topic key (`AantalInwoners_5`), and that
//! index shifts between yearly editions. Wiki users refer to the base name only,
//! so each run maps the configured base names onto the keys of the current edition.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{DataProperty, KeyMap, MetadataRecord};
use std::collections::{BTreeMap, BTreeSet};

/// A base name that matched more than one full key. The first match is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConflict {
    pub base_name: String,
    pub kept: String,
    pub ignored: String,
}

/// Output of [`resolve_keys`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedKeys {
    pub key_map: KeyMap,
    /// Metadata of every topic entry, keyed by full key.
    pub metadata: BTreeMap<String, MetadataRecord>,
    pub conflicts: Vec<KeyConflict>,
}

impl ResolvedKeys {
    /// The full keys the compact data must carry.
    pub fn required_full_keys(&self) -> BTreeSet<String> {
        self.key_map.values().cloned().collect()
    }
}

/// Strip one trailing `_<digits>` suffix, if present.
pub fn derive_base(full_key: &str) -> &str {
    match full_key.rsplit_once('_') {
        Some((base, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => full_key,
    }
}

/// Build the alias map and the metadata index from `DataProperties` entries.
///
/// Fails with [`Error::UnresolvedStatistics`] when a configured base name has no
/// topic entry at all.
pub fn resolve_keys(properties: &[DataProperty], config: &Config) -> Result<ResolvedKeys> {
    let required: BTreeSet<&str> = config.required_stats.iter().map(String::as_str).collect();
    let mut out = ResolvedKeys::default();

    for prop in properties {
        if prop.odata_type.as_deref() != Some(config.topic_type.as_str()) {
            continue;
        }
        let full_key = prop.key.as_deref().map(str::trim).unwrap_or_default();
        if full_key.is_empty() {
            continue;
        }

        out.metadata.insert(
            full_key.to_string(),
            MetadataRecord {
                full_key: full_key.to_string(),
                title: prop.title.clone(),
                description: prop.description.clone(),
                unit: prop.unit.clone(),
                decimals: prop.decimals,
            },
        );

        let base = derive_base(full_key);
        if !required.contains(base) {
            continue;
        }
        match out.key_map.get(base) {
            None => {
                out.key_map.insert(base.to_string(), full_key.to_string());
            }
            Some(existing) if existing != full_key => out.conflicts.push(KeyConflict {
                base_name: base.to_string(),
                kept: existing.clone(),
                ignored: full_key.to_string(),
            }),
            Some(_) => {}
        }
    }

    let missing: Vec<String> = config
        .required_stats
        .iter()
        .filter(|name| !out.key_map.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::UnresolvedStatistics(missing));
    }

    Ok(out)
}
