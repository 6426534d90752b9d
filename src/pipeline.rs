//! Glue between the pure stages: file layout, cache decisions and output writing.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{RecordFilter, load_typed_dataset};
use crate::keys::{ResolvedKeys, resolve_keys};
use crate::models::{CompactRegionData, DataProperty};
use crate::source::table_file;
use crate::storage;
use crate::template::TemplateStore;
use crate::wiki::{Document, DocumentKind, Generator};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Per-year directory layout: `<root>/<year>/cbs_data` and `<root>/<year>/wiki_output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub year: i32,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(root: P, year: i32) -> Self {
        let base = root.as_ref().join(year.to_string());
        Self {
            year,
            data_dir: base.join("cbs_data"),
            output_dir: base.join("wiki_output"),
        }
    }

    pub fn typed_dataset_path(&self) -> PathBuf {
        self.data_dir.join(table_file("TypedDataSet"))
    }

    pub fn data_properties_path(&self) -> PathBuf {
        self.data_dir.join(table_file("DataProperties"))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_dir
            .join(format!("stripped_filtered_data_{}.json", self.year))
    }

    pub fn key_map_path(&self) -> PathBuf {
        self.data_dir.join("key_map.json")
    }
}

/// Read `DataProperties.json`.
pub fn load_metadata<P: AsRef<Path>>(path: P) -> Result<Vec<DataProperty>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load metadata and resolve the configured statistics, logging any conflicts.
pub fn resolve_from_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<ResolvedKeys> {
    let properties = load_metadata(path)?;
    let resolved = resolve_keys(&properties, config)?;
    for c in &resolved.conflicts {
        log::warn!(
            "duplicate base name '{}': keeping {}, ignoring {}",
            c.base_name,
            c.kept,
            c.ignored
        );
    }
    log::info!(
        "resolved full keys: {}",
        resolved
            .required_full_keys()
            .into_iter()
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(resolved)
}

/// Where the compact data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Cache,
    Computed,
}

/// Try the cache; `None` means it must be recomputed.
fn cached_data(path: &Path, required: &BTreeSet<String>) -> Option<CompactRegionData> {
    if !path.exists() {
        return None;
    }
    match storage::load_cache(path) {
        Ok(data) if storage::cache_is_fresh(&data, required) => {
            Some(storage::restrict_to_required(data, required))
        }
        Ok(_) => {
            log::warn!("cache {} is stale or empty, recomputing", path.display());
            None
        }
        Err(e) => {
            log::warn!("cache {} unusable ({e}), recomputing", path.display());
            None
        }
    }
}

/// Filter the typed dataset from disk into compact data.
pub fn compute_compact_data(
    dataset: &Path,
    config: &Config,
    required: &BTreeSet<String>,
) -> Result<CompactRegionData> {
    log::info!(
        "filtering {} on region types {}",
        dataset.display(),
        config.region_types.iter().cloned().collect::<Vec<_>>().join("/")
    );
    let records = load_typed_dataset(dataset)?;
    log::info!("processing {} records", records.len());
    let outcome = RecordFilter::new(config, required).apply(records);
    log::info!(
        "kept {} regions; {} records filtered out by region type, {} incomplete",
        outcome.data.len(),
        outcome.excluded_region_type,
        outcome.incomplete
    );
    Ok(outcome.data)
}

/// Reuse the cached compact data when fresh, otherwise compute and re-cache it.
///
/// A failure to write the cache is logged and does not fail the run.
pub fn obtain_compact_data(
    workspace: &Workspace,
    config: &Config,
    required: &BTreeSet<String>,
    ignore_cache: bool,
) -> Result<(CompactRegionData, DataOrigin)> {
    let cache = workspace.cache_path();
    if !ignore_cache {
        if let Some(data) = cached_data(&cache, required) {
            log::info!("loaded {} regions from cache {}", data.len(), cache.display());
            return Ok((data, DataOrigin::Cache));
        }
    }

    let data = compute_compact_data(&workspace.typed_dataset_path(), config, required)?;
    match storage::save_cache(&data, &cache) {
        Ok(()) => log::info!("saved compact data to {}", cache.display()),
        Err(e) => log::warn!("saving cache failed: {e}"),
    }
    Ok((data, DataOrigin::Computed))
}

/// Render every document kind; failures are reported per document.
pub fn render_documents(
    generator: &Generator<'_>,
    templates: &TemplateStore,
) -> Vec<(DocumentKind, Result<Document>)> {
    DocumentKind::ALL
        .iter()
        .map(|kind| (*kind, generator.render(*kind, templates)))
        .collect()
}

/// Write a document into `dir`, returning its path.
pub fn write_document(doc: &Document, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(&doc.file_name);
    storage::write_text(&path, &doc.content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_layout() {
        let ws = Workspace::new("/tmp/kwb", 2023);
        assert_eq!(ws.data_dir, PathBuf::from("/tmp/kwb/2023/cbs_data"));
        assert_eq!(ws.output_dir, PathBuf::from("/tmp/kwb/2023/wiki_output"));
        assert_eq!(
            ws.cache_path(),
            PathBuf::from("/tmp/kwb/2023/cbs_data/stripped_filtered_data_2023.json")
        );
        assert_eq!(
            ws.typed_dataset_path(),
            PathBuf::from("/tmp/kwb/2023/cbs_data/TypedDataSet.json")
        );
    }
}
