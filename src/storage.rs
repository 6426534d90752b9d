use crate::error::{Error, Result};
use crate::models::{CompactRegionData, Value};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically, creating parent directories.
pub fn write_text<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(value).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    })?;
    write_text(path, &s)
}

/// Persist compact data as the JSON cache.
pub fn save_cache<P: AsRef<Path>>(data: &CompactRegionData, path: P) -> Result<()> {
    save_json(data, path)
}

/// Load a previously written cache.
pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<CompactRegionData> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// A cache is usable only if it is non-empty and its stat keys cover `required`.
pub fn cache_is_fresh(data: &CompactRegionData, required: &BTreeSet<String>) -> bool {
    if data.is_empty() {
        return false;
    }
    let present: BTreeSet<&str> = data
        .values()
        .flat_map(|stats| stats.keys().map(String::as_str))
        .collect();
    required.iter().all(|k| present.contains(k.as_str()))
}

/// Drop statistics outside `required`, and regions left without any.
pub fn restrict_to_required(
    mut data: CompactRegionData,
    required: &BTreeSet<String>,
) -> CompactRegionData {
    data.retain(|_, stats| {
        stats.retain(|k, _| required.contains(k));
        !stats.is_empty()
    });
    data
}

/// Prefix cells spreadsheet software would evaluate as formulas.
fn neutralize_formula(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

fn csv_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_nan() => "NaN".into(),
        Value::Number(n) if n.is_infinite() && n.is_sign_positive() => "Infinity".into(),
        Value::Number(n) if n.is_infinite() => "-Infinity".into(),
        Value::Number(n) => n.to_string(),
        Value::Text(s) => neutralize_formula(s),
    }
}

/// Export compact data as tidy CSV: one row per (region, statistic).
pub fn save_csv<P: AsRef<Path>>(data: &CompactRegionData, path: P) -> Result<()> {
    let path = path.as_ref();
    let csv_err = |e: csv::Error| Error::Write {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(["region_code", "stat_key", "value"])
        .map_err(csv_err)?;
    for (region, stats) in data {
        for (key, value) in stats {
            wtr.write_record([neutralize_formula(region), key.clone(), csv_cell(value)])
                .map_err(csv_err)?;
        }
    }
    let bytes = wtr.into_inner().map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: std::io::Error::other(e.to_string()),
    })?;
    write_text(path, &String::from_utf8_lossy(&bytes))
}
