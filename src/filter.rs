//! Projection of the raw typed dataset onto the compact region map.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{CompactRegionData, RawRecord, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Result of a filter run. The counters are diagnostics only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub data: CompactRegionData,
    /// Records whose region type is not in the allowed set.
    pub excluded_region_type: usize,
    /// Allowed records without an identifier or without any required statistic.
    pub incomplete: usize,
}

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Kept {
        region_code: String,
        stats: BTreeMap<String, Value>,
    },
    ExcludedRegionType,
    Incomplete,
}

#[derive(Debug, Clone)]
pub struct RecordFilter<'a> {
    identifier_key: &'a str,
    region_type_key: &'a str,
    region_types: &'a BTreeSet<String>,
    required: &'a BTreeSet<String>,
}

impl<'a> RecordFilter<'a> {
    pub fn new(config: &'a Config, required: &'a BTreeSet<String>) -> Self {
        Self {
            identifier_key: &config.identifier_key,
            region_type_key: &config.region_type_key,
            region_types: &config.region_types,
            required,
        }
    }

    pub fn project(&self, mut record: RawRecord) -> Projection {
        let region_type = record
            .get(self.region_type_key)
            .and_then(Value::as_text)
            .map(str::trim);
        match region_type {
            Some(t) if self.region_types.contains(t) => {}
            _ => return Projection::ExcludedRegionType,
        }

        let region_code = match record
            .get(self.identifier_key)
            .and_then(Value::as_text)
            .map(str::trim)
        {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => return Projection::Incomplete,
        };

        let stats: BTreeMap<String, Value> = self
            .required
            .iter()
            .filter(|k| k.as_str() != self.identifier_key)
            .filter_map(|k| record.remove_entry(k.as_str()))
            .collect();
        if stats.is_empty() {
            return Projection::Incomplete;
        }

        Projection::Kept { region_code, stats }
    }

    /// Consume the records, keeping allowed regions with at least one required stat.
    pub fn apply<I>(&self, records: I) -> FilterOutcome
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut out = FilterOutcome::default();
        for record in records {
            match self.project(record) {
                Projection::Kept { region_code, stats } => {
                    out.data.insert(region_code, stats);
                }
                Projection::ExcludedRegionType => out.excluded_region_type += 1,
                Projection::Incomplete => out.incomplete += 1,
            }
        }
        out
    }
}

/// Read `TypedDataSet.json` (a JSON array of flat objects).
pub fn load_typed_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
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
