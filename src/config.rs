//! Run configuration.
//!
//! Everything the pipeline needs to know about the dataset layout and the target wiki
//! lives in [`Config`]. The defaults describe the CBS "Kerncijfers Wijken en Buurten"
//! table; a JSON file can override any subset of fields.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATASET_ID: &str = "85984NED";
pub const DEFAULT_TOPIC_TYPE: &str = "Cbs.OData.Topic";

/// Wiki page names the generated artifacts are published under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiPages {
    pub dispatcher_module: String,
    pub stat_template: String,
    pub info_template: String,
}

impl Default for WikiPages {
    fn default() -> Self {
        Self {
            dispatcher_module: "Module:CBS_Kerncijfers_Wijken_en_Buurten_Data".into(),
            stat_template: "Template:CBS_Kerncijfers_Wijken_en_Buurten_Stat".into(),
            info_template: "Template:CBS_Kerncijfers_Wijken_en_Buurten".into(),
        }
    }
}

impl WikiPages {
    /// Per-year data submodule, e.g. `Module:..._Data/2023`.
    pub fn data_submodule(&self, year: i32) -> String {
        format!("{}/{}", self.dispatcher_module, year)
    }

    /// Dispatcher page name without its namespace, as used by `#invoke`.
    pub fn dispatcher_base_name(&self) -> &str {
        strip_namespace(&self.dispatcher_module)
    }

    pub fn stat_template_name(&self) -> &str {
        strip_namespace(&self.stat_template)
    }
}

/// `Template:Foo` -> `Foo`; names without a namespace are returned as is.
pub fn strip_namespace(page: &str) -> &str {
    page.split_once(':').map(|(_, rest)| rest).unwrap_or(page)
}

/// File-system friendly form of a page name (`:` becomes `_`).
pub fn page_file_stem(page: &str) -> String {
    page.replace(':', "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset_id: String,
    /// Field holding the region code (GMxxxx, WKxxxxxx, BUxxxxxxxx).
    pub identifier_key: String,
    /// Field holding the region type (Gemeente, Wijk, Buurt, ...).
    pub region_type_key: String,
    /// Metadata discriminator marking an entry as a statistic.
    pub topic_type: String,
    /// Stable base names of the statistics to publish, in display order.
    pub required_stats: Vec<String>,
    pub region_types: BTreeSet<String>,
    pub template_dir: PathBuf,
    pub wiki: WikiPages,
}

impl Default for Config {
    fn default() -> Self {
        let required_stats = [
            "AantalInwoners",
            "Mannen",
            "Vrouwen",
            "Woningvoorraad",
            "OppervlakteTotaal",
            "OppervlakteLand",
            "OppervlakteWater",
            "Bevolkingsdichtheid",
        ];
        Self {
            dataset_id: DEFAULT_DATASET_ID.into(),
            identifier_key: "Codering_3".into(),
            region_type_key: "SoortRegio_2".into(),
            topic_type: DEFAULT_TOPIC_TYPE.into(),
            required_stats: required_stats.iter().map(|s| s.to_string()).collect(),
            region_types: ["Gemeente", "Wijk"].iter().map(|s| s.to_string()).collect(),
            template_dir: PathBuf::from("templates"),
            wiki: WikiPages::default(),
        }
    }
}

impl Config {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Config = serde_json::from_str(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()
    }

    /// Normalize whitespace and reject configurations the pipeline cannot run with.
    pub fn validate(mut self) -> Result<Self> {
        self.region_types = self
            .region_types
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.required_stats = self
            .required_stats
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if self.required_stats.is_empty() {
            return Err(Error::InvalidConfig("no required statistics configured".into()));
        }
        if self.region_types.is_empty() {
            return Err(Error::InvalidConfig("no region types configured".into()));
        }
        if self.identifier_key.trim().is_empty() || self.region_type_key.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "identifier and region type field names must be set".into(),
            ));
        }
        if self.dataset_id.trim().is_empty() {
            return Err(Error::InvalidConfig("dataset id must be set".into()));
        }
        Ok(self)
    }
}
