//! Retrieval of CBS source tables through the **CBS OData v3 API**.
//!
//! A dataset is downloaded table by table. Metadata tables come from
//! `https://opendata.cbs.nl/ODataApi/odata/{dataset}/{table}?$format=json`; the
//! observations (`TypedDataSet`) come from the bulk `ODataFeed` service, because
//! `ODataApi` stops at 10,000 rows. Both page with `odata.nextLink`; the client
//! follows it until exhausted and stores the concatenated `value` rows as `{table}.json`.
//!
//! Typical usage:
//! ```no_run
//! # use kwb_wiki::source::{CbsClient, DatasetSource};
//! let client = CbsClient::default();
//! client.ensure_local("85984NED", std::path::Path::new("2023/cbs_data"), false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
use crate::storage;
use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Tables the pipeline reads; a local copy is complete when all are present.
pub const REQUIRED_TABLES: [&str; 3] = ["TypedDataSet", "DataProperties", "TableInfos"];

/// Tables served through the bulk feed instead of the row-capped API.
const BULK_TABLES: [&str; 1] = ["TypedDataSet"];

/// The single capability the pipeline needs from a data source.
pub trait DatasetSource {
    /// Make sure the source files for `dataset_id` exist in `dir`.
    /// With `force`, fetch them again even when they are present.
    fn ensure_local(&self, dataset_id: &str, dir: &Path, force: bool) -> Result<()>;
}

/// File name a table is stored under.
pub fn table_file(table: &str) -> String {
    format!("{table}.json")
}

/// `true` when every table in [`REQUIRED_TABLES`] has a file in `dir`.
pub fn source_files_present(dir: &Path) -> bool {
    dir.is_dir()
        && REQUIRED_TABLES.iter().all(|t| {
            let present = dir.join(table_file(t)).is_file();
            if !present {
                log::info!("required source file {} not found in {}", table_file(t), dir.display());
            }
            present
        })
}

#[derive(Debug, Clone)]
pub struct CbsClient {
    /// Row-capped API used for metadata tables.
    pub base_url: String,
    /// Bulk service used for `TypedDataSet`.
    pub feed_url: String,
    http: HttpClient,
}

impl Default for CbsClient {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("kwb_wiki/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://opendata.cbs.nl/ODataApi/odata".into(),
            feed_url: "https://opendata.cbs.nl/ODataFeed/odata".into(),
            http,
        }
    }
}

// Dataset ids are alphanumeric; keep the usual id punctuation readable.
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

impl CbsClient {
    /// URL of the first page of `table`.
    pub fn table_url(&self, dataset_id: &str, table: &str) -> String {
        let base = if BULK_TABLES.contains(&table) {
            &self.feed_url
        } else {
            &self.base_url
        };
        format!(
            "{}/{}/{}?$format=json",
            base.trim_end_matches('/'),
            percent_encoding::utf8_percent_encode(dataset_id.trim(), SAFE),
            table
        )
    }

    // Small retry for transient failures (5xx / network errors)
    fn get_json(&self, url: &str) -> Result<Value> {
        let mut last_err: Option<anyhow::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().context("decode json");
                }
                Ok(r) if r.status().is_server_error() => { /* retry */ }
                Ok(r) => bail!("request failed with HTTP {}", r.status()),
                Err(e) => last_err = Some(e.into()),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        bail!("network error: {:?}", last_err);
    }

    /// Fetch all rows of one table, following server-side paging.
    pub fn fetch_table(&self, dataset_id: &str, table: &str) -> Result<Vec<Value>> {
        // Safety cap to avoid pathological jobs
        let max_pages = 10_000u32;

        let mut next = Some(self.table_url(dataset_id, table));
        let mut rows = Vec::new();
        let mut pages = 0u32;
        while let Some(url) = next.take() {
            pages += 1;
            if pages > max_pages {
                bail!("page limit exceeded ({})", max_pages);
            }
            let v = self.get_json(&url).with_context(|| format!("GET {}", url))?;
            if let Some(err) = v.get("odata.error") {
                bail!("cbs api error: {}", err);
            }
            let page = v
                .get("value")
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow::anyhow!("unexpected response shape: no `value` array"))?;
            rows.extend(page.iter().cloned());
            next = v
                .get("odata.nextLink")
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        Ok(rows)
    }
}

impl DatasetSource for CbsClient {
    fn ensure_local(&self, dataset_id: &str, dir: &Path, force: bool) -> Result<()> {
        if !force && source_files_present(dir) {
            log::info!("source files found in {}, skipping download", dir.display());
            return Ok(());
        }
        log::info!(
            "{} dataset {} into {}",
            if force { "re-downloading" } else { "downloading" },
            dataset_id,
            dir.display()
        );
        for table in REQUIRED_TABLES {
            let rows = self
                .fetch_table(dataset_id, table)
                .with_context(|| format!("download table {table} of {dataset_id}"))?;
            log::info!("fetched {} rows of {}", rows.len(), table);
            storage::save_json(&rows, dir.join(table_file(table)))?;
        }
        if !source_files_present(dir) {
            bail!("download finished but source files are still missing in {}", dir.display());
        }
        Ok(())
    }
}
