//! kwb_wiki
//!
//! Turns the CBS "Kerncijfers Wijken en Buurten" dataset into Lua modules and
//! template pages for a MediaWiki. Pairs with the `kwb-wiki` CLI.
//!
//! ### Pipeline
//! - Resolve stable statistic names (`AantalInwoners`) to the edition's keys (`AantalInwoners_5`)
//! - Filter the typed dataset down to municipalities and districts, keeping only the
//!   required statistics
//! - Render the compact data and metadata into Lua and wikitext through `%%NAME%%` templates
//!
//! ### Example
//! ```no_run
//! use kwb_wiki::{Config, Generator, TemplateStore};
//! use kwb_wiki::pipeline::{self, Workspace};
//!
//! let config = Config::default();
//! let ws = Workspace::new(".", 2023);
//! let keys = pipeline::resolve_from_file(ws.data_properties_path(), &config)?;
//! let required = keys.required_full_keys();
//! let (data, _) = pipeline::obtain_compact_data(&ws, &config, &required, false)?;
//! let generator = Generator {
//!     config: &config,
//!     keys: &keys,
//!     data: &data,
//!     year: ws.year,
//!     generated_at: chrono::Utc::now().to_rfc3339(),
//! };
//! let templates = TemplateStore::new(&config.template_dir);
//! for (_, doc) in pipeline::render_documents(&generator, &templates) {
//!     pipeline::write_document(&doc?, &ws.output_dir)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod keys;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod template;
pub mod wiki;

pub use config::Config;
pub use error::{Error, Result};
pub use filter::{FilterOutcome, RecordFilter};
pub use keys::{ResolvedKeys, derive_base, resolve_keys};
pub use models::{CompactRegionData, KeyMap, MetadataRecord, RawRecord, Value};
pub use template::{Placeholders, TemplateStore};
pub use wiki::{Document, DocumentKind, Generator};
