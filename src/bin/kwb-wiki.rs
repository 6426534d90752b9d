use anyhow::{Context, Result};
use clap::Parser;
use kwb_wiki::pipeline::{self, DataOrigin, Workspace};
use kwb_wiki::source::{CbsClient, DatasetSource};
use kwb_wiki::wiki::DocumentKind;
use kwb_wiki::{Config, Generator, TemplateStore, storage};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kwb-wiki",
    version,
    about = "Download CBS Kerncijfers Wijken en Buurten data and generate wiki Lua modules and templates"
)]
struct Cli {
    /// Target year of the data (e.g. 2023).
    year: i32,
    /// Force a fresh download of the CBS source tables.
    #[arg(long, default_value_t = false)]
    overwrite: bool,
    /// Ignore the cached filtered data and filter the source again.
    #[arg(long, default_value_t = false)]
    overwrite_stripped: bool,
    /// Override the CBS dataset id (default 85984NED or the config file value).
    #[arg(long)]
    dataset_id: Option<String>,
    /// JSON file overriding the built-in configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the per-year data and output folders.
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Directory containing the Lua/wikitext templates.
    #[arg(long)]
    templates: Option<PathBuf>,
    /// Also export the filtered data as CSV to this path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(id) = &cli.dataset_id {
        config.dataset_id = id.clone();
    }
    if let Some(dir) = &cli.templates {
        config.template_dir = dir.clone();
    }
    Ok(config.validate()?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let ws = Workspace::new(&cli.root, cli.year);

    log::info!("kwb-wiki {} for year {}", env!("CARGO_PKG_VERSION"), cli.year);
    log::info!("required statistics (base names): {}", config.required_stats.join(", "));
    log::info!("dataset {}, data {}, output {}", config.dataset_id, ws.data_dir.display(), ws.output_dir.display());

    // 1. Source tables
    CbsClient::default()
        .ensure_local(&config.dataset_id, &ws.data_dir, cli.overwrite)
        .context("obtaining CBS source data")?;

    // 2. Key map
    let keys = pipeline::resolve_from_file(ws.data_properties_path(), &config)?;
    if let Err(e) = storage::save_json(&keys.key_map, ws.key_map_path()) {
        log::warn!("could not write key map: {e}");
    }
    let required = keys.required_full_keys();

    // 3. Compact data
    let (data, origin) = pipeline::obtain_compact_data(&ws, &config, &required, cli.overwrite_stripped)?;
    if origin == DataOrigin::Computed {
        log::info!("cache now reflects base names: {}", config.required_stats.join(", "));
    }
    if let Some(path) = &cli.csv {
        storage::save_csv(&data, path)?;
        log::info!("exported {} regions to {}", data.len(), path.display());
    }

    // 4. Documents
    let generator = Generator {
        config: &config,
        keys: &keys,
        data: &data,
        year: cli.year,
        generated_at: chrono::Utc::now().to_rfc3339(),
    };
    let templates = TemplateStore::new(&config.template_dir);
    let mut failed = Vec::new();
    for (kind, rendered) in pipeline::render_documents(&generator, &templates) {
        let written = rendered.and_then(|doc| {
            pipeline::write_document(&doc, &ws.output_dir).map(|path| (doc, path))
        });
        match written {
            Ok((doc, path)) => log::info!("generated {} -> upload to '{}'", path.display(), doc.page),
            Err(e) => {
                log::error!("{:?} not generated: {e}", kind);
                failed.push(kind);
            }
        }
    }

    if !failed.contains(&DocumentKind::Dispatcher) {
        log::info!(
            "manual step: create/update '{}' on the wiki with the contents of {}",
            config.wiki.dispatcher_module,
            generator.file_name(DocumentKind::Dispatcher)
        );
    }
    if !failed.is_empty() {
        anyhow::bail!("{} of {} documents failed: {:?}", failed.len(), DocumentKind::ALL.len(), failed);
    }
    log::info!("all documents written to {}", ws.output_dir.display());
    Ok(())
}
