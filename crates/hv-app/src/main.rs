//! `hostview`: render the hosts dashboard projections and export query results

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use hv_core::{ActiveView, SortKey};
use hv_data::{load_query_results, results_to_csv, EngineConfig, HostSource, JsonHostSource};
use hv_views::HostsView;

#[derive(Parser)]
#[command(name = "hostview")]
#[command(about = "Host table, network graph and map projections", long_about = None)]
struct Cli {
    /// Path to a JSON engine config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active view for a host collection as JSON
    View {
        /// Hosts JSON file
        #[arg(long)]
        hosts: PathBuf,
        /// Search term matched against names, apps and tags
        #[arg(long, default_value = "")]
        search: String,
        /// Column to sort by; repeat to toggle the direction
        #[arg(long = "sort")]
        sort: Vec<SortKey>,
        /// table, graph or map
        #[arg(long, default_value = "table")]
        view: ActiveView,
    },
    /// Write the first series of a query result as CSV
    Export {
        /// Query results JSON file
        #[arg(long)]
        results: PathBuf,
        /// Destination file, defaults to `<series name>.csv`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::View { hosts, search, sort, view } => {
            run_view(&config, &hosts, search, &sort, view)
        }
        Commands::Export { results, output } => run_export(&config, &results, output),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    EngineConfig::from_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

fn run_view(
    config: &EngineConfig,
    hosts_path: &Path,
    search: String,
    sort: &[SortKey],
    view: ActiveView,
) -> Result<()> {
    let source = JsonHostSource::new(hosts_path);
    let mut hosts_view = HostsView::new(config);

    hosts_view.set_loading(true);
    match source.load_hosts() {
        Ok(hosts) => hosts_view.set_hosts(hosts),
        Err(e) => {
            tracing::error!(source = source.source_name(), error = %e, "failed to load hosts");
            hosts_view.set_error(Some(e.to_string()));
        }
    }
    hosts_view.set_loading(false);

    hosts_view.set_search_term(search);
    for key in sort {
        hosts_view.toggle_sort(*key);
    }
    hosts_view.set_active_view(view);

    let output = serde_json::json!({
        "title": hosts_view.title(),
        "state": hosts_view.state(),
        "content": hosts_view.active_content(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn run_export(config: &EngineConfig, results_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let results = load_query_results(results_path)
        .with_context(|| format!("failed to read query results from {}", results_path.display()))?;
    let export = results_to_csv(&results, &config.csv).context("failed to build CSV")?;

    let output = output.unwrap_or_else(|| default_output(&export.name));
    std::fs::write(&output, &export.csv_string)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(path = %output.display(), series = %export.name, "exported CSV");
    Ok(())
}

/// File name in the working directory for a series; path separators in the
/// name are replaced so it cannot point elsewhere
fn default_output(series_name: &str) -> PathBuf {
    if series_name.is_empty() {
        return PathBuf::from("export.csv");
    }

    let file_stem: String = series_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    PathBuf::from(format!("{file_stem}.csv"))
}
