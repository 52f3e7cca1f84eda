use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use wpick_core::config::{Config, SourceConfig};
use wpick_core::{AttributeBinding, Picker, SelectOption};
use wpick_rest::RestSource;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Posts,
    Pages,
    Terms,
}

#[derive(Parser)]
#[command(name = "wpick", about = "Search and pick WordPress posts, pages, or terms")]
struct Cli {
    /// Root URL of the WordPress site (http only).
    #[arg(long)]
    site: Option<String>,

    /// What to pick.
    #[arg(long, value_enum)]
    kind: Option<Kind>,

    /// Taxonomy for term pickers (implies `--kind terms`; conflicts with
    /// `--kind posts|pages`).
    #[arg(long)]
    taxonomy: Option<String>,

    /// Results requested per search (1-100).
    #[arg(long)]
    per_page: Option<u32>,

    /// Allow more than one selected option.
    #[arg(long)]
    multi: bool,

    /// Extra config file layered over the user config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON object of stored attributes; seeds the selection.
    #[arg(long)]
    attributes: Option<PathBuf>,

    /// Attribute key the selection is stored under.
    #[arg(long, default_value = "selectedOption")]
    key: String,

    /// Run one search without the TUI and print the options as JSON lines.
    #[arg(long)]
    query: Option<String>,

    /// Write debug logs to /tmp/wpick-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Reject flag combinations clap cannot express on its own.
    fn check(&self) -> Result<(), clap::Error> {
        if let (Some(kind @ (Kind::Posts | Kind::Pages)), Some(_)) = (self.kind, &self.taxonomy) {
            let kind = kind.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                format!("--taxonomy cannot be used with --kind {kind}"),
            ));
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = cli.check() {
        err.exit();
    }

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/wpick-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("wpick debug log started — tail -f /tmp/wpick-debug.log");
    }

    let mut config = Config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let source = {
        // hyper's pooled client must be built inside the runtime
        let _guard = runtime.enter();
        RestSource::from_config(&config)?
    };
    tracing::debug!(route = source.endpoint().route(), "search source ready");

    let mut picker_config = config.picker.clone();
    if cli.query.is_some() {
        picker_config.debounce_ms = 0;
    }
    let picker = Picker::new(picker_config, Arc::new(source), runtime.handle().clone())?
        .with_error_hook(|err| tracing::warn!(error = %err, "load failed"))?
        .with_binding(binding(&cli)?);

    match &cli.query {
        Some(query) => headless(&runtime, picker, query),
        None => {
            if let Some(picker) = wpick_tui::run(picker, &config)? {
                let attributes = picker.attributes().cloned().unwrap_or_default();
                println!("{}", Value::Object(attributes));
            }
            Ok(())
        }
    }
}

/// Layer command-line flags over the loaded config.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(site) = &cli.site {
        config.site.base_url = site.clone();
    }
    match (cli.kind, &cli.taxonomy) {
        (Some(Kind::Posts), _) => config.picker.source = SourceConfig::Posts,
        (Some(Kind::Pages), _) => config.picker.source = SourceConfig::Pages,
        (Some(Kind::Terms), None) => {
            if !matches!(config.picker.source, SourceConfig::Terms { .. }) {
                config.picker.source = SourceConfig::terms("category");
            }
        }
        (Some(Kind::Terms) | None, Some(taxonomy)) => {
            config.picker.source = SourceConfig::terms(taxonomy.clone());
        }
        (None, None) => {}
    }
    if let Some(per_page) = cli.per_page {
        config.picker.per_page = per_page;
    }
    if cli.multi {
        config.picker.multi = true;
    }
}

fn binding(cli: &Cli) -> anyhow::Result<AttributeBinding> {
    let stored: Map<String, Value> = match &cli.attributes {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Map::new(),
    };
    let binding = AttributeBinding::new(cli.key.clone(), stored, |update: Map<String, Value>| {
        tracing::debug!(?update, "attributes updated");
    })?;
    Ok(binding)
}

/// Run a single search and print one JSON object per option. The
/// searchable and disabled flags only gate interactive input, so they do not
/// apply here.
fn headless(runtime: &tokio::runtime::Runtime, mut picker: Picker, query: &str) -> anyhow::Result<()> {
    picker.search_now(query);
    let outcome = runtime.block_on(picker.next_delivery());
    tracing::debug!(?outcome, count = picker.options().len(), "headless search done");

    for option in picker.options() {
        println!("{}", line(option));
    }
    Ok(())
}

fn line(option: &SelectOption) -> Value {
    json!({ "id": option.id(), "label": option.label })
}
