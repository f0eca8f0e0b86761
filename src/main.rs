use anyhow::{Context, Result};
use clap::Parser;
use pageverdict::cli::{Cli, OutputFormat};
use pageverdict::config::Config;
use pageverdict::evidence::Evidence;
use pageverdict::pipeline::ClassifyPipeline;
use pageverdict::session;
use pageverdict::signatures::SignatureCatalog;
use std::io::Read;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr; `--debug` forces TRACE, otherwise RUST_LOG or warn
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Cli) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default_config().context("Built-in config is invalid")?,
    };
    if args.apply_overrides(&mut config) {
        config.refresh_digest();
        config
            .validate()
            .context("Command-line overrides produced an invalid config")?;
    }
    Ok(config)
}

fn load_catalog(args: &Cli) -> Result<SignatureCatalog> {
    match &args.signatures {
        Some(path) => SignatureCatalog::from_toml(path)
            .with_context(|| format!("Failed to load signatures {}", path.display())),
        None => SignatureCatalog::default_catalog().context("Built-in signature catalog is invalid"),
    }
}

fn load_session(args: &Cli) -> Result<Evidence> {
    if args.session_from_stdin() {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read session from stdin")?;
        return session::parse_slice(&bytes).context("Failed to parse session from stdin");
    }
    let path = args
        .session
        .as_ref()
        .context("No session file given")?;
    session::load(path).with_context(|| format!("Failed to load session {}", path.display()))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let catalog = Arc::new(load_catalog(&args)?);
    info!(
        config_version = %config.version,
        config_digest = config.digest(),
        signatures_version = catalog.version(),
        signatures_digest = catalog.digest(),
        "tables loaded"
    );

    if args.print_config {
        println!("# config {} sha256:{}", config.version, config.digest());
        println!(
            "# signatures {} sha256:{} ({} fingerprints)",
            catalog.version(),
            catalog.digest(),
            catalog.len()
        );
        print!(
            "{}",
            config
                .to_toml_string()
                .context("Failed to render config")?
        );
        return Ok(());
    }

    let pipeline = ClassifyPipeline::from_config(&config, Arc::clone(&catalog))
        .context("Failed to build classification pipeline")?;
    let evidence = load_session(&args)?;
    let verdict = session::classify_session(&pipeline, &catalog, &evidence);

    match args.format {
        OutputFormat::Json => println!(
            "{}",
            verdict
                .to_json_pretty()
                .context("Failed to serialize verdict")?
        ),
        OutputFormat::Text => print!("{}", verdict.to_report_string()),
    }
    Ok(())
}
