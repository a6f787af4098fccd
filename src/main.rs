use anyhow::{Context, Result};
use gfm_preview::{Config, Display, HtmlFile, Session, Stdout, watch};
use tracing_subscriber::EnvFilter;

/// Installs the log subscriber.
///
/// `--verbose` forces debug level, otherwise `RUST_LOG` decides and
/// defaults to warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Publishes the initial preview and optionally keeps it in sync.
fn serve<D: Display>(config: &Config, display: D) -> Result<Session<D>> {
    let source = config.read_input()?;
    let mut session = Session::new(config.pipeline(), display);
    session
        .set_text(source)
        .context("Failed to publish preview")?;
    Ok(session)
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);
    config.validate().context("Invalid configuration")?;

    if config.writes_stdout() {
        let mut session = serve(&config, Stdout)?;
        if config.watch {
            watch::watch(&config.input, &mut session)?;
        }
        return Ok(());
    }

    let display = HtmlFile::new(&config.output, config.page_title(), config.theme())
        .context("Failed to prepare preview page")?;
    let mut session = serve(&config, display)?;

    println!("Generated: {}", config.output.display());

    if config.open {
        open::that(&config.output)
            .with_context(|| format!("Failed to open {}", config.output.display()))?;
    }

    if config.watch {
        watch::watch(&config.input, &mut session)?;
    }

    Ok(())
}
