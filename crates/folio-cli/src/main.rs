use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use folio_client::{
    FolioConfig, Gallery, GalleryManifest, HttpFetcher, HttpTransport, ImageStatus,
    SubmissionController, Url,
};
use folio_core::{ContactForm, SubmitOutcome};

#[derive(Parser)]
#[command(name = "folio", about = "Portfolio contact form and lazy gallery tools")]
struct Cli {
    /// Path to folio.toml (default: $FOLIO_CONFIG, then ./folio.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the contact form once
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,

        /// Endpoint access key (default: read from the configured env var)
        #[arg(long)]
        access_key: Option<String>,

        /// Override the configured endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Print the final form state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a scroll session over a gallery manifest
    Gallery {
        /// Manifest file with [[image]] entries
        manifest: PathBuf,

        /// Scroll offsets to visit, in order
        #[arg(
            long = "scroll",
            value_delimiter = ',',
            default_value = "0",
            allow_negative_numbers = true
        )]
        scroll: Vec<f64>,

        #[arg(long, default_value_t = 1280.0)]
        viewport_width: f64,

        #[arg(long, default_value_t = 800.0)]
        viewport_height: f64,

        /// Base URL for relative image sources
        #[arg(long)]
        base_url: Option<String>,

        /// Only track activation; never download anything
        #[arg(long)]
        no_fetch: bool,

        /// Print one JSON document per scroll step
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<FolioConfig> {
    FolioConfig::load(cli.config.as_deref()).context("failed to load config")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Submit {
            name,
            email,
            message,
            access_key,
            endpoint,
            json,
        } => {
            let form = ContactForm::new(name, email, message);
            cmd_submit(&cli, form, access_key.as_deref(), endpoint.as_deref(), *json).await
        }
        Commands::Gallery {
            manifest,
            scroll,
            viewport_width,
            viewport_height,
            base_url,
            no_fetch,
            json,
        } => {
            let opts = GalleryOpts {
                viewport: (*viewport_width, *viewport_height),
                base_url: base_url.as_deref(),
                fetch: !no_fetch,
                json: *json,
            };
            cmd_gallery(&cli, manifest, scroll, opts).await
        }
        Commands::Config => cmd_config(&cli),
    }
}

async fn cmd_submit(
    cli: &Cli,
    mut form: ContactForm,
    access_key: Option<&str>,
    endpoint: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config(cli)?;
    form.validate().context("form not sent")?;

    let Some(key) = config.access_key(access_key) else {
        bail!(
            "no access key: set {} or pass --access-key",
            config.contact.access_key_env
        );
    };
    let endpoint = endpoint.unwrap_or(config.contact.endpoint.as_str());
    let transport = HttpTransport::new(endpoint, config.request_timeout())
        .context("failed to build HTTP client")?;
    let controller = SubmissionController::new(transport, config.controller_options(key));
    tracing::info!("submitting contact form to {endpoint}");

    let outcome = tokio::select! {
        result = controller.submit(&mut form) => result.context("submission aborted")?,
        _ = tokio::signal::ctrl_c() => {
            controller.dispose();
            bail!("interrupted");
        }
    };

    let state = controller.state();
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else if let Some(message) = &state.message {
        println!("{message}");
    }

    match outcome {
        SubmitOutcome::Sent => Ok(()),
        SubmitOutcome::Rejected => bail!("endpoint rejected the submission"),
        SubmitOutcome::NetworkError => bail!("could not reach {endpoint}"),
        SubmitOutcome::Ignored => bail!("a submission was already in flight"),
    }
}

struct GalleryOpts<'a> {
    viewport: (f64, f64),
    base_url: Option<&'a str>,
    fetch: bool,
    json: bool,
}

async fn cmd_gallery(
    cli: &Cli,
    manifest_path: &Path,
    scroll: &[f64],
    opts: GalleryOpts<'_>,
) -> Result<()> {
    let config = load_config(cli)?;
    let options = config.watch_options()?;
    let manifest = GalleryManifest::load(manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;

    let mut fetcher = HttpFetcher::new(config.request_timeout())?;
    if let Some(base) = opts.base_url {
        let base = Url::parse(base).with_context(|| format!("invalid base url {base}"))?;
        fetcher = fetcher.with_base(base);
    }

    let (width, height) = opts.viewport;
    let mut gallery = Gallery::mount(&manifest, width, height, options);
    tracing::info!("mounted {} images", gallery.len());

    for &y in scroll {
        let activated = gallery.scroll_to(y);
        let report = if opts.fetch {
            Some(gallery.load_pending(&fetcher).await)
        } else {
            None
        };

        let statuses = gallery.statuses();
        if opts.json {
            let step = serde_json::json!({
                "scroll": y,
                "activated": activated,
                "report": report,
                "images": statuses,
            });
            println!("{}", serde_json::to_string(&step)?);
        } else {
            print_step(y, &statuses, report.map(|r| (r.loaded, r.failed)));
        }
    }

    gallery.dispose();
    Ok(())
}

fn print_step(y: f64, statuses: &[ImageStatus], report: Option<(usize, usize)>) {
    match report {
        Some((loaded, failed)) => println!("scroll {y}: loaded={loaded} failed={failed}"),
        None => println!("scroll {y}:"),
    }
    for status in statuses {
        let s = status.state;
        let label = match (s.loaded, s.activated) {
            (true, _) => "loaded",
            (false, true) => "activated",
            (false, false) if s.observed => "watching",
            _ => "idle",
        };
        println!("  {:<10} {}", label, status.src);
    }
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
