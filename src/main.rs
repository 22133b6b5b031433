use clap::{Parser, Subcommand};
use static_folio::config::{self, SiteConfig};
use static_folio::entity::Kind;
use static_folio::generate::{self, SiteBuilder};
use static_folio::store::{ContentStore, SqliteStore};
use static_folio::{ingest, output};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "static-folio")]
#[command(about = "Static site generator for a personal blog and project portfolio")]
#[command(long_about = "\
Static site generator for a personal blog and project portfolio

Posts and projects live in a SQLite database. Markdown files can be imported
into it, and every build renders the whole site from the database.

Layout:

  config.toml                      # Site config (optional)
  content/
  ├── posts/*.md                   # Imported with `add posts` / `rewrite posts`
  └── projects/*.md                # Imported with `add projects` / `rewrite projects`
  static/                          # Copied to dist/static/
  templates/                       # Optional Tera theme (paths.templates_dir)
  data/portfolio.db                # Content database
  dist/                            # Build output

Run 'static-folio gen-config' to generate a documented config.toml.
Set RUST_LOG=info (or debug) for diagnostics on stderr.")]
#[command(version)]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory (overrides paths.output_dir)
    #[arg(long, env = "STATIC_FOLIO_OUTPUT", global = true)]
    output: Option<PathBuf>,

    /// Content database (overrides paths.database)
    #[arg(long, env = "STATIC_FOLIO_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the content database and its tables
    InitDb,
    /// Import Markdown files whose slug is not in the database yet
    Add {
        /// `posts` or `projects`
        kind: Kind,
    },
    /// Re-import every Markdown file, overwriting existing entries
    Rewrite {
        /// `posts` or `projects`
        kind: Kind,
    },
    /// Move an entry to the archive
    Delete {
        /// `posts` or `projects`
        kind: Kind,
        slug: String,
    },
    /// List live (or archived) entries
    List {
        /// `posts` or `projects`
        kind: Kind,
        /// Show archived entries instead
        #[arg(long)]
        archived: bool,
    },
    /// Validate database contents without building
    Check,
    /// Render the full site into the output directory
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_subscriber("warn");

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Command::InitDb => {
            let store = SqliteStore::open(&config.paths.database)?;
            println!(
                "{}",
                output::format_init_db(&config.paths.database, store.schema_version()?)
            );
        }
        Command::Add { kind } => {
            let mut store = SqliteStore::open(&config.paths.database)?;
            let report = ingest::add_new(
                &mut store,
                kind,
                &config.paths.content_dir,
                &config.build.datetime_format,
            )?;
            output::print_ingest_output(&report);
        }
        Command::Rewrite { kind } => {
            let mut store = SqliteStore::open(&config.paths.database)?;
            let report = ingest::rewrite_all(
                &mut store,
                kind,
                &config.paths.content_dir,
                &config.build.datetime_format,
            )?;
            output::print_ingest_output(&report);
        }
        Command::Delete { kind, slug } => {
            let mut store = SqliteStore::open(&config.paths.database)?;
            let archived = store.soft_delete(kind, &slug)?;
            println!("{}", output::format_deleted(&archived));
        }
        Command::List { kind, archived } => {
            let store = SqliteStore::open(&config.paths.database)?;
            let date_format = &config.build.date_format;
            if archived {
                output::print_archived_list(kind, &store.list_archived(kind)?, date_format);
            } else {
                output::print_entry_list(kind, &store.list_all(kind)?, date_format);
            }
        }
        Command::Check => {
            let store = SqliteStore::open(&config.paths.database)?;
            let report = generate::check(&store)?;
            output::print_check_output(&report);
            if !report.skipped.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Build => {
            init_thread_pool(&config.build);
            let store = SqliteStore::open(&config.paths.database)?;
            let output_dir = config.paths.output_dir.clone();
            let builder = SiteBuilder::from_config(config)?;
            println!("==> Building {}", output_dir.display());
            let report = builder.build(&store, &output_dir)?;
            output::print_build_output(&report, &output_dir);
            if report.should_fail(&builder.config().build) {
                eprintln!(
                    "{} file(s) could not be written",
                    report.write_failures.len()
                );
                std::process::exit(1);
            }
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Load `--config` and apply the path overrides from flags or environment.
fn load_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(output) = &cli.output {
        config.paths.output_dir = output.clone();
    }
    if let Some(database) = &cli.database {
        config.paths.database = database.clone();
    }
    info!(
        config = %cli.config.display(),
        database = %config.paths.database.display(),
        output = %config.paths.output_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

/// Install the stderr subscriber. `RUST_LOG` overrides `level`.
fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Initialize the rayon thread pool based on build config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(build: &config::BuildConfig) {
    let threads = config::effective_threads(build);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
