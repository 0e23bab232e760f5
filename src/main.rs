use clap::{Parser, Subcommand};
use makefsdata::config::{self, GeneratorConfig};
use makefsdata::scan::{self, InputSet};
use makefsdata::{generate, output};
use std::path::PathBuf;
use tracing::Level;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "makefsdata")]
#[command(about = "Embed static web files as C arrays for lwIP's httpd")]
#[command(long_about = "\
Embed static web files as C arrays for lwIP's httpd

Every file becomes a byte array holding its URL path and a complete
pre-rendered HTTP response (status line, Server, Content-Length,
Content-Type, body). A linked list of fsdata_file descriptors, rooted at
FS_ROOT, lets the server look files up without a filesystem.

Input layout:

  fs/
  ├── makefsdata.toml      # Generator settings (optional, not embedded)
  ├── index.html           # → /index.html, 200 OK
  ├── 404.html             # → /404.html, served with 404 File not found
  ├── status.shtml         # Dynamic (SSI): no Content-Length
  └── img/
      └── logo.svg         # → /img/logo.svg

Files are declared in walk order: at each level files come before
subdirectories, both sorted by name. The last declared file is FS_ROOT.
Hidden files are skipped. Unknown extensions abort the run.

Run 'makefsdata gen-config' to print a documented makefsdata.toml.")]
#[command(version = version_string())]
struct Cli {
    /// File to embed (repeatable); replaces the directory walk
    #[arg(short, long = "input", global = true)]
    input: Vec<PathBuf>,

    /// Directory to walk when no --input is given
    #[arg(short, long, default_value = "fs", global = true)]
    dir: PathBuf,

    /// Generated C source file
    #[arg(short, long, default_value = "fsdata.c", global = true)]
    output: PathBuf,

    /// Config file (default: makefsdata.toml in --dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Encode all files and write the C source (default)
    Generate,
    /// Encode all files without writing anything
    Check,
    /// Print a JSON manifest of the descriptor chain
    Scan,
    /// Print a stock makefsdata.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => {
            let (input, config) = resolve_inputs(&cli)?;
            let report = generate::generate(&input, &config, &cli.output)?;
            output::print_generate_output(&report);
        }
        Command::Check => {
            let (input, config) = resolve_inputs(&cli)?;
            let chain = generate::assemble(&input, &config)?;
            output::print_check_output(&chain);
        }
        Command::Scan => {
            let (input, config) = resolve_inputs(&cli)?;
            let chain = generate::assemble(&input, &config)?;
            let json = serde_json::to_string_pretty(&generate::manifest(&chain))?;
            println!("{}", json);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays clean for `scan` JSON.
fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Discover input files and load the config that applies to them.
///
/// An explicit `--config` always wins. Otherwise a directory walk picks up
/// `makefsdata.toml` from the walked directory, and an explicit file list
/// uses stock defaults.
fn resolve_inputs(cli: &Cli) -> Result<(InputSet, GeneratorConfig), Box<dyn std::error::Error>> {
    let walking = cli.input.is_empty();
    let input = if walking {
        scan::walk(&cli.dir)?
    } else {
        scan::from_paths(&cli.input)?
    };

    let config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None if walking => config::load_config(&cli.dir)?,
        None => GeneratorConfig::default(),
    };

    tracing::info!(
        files = input.len(),
        root = %input.root.display(),
        "input resolved"
    );
    Ok((input, config))
}
