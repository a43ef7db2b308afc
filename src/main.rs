use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use yogurt_thumbs::catalog::{build_catalog, write_catalog};
use yogurt_thumbs::config::{self, Validated};
use yogurt_thumbs::output;
use yogurt_thumbs::process::{self, ProcessOptions, ProcessSummary};

/// Shared flags for commands that generate thumbnails.
#[derive(clap::Args, Clone)]
struct ThumbnailArgs {
    /// Stop starting new files once this many have failed
    #[arg(long)]
    max_failures: Option<usize>,
}

#[derive(Parser)]
#[command(name = "yogurt-thumbs")]
#[command(about = "Image catalog and thumbnail generator for browser galleries")]
#[command(long_about = "\
Image catalog and thumbnail generator for browser galleries

Two phases, connected only by the catalog file:

  1. catalog     reads catalog.toml, lists the configured directories
                 (no recursion), sorts the images and writes db.json
  2. thumbnails  reads thumbnails.toml and db.json, writes one scaled
                 thumbnail per entry under <catalog dir>/<thumbnail_dir>/

Layout produced:

  img/
  ├── db.json                      # Ordered catalog, one path per image
  ├── japan-photos/
  │   ├── 001.jpg
  │   └── fuji.gif
  └── thumb/
      └── japan-photos/
          ├── 001.jpg              # Longer edge = thumbnail_size
          └── fuji.png             # GIF and BMP become PNG

Run 'yogurt-thumbs gen-config catalog' (or 'thumbnails') to generate a
documented config file.")]
#[command(version)]
struct Cli {
    /// Log debug detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the ordered catalog file
    Catalog {
        #[arg(long, default_value = "catalog.toml")]
        config: PathBuf,
    },
    /// Generate thumbnails for every catalog entry
    Thumbnails {
        #[arg(long, default_value = "thumbnails.toml")]
        config: PathBuf,
        #[command(flatten)]
        args: ThumbnailArgs,
    },
    /// Run both phases: catalog → thumbnails
    Build {
        #[arg(long, default_value = "catalog.toml")]
        catalog_config: PathBuf,
        #[arg(long, default_value = "thumbnails.toml")]
        thumbnails_config: PathBuf,
        #[command(flatten)]
        args: ThumbnailArgs,
    },
    /// Print a stock config file with all options documented
    GenConfig { phase: Phase },
}

#[derive(Clone, Copy, ValueEnum)]
enum Phase {
    Catalog,
    Thumbnails,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match cli.command {
        Command::Catalog { config } => {
            run_catalog(&config)?;
        }
        Command::Thumbnails { config, args } => {
            run_thumbnails(&config, &args)?;
        }
        Command::Build {
            catalog_config,
            thumbnails_config,
            args,
        } => {
            run_catalog(&catalog_config)?;
            run_thumbnails(&thumbnails_config, &args)?;
            println!("==> Build complete");
        }
        Command::GenConfig { phase } => match phase {
            Phase::Catalog => print!("{}", config::stock_catalog_toml()),
            Phase::Thumbnails => print!("{}", config::stock_thumbnails_toml()),
        },
    }

    Ok(())
}

fn run_catalog(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Config warnings are logged during validation.
    let Validated { config, .. } = config::load_catalog_config(config_path)?;

    output::print_banner("Cataloging", config.root());
    let catalog = build_catalog(&config)?;
    let catalog_path = config.catalog_path();
    write_catalog(&catalog_path, &catalog)?;
    output::print_catalog_output(&catalog_path, &catalog);
    Ok(())
}

/// Per-file failures are reported in the summary, not as an error.
fn run_thumbnails(
    config_path: &Path,
    args: &ThumbnailArgs,
) -> Result<ProcessSummary, Box<dyn std::error::Error>> {
    let Validated { config, .. } = config::load_thumbnail_config(config_path)?;

    output::print_banner("Generating thumbnails from", Path::new(&config.catalog_path));
    let options = ProcessOptions {
        max_failures: args.max_failures,
        ..ProcessOptions::default()
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(&config, &options, Some(tx));
    printer.join().ok();

    let summary = result?;
    output::print_process_summary(&summary);
    Ok(summary)
}
