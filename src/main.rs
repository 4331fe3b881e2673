use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};

use tileburn::config::{self, ConfigOption};
use tileburn::convert::{convert_all, ConvertOptions};
use tileburn::filter::EndDate;
use tileburn::labels::Nomenclature;
use tileburn::pipeline::RasterizeJob;

#[derive(Debug, Parser)]
#[command(name = "tileburn")]
#[command(author, version, about = "Burn land-cover and cadastre vectors onto raster tiles", long_about = None)]
struct Cli {
    /// GDAL configuration option, may be repeated
    #[arg(long = "config", value_name = "KEY=VALUE", global = true)]
    config: Vec<ConfigOption>,

    /// More output, repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert vector files, GeoJSON to ESRI Shapefile by default
    Convert {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Number of parallel conversions
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,

        /// Output driver
        #[arg(short, long, default_value = "ESRI Shapefile")]
        format: String,

        /// Extension of the output files
        #[arg(long, default_value = "shp")]
        extension: String,

        /// Only print the conversions
        #[arg(long)]
        dry_run: bool,

        /// Keep outputs that already exist
        #[arg(long, conflicts_with = "overwrite")]
        skip_existing: bool,

        /// Replace outputs that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// Rasterize vector polygons onto every tile
    Rasterize {
        /// Raster tiles defining the output grids
        #[arg(required = true)]
        tiles: Vec<PathBuf>,

        /// Vector files to burn
        #[arg(short, long, num_args = 1.., required = true)]
        shapefiles: Vec<PathBuf>,

        /// Classification scheme: UA2012, UA2006 or cadastre
        #[arg(short, long)]
        dataset: Nomenclature,

        /// Read and clip but write nothing
        #[arg(long, alias = "dry-run")]
        dry: bool,

        /// Remove objects created after this date (YYYY-mm-dd)
        #[arg(long, alias = "end_date", value_name = "YYYY-mm-dd")]
        end_date: Option<EndDate>,

        /// Keep tiles whose output already exists
        #[arg(long)]
        skip_existing: bool,

        /// Burn every pixel touched by a polygon
        #[arg(long)]
        all_touched: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    config::route_gdal_messages_to_log();
    config::apply(&cli.config).context("Failed to set GDAL configuration")?;

    match cli.command {
        Commands::Convert {
            files,
            jobs,
            format,
            extension,
            dry_run,
            skip_existing,
            overwrite,
        } => {
            let options = ConvertOptions {
                jobs,
                format,
                extension,
                dry_run,
                skip_existing,
                overwrite,
            };
            let conversions = convert_all(&files, &options).context("Conversion failed")?;
            let failed = conversions.iter().filter(|c| c.is_failure()).count();
            if failed > 0 {
                error!("{} of {} conversions failed", failed, conversions.len());
                return Ok(ExitCode::FAILURE);
            }
            info!("Converted {} files", conversions.len());
        }
        Commands::Rasterize {
            tiles,
            shapefiles,
            dataset,
            dry,
            end_date,
            skip_existing,
            all_touched,
        } => {
            let job = RasterizeJob {
                tiles,
                shapefiles,
                nomenclature: dataset,
                end_date,
                dry_run: dry,
                skip_existing,
                all_touched,
                show_progress: !cli.quiet,
            };
            let summary = job.run().context("Rasterization failed")?;
            info!(
                "Done: {} written, {} planned, {} existing, {} without shapes",
                summary.written, summary.planned, summary.skipped_existing, summary.empty
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
