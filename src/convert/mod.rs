//! Batch conversion of vector files, the library side of `tileburn convert`.
//!
//! Each input is translated independently with [`vector_translate`], so a
//! batch runs as a flat parallel map on a rayon pool.

mod vector_translate;

use std::path::{Path, PathBuf};

use gdal::Dataset;
use log::{error, info};
use rayon::prelude::*;

use crate::errors::{Result, TileburnError};

pub use vector_translate::{vector_translate, VectorTranslateOptions};

/// Options of a conversion batch.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Number of worker threads, `1` or less runs sequentially.
    pub jobs: usize,
    /// Short name of the output driver.
    pub format: String,
    /// Extension of the written files, without leading dot.
    pub extension: String,
    /// Only log the conversions.
    pub dry_run: bool,
    /// Keep outputs that already exist.
    pub skip_existing: bool,
    /// Replace outputs that already exist.
    pub overwrite: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            jobs: 1,
            format: "ESRI Shapefile".to_string(),
            extension: "shp".to_string(),
            dry_run: false,
            skip_existing: false,
            overwrite: false,
        }
    }
}

/// Outcome of converting one file.
#[derive(Debug)]
pub enum ConversionStatus {
    Converted,
    Planned,
    SkippedExisting,
    Failed(TileburnError),
}

#[derive(Debug)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: ConversionStatus,
}

impl Conversion {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, ConversionStatus::Failed(_))
    }
}

/// Same directory and stem as `input`, with `extension`.
pub fn shapefile_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

fn translate(input: &Path, output: &Path, options: &ConvertOptions) -> Result<()> {
    let dataset = Dataset::open(input)?;
    let translate_options = VectorTranslateOptions::with_format(&options.format, options.overwrite)?;
    vector_translate(&dataset, output, Some(&translate_options))
}

/// Converts a single file, never failing: errors end up in the status.
pub fn convert_one(input: &Path, options: &ConvertOptions) -> Conversion {
    let output = shapefile_path(input, &options.extension);
    let status = if options.skip_existing && output.exists() {
        info!("Skipping existing {}", output.display());
        ConversionStatus::SkippedExisting
    } else {
        info!(
            "Running ogr2ogr -f \"{}\" {} {}",
            options.format,
            output.display(),
            input.display()
        );
        if options.dry_run {
            ConversionStatus::Planned
        } else {
            match translate(input, &output, options) {
                Ok(()) => ConversionStatus::Converted,
                Err(e) => {
                    error!("Converting {} failed: {}", input.display(), e);
                    ConversionStatus::Failed(e)
                }
            }
        }
    };
    Conversion {
        input: input.to_path_buf(),
        output,
        status,
    }
}

/// Converts every file of `inputs`, on `options.jobs` threads.
///
/// Results are in input order. A failing file does not stop the others.
pub fn convert_all<P: AsRef<Path> + Sync>(
    inputs: &[P],
    options: &ConvertOptions,
) -> Result<Vec<Conversion>> {
    if options.jobs <= 1 {
        return Ok(inputs
            .iter()
            .map(|input| convert_one(input.as_ref(), options))
            .collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .thread_name(|i| format!("convert-{i}"))
        .build()?;
    Ok(pool.install(|| {
        inputs
            .par_iter()
            .map(|input| convert_one(input.as_ref(), options))
            .collect()
    }))
}
