use std::path::PathBuf;

use gdal::errors::GdalError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TileburnError>;

#[derive(Debug, Error)]
pub enum TileburnError {
    #[error(transparent)]
    Gdal(#[from] GdalError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid date '{value}', expected YYYY-mm-dd: {source}")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },
    #[error("Feature {fid:?} in '{path}' has no value for attribute '{attribute}'")]
    MissingAttribute {
        path: PathBuf,
        fid: Option<u64>,
        attribute: &'static str,
    },
    #[error("Feature {fid:?} in '{path}' has unknown class code '{code}'")]
    UnknownClassCode {
        path: PathBuf,
        fid: Option<u64>,
        code: String,
    },
    #[error("Clipping feature {fid:?} of '{path}' to a tile failed")]
    Intersection { path: PathBuf, fid: Option<u64> },
    #[error("Dataset '{0}' is not supported yet")]
    UnsupportedDataset(String),
    #[error("Unknown dataset '{0}', expected one of UA2012, UA2006, cadastre")]
    UnknownDataset(String),
    #[error("Raster '{path}' cannot be used as a tile: {reason}")]
    InvalidTile { path: PathBuf, reason: String },
    #[error("Vector file '{0}' has no layer")]
    NoLayer(PathBuf),
    #[error("Invalid configuration option '{0}', expected KEY=VALUE")]
    InvalidConfigOption(String),
    #[error("Invalid ogr2ogr arguments: {0}")]
    BadTranslateOptions(String),
    #[error("GDALVectorTranslate failed for '{path}': {msg}")]
    VectorTranslate { path: PathBuf, msg: String },
    #[error("String contains an interior nul byte: {0}")]
    FfiNulError(#[from] std::ffi::NulError),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
