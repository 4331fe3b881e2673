use std::ffi::{c_char, CStr, CString};
use std::path::Path;
use std::ptr::{null, null_mut};

use gdal::Dataset;
use gdal_sys::{GDALVectorTranslate, GDALVectorTranslateOptions, GDALVectorTranslateOptionsFree};

use crate::errors::{Result, TileburnError};

/// Message of the last error GDAL raised on this thread.
fn last_error_msg() -> String {
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() {
            return String::new();
        }
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

/// Wraps a [GDALVectorTranslateOptions] object.
///
/// [GDALVectorTranslateOptions]: https://gdal.org/api/gdal_utils.html#_CPPv426GDALVectorTranslateOptions
pub struct VectorTranslateOptions {
    c_options: *mut GDALVectorTranslateOptions,
}

impl VectorTranslateOptions {
    /// Parses `ogr2ogr` style arguments, without the source and destination.
    ///
    /// See [GDALVectorTranslateOptionsNew].
    ///
    /// [GDALVectorTranslateOptionsNew]: https://gdal.org/api/gdal_utils.html#_CPPv429GDALVectorTranslateOptionsNewPPcP35GDALVectorTranslateOptionsForBinary
    pub fn new<S: Into<Vec<u8>>, I: IntoIterator<Item = S>>(args: I) -> Result<Self> {
        let cstr_args = args
            .into_iter()
            .map(CString::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut c_args = cstr_args
            .iter()
            .map(|x| x.as_ptr() as *mut c_char)
            .chain(std::iter::once(null_mut()))
            .collect::<Vec<_>>();

        let c_options =
            unsafe { gdal_sys::GDALVectorTranslateOptionsNew(c_args.as_mut_ptr(), null_mut()) };
        if c_options.is_null() {
            return Err(TileburnError::BadTranslateOptions(last_error_msg()));
        }
        Ok(Self { c_options })
    }

    /// Options for `ogr2ogr -f <format>`.
    pub fn with_format(format: &str, overwrite: bool) -> Result<Self> {
        let mut args = vec!["-f", format];
        if overwrite {
            args.push("-overwrite");
        }
        Self::new(args)
    }
}

impl Drop for VectorTranslateOptions {
    fn drop(&mut self) {
        unsafe {
            GDALVectorTranslateOptionsFree(self.c_options);
        }
    }
}

/// Converts simple features data between file formats, writing `dest`.
///
/// Wraps [GDALVectorTranslate], the library behind `ogr2ogr`. The output
/// dataset is closed before returning so that everything is on disk.
///
/// [GDALVectorTranslate]: https://gdal.org/api/gdal_utils.html#_CPPv419GDALVectorTranslatePKc12GDALDatasetHiP12GDALDatasetHPK26GDALVectorTranslateOptionsPi
pub fn vector_translate(
    src: &Dataset,
    dest: &Path,
    options: Option<&VectorTranslateOptions>,
) -> Result<()> {
    let c_dest = CString::new(dest.to_string_lossy().as_bytes())?;
    let c_options = options
        .map(|x| x.c_options as *const GDALVectorTranslateOptions)
        .unwrap_or(null());

    let dataset_out = unsafe {
        gdal_sys::CPLErrorReset();
        let mut datasets_raw = [src.c_dataset()];
        GDALVectorTranslate(
            c_dest.as_ptr(),
            null_mut(),
            1,
            datasets_raw.as_mut_ptr(),
            c_options,
            null_mut(),
        )
    };

    if dataset_out.is_null() {
        return Err(TileburnError::VectorTranslate {
            path: dest.to_path_buf(),
            msg: last_error_msg(),
        });
    }

    // closing the dataset flushes it
    drop(unsafe { Dataset::from_c_dataset(dataset_out) });
    Ok(())
}
