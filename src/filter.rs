//! Drop features created after a cutoff date.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use gdal::vector::{Feature, FieldValue};

use crate::errors::{Result, TileburnError};

/// Attribute holding the creation date of a cadastre object.
pub const CREATED_ATTRIBUTE: &str = "created";

const DATE_FORMAT: &str = "%Y-%m-%d";
/// How OGR renders `Date` fields as strings.
const OGR_DATE_FORMAT: &str = "%Y/%m/%d";

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        TileburnError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Objects created strictly after this date are removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EndDate(NaiveDate);

impl EndDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whether an object created on `created` survives the cutoff.
    pub fn keeps(&self, created: NaiveDate) -> bool {
        created <= self.0
    }

    /// Reads the `created` attribute of `feature` and applies the cutoff.
    ///
    /// The attribute may be a `Date`, a `DateTime` or a `YYYY-mm-dd` string.
    pub fn keeps_feature(&self, feature: &Feature, path: &Path) -> Result<bool> {
        let missing = || TileburnError::MissingAttribute {
            path: path.to_path_buf(),
            fid: feature.fid(),
            attribute: CREATED_ATTRIBUTE,
        };
        let idx = feature
            .field_index(CREATED_ATTRIBUTE)
            .map_err(|_| missing())?;
        let created = match feature.field(idx)? {
            Some(FieldValue::DateValue(date)) => date,
            Some(FieldValue::DateTimeValue(datetime)) => datetime.date_naive(),
            Some(FieldValue::StringValue(value)) => parse_date(&value).or_else(|err| {
                NaiveDate::parse_from_str(value.trim(), OGR_DATE_FORMAT).map_err(|_| err)
            })?,
            _ => return Err(missing()),
        };
        Ok(self.keeps(created))
    }
}

impl FromStr for EndDate {
    type Err = TileburnError;

    fn from_str(s: &str) -> Result<Self> {
        parse_date(s).map(EndDate)
    }
}

impl fmt::Display for EndDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Counts kept while filtering one file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub seen: usize,
    pub dropped: usize,
}
