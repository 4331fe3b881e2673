//! Classification schemes and the integer labels burned for them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use gdal::vector::Feature;

use crate::errors::{Result, TileburnError};

/// Label burned for every cadastre object.
pub const CADASTRE_LABEL: u8 = 255;

/// Urban Atlas 2012 class codes and their raster labels.
///
/// `25400` and `25500` are folded onto the labels of `91000` and `92000`.
pub const UA2012_CODES: [(&str, u8); 31] = [
    ("11100", 1),
    ("11210", 2),
    ("11220", 3),
    ("11230", 4),
    ("11240", 5),
    ("11300", 6),
    ("12100", 7),
    ("12210", 8),
    ("12220", 9),
    ("12230", 10),
    ("12300", 11),
    ("12400", 12),
    ("13100", 13),
    ("13300", 14),
    ("13400", 15),
    ("14100", 16),
    ("14200", 17),
    ("21000", 18),
    ("22000", 19),
    ("23000", 20),
    ("24000", 21),
    ("25000", 22),
    ("31000", 23),
    ("32000", 24),
    ("33000", 25),
    ("40000", 26),
    ("50000", 27),
    ("91000", 28),
    ("92000", 29),
    ("25400", 28),
    ("25500", 29),
];

/// Look up the label of an Urban Atlas 2012 class code.
pub fn ua2012_label(code: &str) -> Option<u8> {
    let code = code.trim();
    UA2012_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, label)| label)
}

/// The classification scheme selected with `--dataset`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Nomenclature {
    /// Urban Atlas 2012, class code in `CODE2012`.
    Ua2012,
    /// Urban Atlas 2006. Accepted on the command line, no lookup table yet.
    Ua2006,
    /// Building footprints, every object gets [`CADASTRE_LABEL`].
    Cadastre,
}

impl Nomenclature {
    /// Name used on the command line and as output file suffix.
    pub fn suffix(&self) -> &'static str {
        match self {
            Nomenclature::Ua2012 => "UA2012",
            Nomenclature::Ua2006 => "UA2006",
            Nomenclature::Cadastre => "cadastre",
        }
    }

    /// Attribute holding the class code, if the scheme reads one.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Nomenclature::Ua2012 => Some("CODE2012"),
            Nomenclature::Ua2006 => Some("CODE2006"),
            Nomenclature::Cadastre => None,
        }
    }

    /// Fails for schemes that cannot be burned.
    pub fn ensure_supported(&self) -> Result<()> {
        match self {
            Nomenclature::Ua2006 => Err(TileburnError::UnsupportedDataset(
                self.suffix().to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Label of `feature`, read from `path`.
    pub fn label(&self, feature: &Feature, path: &Path) -> Result<u8> {
        self.ensure_supported()?;
        let Some(attribute) = self.attribute() else {
            return Ok(CADASTRE_LABEL);
        };
        let missing = || TileburnError::MissingAttribute {
            path: path.to_path_buf(),
            fid: feature.fid(),
            attribute,
        };
        let idx = feature.field_index(attribute).map_err(|_| missing())?;
        let code = feature.field_as_string(idx)?.ok_or_else(missing)?;
        ua2012_label(&code).ok_or_else(|| TileburnError::UnknownClassCode {
            path: path.to_path_buf(),
            fid: feature.fid(),
            code,
        })
    }
}

impl FromStr for Nomenclature {
    type Err = TileburnError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ua2012" => Ok(Nomenclature::Ua2012),
            "ua2006" => Ok(Nomenclature::Ua2006),
            "cadastre" => Ok(Nomenclature::Cadastre),
            _ => Err(TileburnError::UnknownDataset(s.to_string())),
        }
    }
}

impl fmt::Display for Nomenclature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}
