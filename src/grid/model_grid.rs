//! In-memory SSP model grid.
//!
//! One `GridExtension` per metallicity, in file order. Each extension carries
//! the wavelength column plus one flux column per log-age, keyed by the age's
//! literal text.

use crate::error::FitError;

/// Name of the wavelength column in every extension.
pub const WAVELENGTH_COLUMN: &str = "WL";

#[derive(Debug, Clone)]
pub struct GridExtension {
    /// Extension name, e.g. `Z014` or `Zem4`.
    pub name: String,
    /// Column names in table order, including the wavelength column.
    pub column_names: Vec<String>,
    /// Column data aligned with `column_names`.
    pub columns: Vec<Vec<f64>>,
}

impl GridExtension {
    pub fn new(name: impl Into<String>, column_names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, FitError> {
        let name = name.into();
        if column_names.len() != columns.len() {
            return Err(FitError::InvalidConfiguration(format!(
                "extension '{name}' has {} column names but {} columns",
                column_names.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            if columns.iter().any(|c| c.len() != first.len()) {
                return Err(FitError::InvalidConfiguration(format!(
                    "extension '{name}' has columns of unequal length"
                )));
            }
        }
        Ok(Self {
            name,
            column_names,
            columns,
        })
    }

    /// Position of the wavelength column.
    pub fn wavelength_position(&self) -> Option<usize> {
        self.column_names
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(WAVELENGTH_COLUMN))
    }

    pub fn column_position(&self, label: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c.trim() == label)
    }

    pub fn wavelength(&self) -> Option<&[f64]> {
        self.wavelength_position().map(|i| self.columns[i].as_slice())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}

/// The full grid: metallicity extensions in file order. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelGrid {
    extensions: Vec<GridExtension>,
}

impl ModelGrid {
    pub fn new(extensions: Vec<GridExtension>) -> Result<Self, FitError> {
        if extensions.is_empty() {
            return Err(FitError::InvalidConfiguration(
                "model grid has no metallicity extensions".into(),
            ));
        }
        let n = extensions[0].n_rows();
        if let Some(ext) = extensions.iter().find(|e| e.n_rows() != n) {
            return Err(FitError::InvalidConfiguration(format!(
                "extension '{}' has {} rows, expected {n}",
                ext.name,
                ext.n_rows()
            )));
        }
        Ok(Self { extensions })
    }

    pub fn extensions(&self) -> &[GridExtension] {
        &self.extensions
    }

    /// Flux column `column` of extension `extension`.
    ///
    /// # Panics
    /// Panics if either index is out of range; `GridIndex` only hands out valid pairs.
    pub fn flux(&self, extension: usize, column: usize) -> &[f64] {
        &self.extensions[extension].columns[column]
    }

    /// Number of wavelength bins (taken from the first extension).
    pub fn n_bins(&self) -> usize {
        self.extensions[0].n_rows()
    }

    /// The grid's own wavelength array (first extension).
    pub fn wavelength(&self) -> Option<&[f64]> {
        self.extensions[0].wavelength()
    }
}
