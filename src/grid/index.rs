//! Grid snapping: continuous (log age, log Z) → nearest precomputed model.
//!
//! The lookup tables are ordered sequences of `(value, label, index)` entries
//! in ingestion order. Nearest-neighbor search is a linear scan that keeps the
//! first minimal entry, so ties always resolve to whichever grid value was
//! ingested first. Grids hold tens of entries, so a scan per proposal is cheap.

use crate::error::FitError;
use crate::grid::model_grid::ModelGrid;

/// One discrete grid value.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEntry {
    /// Literal label from the grid file (`Z014`, `6.50`, ...).
    pub label: String,
    /// Numeric value: linear Z for metallicities, log10(age/yr) for ages.
    pub value: f64,
    /// Extension index (metallicities) or age position (ages).
    pub index: usize,
}

/// A snapped grid point, as positions into `GridIndex::metallicities()` / `ages()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub metallicity: usize,
    pub age: usize,
}

#[derive(Debug, Clone)]
pub struct GridIndex {
    metallicities: Vec<GridEntry>,
    ages: Vec<GridEntry>,
    /// `columns[m][a]`: column of age `a` inside metallicity extension `m`.
    columns: Vec<Vec<usize>>,
}

impl GridIndex {
    /// Build the lookup tables from a model grid.
    ///
    /// Metallicities come from the extension names, ages from the non-wavelength
    /// columns of the first extension. Every extension must carry every age.
    pub fn ingest(grid: &ModelGrid) -> Result<Self, FitError> {
        let metallicities = grid
            .extensions()
            .iter()
            .enumerate()
            .map(|(index, ext)| {
                Ok(GridEntry {
                    label: ext.name.clone(),
                    value: parse_metallicity_label(&ext.name)?,
                    index,
                })
            })
            .collect::<Result<Vec<_>, FitError>>()?;

        let first = &grid.extensions()[0];
        let wl = first.wavelength_position().ok_or_else(|| {
            FitError::Parse(format!(
                "extension '{}' has no wavelength column 'WL'",
                first.name
            ))
        })?;

        let mut ages = Vec::new();
        for (pos, name) in first.column_names.iter().enumerate() {
            if pos == wl {
                continue;
            }
            let label = name.trim();
            let value = label
                .parse::<f64>()
                .map_err(|e| FitError::Parse(format!("age column '{label}' is not a log-age value: {e}")))?;
            ages.push(GridEntry {
                label: label.to_string(),
                value,
                index: ages.len(),
            });
        }
        if ages.is_empty() {
            return Err(FitError::Parse(format!(
                "extension '{}' has no age columns",
                first.name
            )));
        }

        let mut columns = Vec::with_capacity(metallicities.len());
        for ext in grid.extensions() {
            let row = ages
                .iter()
                .map(|age| {
                    ext.column_position(&age.label).ok_or_else(|| {
                        FitError::Lookup(format!(
                            "extension '{}' has no column for log age {}",
                            ext.name, age.label
                        ))
                    })
                })
                .collect::<Result<Vec<_>, FitError>>()?;
            columns.push(row);
        }

        Ok(Self {
            metallicities,
            ages,
            columns,
        })
    }

    pub fn metallicities(&self) -> &[GridEntry] {
        &self.metallicities
    }

    pub fn ages(&self) -> &[GridEntry] {
        &self.ages
    }

    /// Nearest age, compared in log space.
    pub fn nearest_age(&self, log_age: f64) -> &GridEntry {
        &self.ages[nearest_position(&self.ages, log_age)]
    }

    /// Nearest metallicity, compared in linear Z after exponentiating `log_z`.
    pub fn nearest_metallicity(&self, log_z: f64) -> &GridEntry {
        &self.metallicities[nearest_position(&self.metallicities, 10f64.powf(log_z))]
    }

    /// Snap both continuous coordinates at once.
    pub fn snap(&self, log_age: f64, log_z: f64) -> GridPoint {
        GridPoint {
            metallicity: nearest_position(&self.metallicities, 10f64.powf(log_z)),
            age: nearest_position(&self.ages, log_age),
        }
    }

    pub fn metallicity(&self, point: GridPoint) -> &GridEntry {
        &self.metallicities[point.metallicity]
    }

    pub fn age(&self, point: GridPoint) -> &GridEntry {
        &self.ages[point.age]
    }

    /// `(extension, column)` holding the flux of a snapped point.
    pub fn locate(&self, point: GridPoint) -> (usize, usize) {
        (
            self.metallicities[point.metallicity].index,
            self.columns[point.metallicity][point.age],
        )
    }
}

fn nearest_position(entries: &[GridEntry], target: f64) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, e) in entries.iter().enumerate() {
        let d = (target - e.value).abs();
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Parse an extension name into a linear metallicity.
///
/// Exactly two encodings are accepted:
/// - `Z<digits>`: decimal fraction, `Z014` → 0.014
/// - `Zem<digits>`: negative power of ten, `Zem4` → 1e-4
pub fn parse_metallicity_label(label: &str) -> Result<f64, FitError> {
    let bad = || {
        FitError::Parse(format!(
            "metallicity extension '{label}' is neither 'Z<digits>' nor 'Zem<digits>'"
        ))
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let rest = label.trim().strip_prefix('Z').ok_or_else(bad)?;
    if let Some(power) = rest.strip_prefix("em") {
        if !all_digits(power) {
            return Err(bad());
        }
        return format!("1e-{power}").parse::<f64>().map_err(|_| bad());
    }
    if !all_digits(rest) {
        return Err(bad());
    }
    format!("0.{rest}").parse::<f64>().map_err(|_| bad())
}
