//! Ionizing photon rates per SSP.
//!
//! One row per metallicity label, one column per age label; each cell holds
//! log10 Q(H⁰) for that model.

use std::collections::HashMap;

use crate::error::FitError;

/// Reference exponent the nebular emission coefficients are tabulated at.
pub const Q_REFERENCE: f64 = 52.0;

#[derive(Debug, Clone, Default)]
pub struct IonizationTable {
    ages: HashMap<String, usize>,
    rows: HashMap<String, Vec<f64>>,
}

impl IonizationTable {
    /// Build from age labels (column order) and `(metallicity label, row)` pairs.
    pub fn new(age_labels: Vec<String>, rows: Vec<(String, Vec<f64>)>) -> Result<Self, FitError> {
        let mut ages = HashMap::with_capacity(age_labels.len());
        for (i, label) in age_labels.into_iter().enumerate() {
            let label = label.trim().to_string();
            if ages.insert(label.clone(), i).is_some() {
                return Err(FitError::Parse(format!("duplicate age column '{label}' in ionization table")));
            }
        }

        let mut by_metal = HashMap::with_capacity(rows.len());
        for (metal, values) in rows {
            let metal = metal.trim().to_string();
            if values.len() != ages.len() {
                return Err(FitError::Parse(format!(
                    "ionization row '{metal}' has {} values, expected {}",
                    values.len(),
                    ages.len()
                )));
            }
            if by_metal.insert(metal.clone(), values).is_some() {
                return Err(FitError::Parse(format!("duplicate metallicity row '{metal}' in ionization table")));
            }
        }

        Ok(Self {
            ages,
            rows: by_metal,
        })
    }

    /// log10 Q for the given (metallicity, age) labels.
    pub fn log_q(&self, metallicity: &str, age: &str) -> Result<f64, FitError> {
        let row = self.rows.get(metallicity).ok_or_else(|| {
            FitError::Lookup(format!("ionization table has no row for metallicity '{metallicity}'"))
        })?;
        let col = self.ages.get(age).ok_or_else(|| {
            FitError::Lookup(format!("ionization table has no column for log age '{age}'"))
        })?;
        Ok(row[*col])
    }

    pub fn n_metallicities(&self) -> usize {
        self.rows.len()
    }

    pub fn n_ages(&self) -> usize {
        self.ages.len()
    }
}
