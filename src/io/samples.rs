//! Parameter-vector CSV reader (posterior samples or evaluation inputs).
//!
//! Header columns `log_age`, `log_z`, `ebv`, `log_amp` in any order; extra
//! columns are ignored and `#` lines are comments.

use std::fs::File;
use std::path::Path;

use crate::domain::{Axis, NDIM, Theta};
use crate::error::FitError;

pub fn read_theta_csv(path: &Path) -> Result<Vec<Theta>, FitError> {
    let file = File::open(path).map_err(|e| FitError::io(path, e))?;
    parse_theta_csv(file).map_err(|e| match e {
        FitError::Parse(msg) => FitError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_theta_csv<R: std::io::Read>(source: R) -> Result<Vec<Theta>, FitError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| FitError::Parse(format!("failed to read header: {e}")))?
        .clone();

    let mut cols = [0usize; NDIM];
    for axis in Axis::ALL {
        cols[axis.index()] = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(axis.column()))
            .ok_or_else(|| FitError::Parse(format!("missing column '{}'", axis.column())))?;
    }

    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let record = record.map_err(|e| FitError::Parse(format!("line {line}: {e}")))?;
        let mut theta = [0.0; NDIM];
        for (slot, &col) in theta.iter_mut().zip(&cols) {
            let raw = record.get(col).unwrap_or("");
            *slot = raw
                .parse::<f64>()
                .map_err(|e| FitError::Parse(format!("line {line}: '{raw}' is not a number: {e}")))?;
        }
        out.push(Theta(theta));
    }
    Ok(out)
}
