//! Observed spectrum reader.
//!
//! CSV with a header row naming the wavelength (Å), flux and 1-sigma error
//! columns. Header names are case-insensitive and a UTF-8 BOM is tolerated.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::Observation;
use crate::error::FitError;

const WAVELENGTH_NAMES: [&str; 4] = ["wavelength", "wave", "wl", "lambda"];
const FLUX_NAMES: [&str; 2] = ["flux", "f"];
const ERROR_NAMES: [&str; 5] = ["error", "err", "sigma", "yerr", "flux_err"];

pub fn read_observation(path: &Path) -> Result<Observation, FitError> {
    let file = File::open(path).map_err(|e| FitError::io(path, e))?;
    parse_observation(file).map_err(|e| match e {
        FitError::Parse(msg) => FitError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_observation<R: std::io::Read>(source: R) -> Result<Observation, FitError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| FitError::Parse(format!("failed to read observation header: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let wl_col = find_column(&header_map, &WAVELENGTH_NAMES)?;
    let flux_col = find_column(&header_map, &FLUX_NAMES)?;
    let err_col = find_column(&header_map, &ERROR_NAMES)?;

    let mut wavelength = Vec::new();
    let mut flux = Vec::new();
    let mut error = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let record = record.map_err(|e| FitError::Parse(format!("line {line}: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        wavelength.push(parse_field(&record, wl_col, line)?);
        flux.push(parse_field(&record, flux_col, line)?);
        error.push(parse_field(&record, err_col, line)?);
    }

    Observation::new(wavelength, flux, error)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, FitError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| {
            FitError::Parse(format!(
                "observation is missing a '{}' column (accepted names: {})",
                names[0],
                names.join(", ")
            ))
        })
}

fn parse_field(record: &StringRecord, col: usize, line: usize) -> Result<f64, FitError> {
    let raw = record
        .get(col)
        .ok_or_else(|| FitError::Parse(format!("line {line}: missing column {}", col + 1)))?;
    raw.parse::<f64>()
        .map_err(|e| FitError::Parse(format!("line {line}: '{raw}' is not a number: {e}")))
}
