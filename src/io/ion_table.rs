//! Ionizing-photon table reader.
//!
//! A delimited text table with a header row. The `Z` column holds the
//! metallicity label (matching the grid's extension names); every other column
//! is a log-age label holding log10 Q for that model. The delimiter is
//! detected from the header line: comma, then tab, then runs of whitespace.

use std::path::Path;

use csv::StringRecord;

use crate::error::FitError;
use crate::grid::IonizationTable;

/// Name of the metallicity-label column.
pub const METALLICITY_COLUMN: &str = "Z";

pub fn read_ionization_table(path: &Path) -> Result<IonizationTable, FitError> {
    let text = std::fs::read_to_string(path).map_err(|e| FitError::io(path, e))?;
    parse_ionization_table(&text).map_err(|e| match e {
        FitError::Parse(msg) => FitError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_ionization_table(text: &str) -> Result<IonizationTable, FitError> {
    let header_line = text
        .lines()
        .map(|l| l.trim_start_matches('\u{feff}'))
        .find(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .ok_or_else(|| FitError::Parse("ionization table is empty".into()))?;

    let records = match detect_delimiter(header_line) {
        Some(delim) => read_delimited(text.as_bytes(), delim)?,
        None => {
            // Whitespace-separated: collapse runs of blanks into single commas.
            let normalized: String = text
                .lines()
                .map(|l| l.split_whitespace().collect::<Vec<_>>().join(","))
                .collect::<Vec<_>>()
                .join("\n");
            read_delimited(normalized.as_bytes(), b',')?
        }
    };

    let (headers, rows) = records;
    let headers: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let z_col = headers
        .iter()
        .position(|h| h == METALLICITY_COLUMN)
        .ok_or_else(|| FitError::Parse(format!("ionization table has no '{METALLICITY_COLUMN}' column")))?;

    let age_labels: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != z_col)
        .map(|(_, h)| h.clone())
        .collect();

    let mut table_rows = Vec::with_capacity(rows.len());
    for (line, record) in rows.iter().enumerate() {
        let label = record
            .get(z_col)
            .ok_or_else(|| FitError::Parse(format!("row {} has no metallicity label", line + 1)))?
            .to_string();
        let mut values = Vec::with_capacity(age_labels.len());
        for (i, field) in record.iter().enumerate() {
            if i == z_col {
                continue;
            }
            let v = field.parse::<f64>().map_err(|e| {
                FitError::Parse(format!(
                    "row '{label}', column '{}': '{field}' is not a number: {e}",
                    headers.get(i).map_or("?", String::as_str)
                ))
            })?;
            values.push(v);
        }
        table_rows.push((label, values));
    }

    IonizationTable::new(age_labels, table_rows)
}

fn detect_delimiter(header: &str) -> Option<u8> {
    if header.contains(',') {
        Some(b',')
    } else if header.contains('\t') {
        Some(b'\t')
    } else {
        None
    }
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<(StringRecord, Vec<StringRecord>), FitError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| FitError::Parse(format!("failed to read ionization table header: {e}")))?
        .clone();
    let rows = reader
        .records()
        .filter(|r| r.as_ref().map_or(true, |rec| rec.iter().any(|f| !f.is_empty())))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FitError::Parse(format!("failed to read ionization table row: {e}")))?;
    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_table_is_parsed() {
        let text = "Z      6.0    6.5   7.0\nZ014   52.9   51.8  50.1\nZem4   53.1   52.0  50.4\n";
        let table = parse_ionization_table(text).unwrap();
        assert_eq!(table.n_metallicities(), 2);
        assert_eq!(table.n_ages(), 3);
        assert_eq!(table.log_q("Zem4", "6.5").unwrap(), 52.0);
    }

    #[test]
    fn comma_and_tab_tables_are_parsed() {
        let csv = "Z,6.0,6.5\nZ014,52.9,51.8\n";
        assert_eq!(parse_ionization_table(csv).unwrap().log_q("Z014", "6.0").unwrap(), 52.9);
        let tsv = "6.0\tZ\t6.5\n52.9\tZ014\t51.8\n";
        assert_eq!(parse_ionization_table(tsv).unwrap().log_q("Z014", "6.5").unwrap(), 51.8);
    }

    #[test]
    fn missing_z_column_is_a_parse_error() {
        let err = parse_ionization_table("metal 6.0\nZ014 52.0\n").unwrap_err();
        assert!(matches!(err, FitError::Parse(_)));
    }

    #[test]
    fn non_numeric_cell_names_row_and_column() {
        let err = parse_ionization_table("Z 6.0\nZ014 abc\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Z014") && msg.contains("6.0"), "{msg}");
    }
}
