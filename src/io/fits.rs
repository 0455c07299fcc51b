//! Minimal FITS binary-table reader for SSP model grids.
//!
//! Only what the grid files use is supported:
//!
//! - a primary HDU whose data (if any) is skipped
//! - one `BINTABLE` extension per metallicity, named by `EXTNAME`
//! - scalar columns of type `E` (f32) or `D` (f64), big-endian; integer
//!   columns (`B`, `I`, `J`, `K`) are widened to f64
//!
//! Headers are 80-character cards packed into 2880-byte blocks and terminated
//! by an `END` card. Data units are padded to the next block boundary.

use std::path::Path;

use crate::error::FitError;
use crate::grid::{GridExtension, ModelGrid};

const BLOCK: usize = 2880;
const CARD: usize = 80;

/// Read a model grid from a FITS file on disk.
pub fn read_model_grid(path: &Path) -> Result<ModelGrid, FitError> {
    let bytes = std::fs::read(path).map_err(|e| FitError::io(path, e))?;
    parse_model_grid(&bytes).map_err(|e| match e {
        FitError::Parse(msg) => FitError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parse a model grid from the bytes of a FITS file.
pub fn parse_model_grid(bytes: &[u8]) -> Result<ModelGrid, FitError> {
    let mut pos = 0;

    let (primary, next) = read_header(bytes, pos)?;
    if primary.get("SIMPLE") != Some("T") {
        return Err(FitError::Parse("not a FITS file (missing SIMPLE = T)".into()));
    }
    pos = skip_data(bytes, next, data_len(&primary)?)?;

    let mut extensions = Vec::new();
    while pos < bytes.len() {
        let (header, data_start) = read_header(bytes, pos)?;
        let hdu = extensions.len() + 1;
        let kind = header.get("XTENSION").unwrap_or("");
        if kind != "BINTABLE" {
            return Err(FitError::Parse(format!(
                "HDU {hdu} is '{kind}', expected a BINTABLE extension"
            )));
        }
        extensions.push(read_bintable(&header, &bytes[data_start..], hdu)?);
        pos = skip_data(bytes, data_start, data_len(&header)?)?;
    }

    ModelGrid::new(extensions)
}

/// Header cards in file order, as `(keyword, value)` with strings unquoted.
#[derive(Debug, Clone, Default)]
struct Header {
    cards: Vec<(String, String)>,
}

impl Header {
    fn get(&self, key: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn int(&self, key: &str) -> Result<Option<i64>, FitError> {
        self.get(key)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|e| FitError::Parse(format!("header keyword {key} = '{v}' is not an integer: {e}")))
            })
            .transpose()
    }

    fn required_int(&self, key: &str) -> Result<i64, FitError> {
        self.int(key)?
            .ok_or_else(|| FitError::Parse(format!("missing required header keyword {key}")))
    }

    /// A required size or count keyword; negative values are rejected.
    fn required_count(&self, key: &str) -> Result<usize, FitError> {
        let v = self.required_int(key)?;
        usize::try_from(v).map_err(|_| FitError::Parse(format!("header keyword {key} = {v} must not be negative")))
    }
}

/// Parse the header starting at `start`; returns it with the offset of the data unit.
fn read_header(bytes: &[u8], start: usize) -> Result<(Header, usize), FitError> {
    let mut header = Header::default();
    let mut pos = start;
    loop {
        if pos + CARD > bytes.len() {
            return Err(FitError::Parse("truncated FITS header (no END card)".into()));
        }
        let card = String::from_utf8_lossy(&bytes[pos..pos + CARD]);
        pos += CARD;

        let key = card.get(..8).unwrap_or("").trim_end();
        if key == "END" {
            break;
        }
        if card.get(8..10) == Some("= ") {
            header.cards.push((key.to_string(), parse_value(&card[10..])));
        }
    }
    Ok((header, (start + round_up(pos - start)).min(bytes.len())))
}

/// Value field of a card: quoted strings are unquoted, anything else loses its comment.
fn parse_value(field: &str) -> String {
    let field = field.trim_start();
    if let Some(rest) = field.strip_prefix('\'') {
        let mut out = String::new();
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        return out.trim_end().to_string();
    }
    field.split('/').next().unwrap_or("").trim().to_string()
}

/// Size in bytes of the data unit described by `header` (without padding).
fn data_len(header: &Header) -> Result<usize, FitError> {
    let naxis = header.int("NAXIS")?.unwrap_or(0);
    if naxis <= 0 {
        return Ok(0);
    }
    let overflow = || FitError::Parse("FITS data unit size overflows".into());
    let bitpix = header.required_int("BITPIX")?;
    let mut elements: i64 = 1;
    for i in 1..=naxis {
        let n = header.required_count(&format!("NAXIS{i}"))?;
        elements = i64::try_from(n)
            .ok()
            .and_then(|n| elements.checked_mul(n))
            .ok_or_else(overflow)?;
    }
    let pcount = header.int("PCOUNT")?.unwrap_or(0);
    let gcount = header.int("GCOUNT")?.unwrap_or(1);
    if pcount < 0 || gcount < 0 {
        return Err(FitError::Parse(format!(
            "PCOUNT = {pcount} and GCOUNT = {gcount} must not be negative"
        )));
    }
    let bits = pcount
        .checked_add(elements)
        .and_then(|n| n.checked_mul(gcount))
        .and_then(|n| n.checked_mul(bitpix.checked_abs()?))
        .ok_or_else(overflow)?;
    usize::try_from(bits / 8).map_err(|_| overflow())
}

fn skip_data(bytes: &[u8], start: usize, len: usize) -> Result<usize, FitError> {
    if start.checked_add(len).is_none_or(|end| end > bytes.len()) {
        return Err(FitError::Parse(format!(
            "truncated FITS data unit: need {len} bytes at offset {start}, file has {}",
            bytes.len()
        )));
    }
    Ok((start + round_up(len)).min(bytes.len()))
}

fn round_up(n: usize) -> usize {
    n.div_ceil(BLOCK) * BLOCK
}

/// Storage type of one scalar binary-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ColumnType {
    fn width(self) -> usize {
        match self {
            ColumnType::U8 => 1,
            ColumnType::I16 => 2,
            ColumnType::I32 => 4,
            ColumnType::I64 => 8,
            ColumnType::F32 => 4,
            ColumnType::F64 => 8,
        }
    }

    fn decode(self, b: &[u8]) -> f64 {
        match self {
            ColumnType::U8 => b[0] as f64,
            ColumnType::I16 => i16::from_be_bytes([b[0], b[1]]) as f64,
            ColumnType::I32 => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
            ColumnType::I64 => i64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64,
            ColumnType::F32 => f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64,
            ColumnType::F64 => f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
        }
    }
}

/// Parse a `TFORMn` value such as `D`, `1E` or `J`.
fn parse_tform(tform: &str) -> Result<ColumnType, FitError> {
    let tform = tform.trim();
    let split = tform.find(|c: char| !c.is_ascii_digit()).unwrap_or(tform.len());
    let (repeat, code) = tform.split_at(split);
    if !(repeat.is_empty() || repeat == "1") {
        return Err(FitError::Parse(format!("vector column format '{tform}' is not supported")));
    }
    match code.chars().next() {
        Some('B') => Ok(ColumnType::U8),
        Some('I') => Ok(ColumnType::I16),
        Some('J') => Ok(ColumnType::I32),
        Some('K') => Ok(ColumnType::I64),
        Some('E') => Ok(ColumnType::F32),
        Some('D') => Ok(ColumnType::F64),
        _ => Err(FitError::Parse(format!("column format '{tform}' is not supported"))),
    }
}

fn read_bintable(header: &Header, data: &[u8], hdu: usize) -> Result<GridExtension, FitError> {
    let name = header
        .get("EXTNAME")
        .ok_or_else(|| FitError::Parse(format!("HDU {hdu} has no EXTNAME")))?
        .to_string();
    let row_len = header.required_count("NAXIS1")?;
    let n_rows = header.required_count("NAXIS2")?;
    let n_fields = header.required_count("TFIELDS")?;
    if n_fields == 0 || row_len == 0 {
        return Err(FitError::Parse(format!(
            "extension '{name}' has no columns (TFIELDS = {n_fields}, NAXIS1 = {row_len})"
        )));
    }
    // Every field needs its own TTYPE and TFORM card.
    if n_fields > header.cards.len() / 2 {
        return Err(FitError::Parse(format!(
            "extension '{name}' declares {n_fields} fields but its header has only {} cards",
            header.cards.len()
        )));
    }

    let mut names = Vec::with_capacity(n_fields);
    let mut types = Vec::with_capacity(n_fields);
    for i in 1..=n_fields {
        let ttype = header
            .get(&format!("TTYPE{i}"))
            .ok_or_else(|| FitError::Parse(format!("extension '{name}' is missing TTYPE{i}")))?;
        let tform = header
            .get(&format!("TFORM{i}"))
            .ok_or_else(|| FitError::Parse(format!("extension '{name}' is missing TFORM{i}")))?;
        names.push(ttype.to_string());
        types.push(parse_tform(tform).map_err(|e| match e {
            FitError::Parse(msg) => FitError::Parse(format!("extension '{name}', column '{ttype}': {msg}")),
            other => other,
        })?);
    }

    let width: usize = types.iter().map(|t| t.width()).sum();
    if width != row_len {
        return Err(FitError::Parse(format!(
            "extension '{name}': columns span {width} bytes but NAXIS1 = {row_len}"
        )));
    }
    let table_len = row_len
        .checked_mul(n_rows)
        .ok_or_else(|| FitError::Parse(format!("extension '{name}': table size overflows")))?;
    if data.len() < table_len {
        return Err(FitError::Parse(format!("extension '{name}': table data is truncated")));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n_rows); n_fields];
    for row in data[..table_len].chunks_exact(row_len) {
        let mut offset = 0;
        for (col, ty) in columns.iter_mut().zip(&types) {
            col.push(ty.decode(&row[offset..offset + ty.width()]));
            offset += ty.width();
        }
    }

    GridExtension::new(name, names, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(key: &str, value: &str) -> String {
        format!("{key:<8}= {value:<70}")
    }

    fn quoted(s: &str) -> String {
        format!("'{s:<8}'")
    }

    fn header_block(cards: &[String]) -> Vec<u8> {
        let mut out = String::new();
        for c in cards {
            assert_eq!(c.len(), CARD, "bad card {c:?}");
            out.push_str(c);
        }
        out.push_str(&format!("{:<80}", "END"));
        let mut bytes = out.into_bytes();
        bytes.resize(round_up(bytes.len()), b' ');
        bytes
    }

    /// Columns: `WL` as D, then one E column per age label.
    fn bintable(name: &str, wavelength: &[f64], ages: &[(&str, Vec<f32>)]) -> Vec<u8> {
        let row_len = 8 + 4 * ages.len();
        let mut cards = vec![
            card("XTENSION", &quoted("BINTABLE")),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", &row_len.to_string()),
            card("NAXIS2", &wavelength.len().to_string()),
            card("PCOUNT", "0"),
            card("GCOUNT", "1"),
            card("TFIELDS", &(ages.len() + 1).to_string()),
            card("TTYPE1", &quoted("WL")),
            card("TFORM1", &quoted("D")),
        ];
        for (i, (label, _)) in ages.iter().enumerate() {
            cards.push(card(&format!("TTYPE{}", i + 2), &quoted(label)));
            cards.push(card(&format!("TFORM{}", i + 2), &quoted("1E")));
        }
        cards.push(card("EXTNAME", &quoted(name)));

        let mut out = header_block(&cards);
        let mut data = Vec::new();
        for (r, w) in wavelength.iter().enumerate() {
            data.extend_from_slice(&w.to_be_bytes());
            for (_, flux) in ages {
                data.extend_from_slice(&flux[r].to_be_bytes());
            }
        }
        data.resize(round_up(data.len()), 0);
        out.extend(data);
        out
    }

    fn primary() -> Vec<u8> {
        header_block(&[
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
            card("EXTEND", "T / may contain extensions"),
        ])
    }

    #[test]
    fn reads_synthetic_grid() {
        let wl = [4000.0, 5000.0, 6000.0];
        let mut bytes = primary();
        bytes.extend(bintable(
            "Z014",
            &wl,
            &[("6.0", vec![1.0, 2.0, 3.0]), ("6.5", vec![0.5, 0.25, 0.125])],
        ));
        bytes.extend(bintable("Zem4", &wl, &[("6.0", vec![4.0, 5.0, 6.0]), ("6.5", vec![7.0, 8.0, 9.0])]));

        let grid = parse_model_grid(&bytes).unwrap();
        assert_eq!(grid.extensions().len(), 2);
        let first = &grid.extensions()[0];
        assert_eq!(first.name, "Z014");
        assert_eq!(first.column_names, vec!["WL", "6.0", "6.5"]);
        assert_eq!(grid.wavelength().unwrap(), &wl);
        assert_eq!(grid.flux(0, 2), &[0.5, 0.25, 0.125]);
        assert_eq!(grid.extensions()[1].name, "Zem4");
        assert_eq!(grid.flux(1, 1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn image_extension_is_rejected() {
        let mut bytes = primary();
        bytes.extend(header_block(&[
            card("XTENSION", &quoted("IMAGE")),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
        ]));
        let err = parse_model_grid(&bytes).unwrap_err();
        assert!(err.to_string().contains("BINTABLE"));
    }

    fn table_header(naxis1: &str, naxis2: &str, tfields: &str) -> Vec<u8> {
        header_block(&[
            card("XTENSION", &quoted("BINTABLE")),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", naxis1),
            card("NAXIS2", naxis2),
            card("PCOUNT", "0"),
            card("GCOUNT", "1"),
            card("TFIELDS", tfields),
            card("EXTNAME", &quoted("Z014")),
        ])
    }

    fn malformed_table(naxis1: &str, naxis2: &str, tfields: &str) -> FitError {
        let mut bytes = primary();
        bytes.extend(table_header(naxis1, naxis2, tfields));
        parse_model_grid(&bytes).unwrap_err()
    }

    #[test]
    fn empty_table_is_a_parse_error() {
        let err = malformed_table("0", "3", "0");
        assert!(matches!(err, FitError::Parse(_)), "{err}");
        assert!(err.to_string().contains("no columns"));
    }

    #[test]
    fn negative_sizes_are_parse_errors() {
        for (naxis1, naxis2, tfields) in [("8", "3", "-1"), ("-8", "3", "1"), ("8", "-3", "1")] {
            let err = malformed_table(naxis1, naxis2, tfields);
            assert!(matches!(err, FitError::Parse(_)), "{err}");
            assert!(err.to_string().contains("must not be negative"), "{err}");
        }
    }

    #[test]
    fn field_count_beyond_header_is_a_parse_error() {
        let err = malformed_table("8", "3", "1000000000000");
        assert!(matches!(err, FitError::Parse(_)), "{err}");
        assert!(err.to_string().contains("declares"));
    }

    #[test]
    fn oversized_table_is_a_parse_error() {
        let mut bytes = primary();
        bytes.extend(header_block(&[
            card("XTENSION", &quoted("BINTABLE")),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", "8"),
            card("NAXIS2", &i64::MAX.to_string()),
            card("TFIELDS", "1"),
            card("TTYPE1", &quoted("WL")),
            card("TFORM1", &quoted("D")),
            card("EXTNAME", &quoted("Z014")),
        ]));
        let err = parse_model_grid(&bytes).unwrap_err();
        assert!(matches!(err, FitError::Parse(_)), "{err}");
    }

    #[test]
    fn overflowing_primary_data_size_is_a_parse_error() {
        let bytes = header_block(&[
            card("SIMPLE", "T"),
            card("BITPIX", "-64"),
            card("NAXIS", "2"),
            card("NAXIS1", &i64::MAX.to_string()),
            card("NAXIS2", "4"),
        ]);
        let err = parse_model_grid(&bytes).unwrap_err();
        assert!(err.to_string().contains("overflows"), "{err}");
    }

    #[test]
    fn missing_simple_is_rejected() {
        let bytes = header_block(&[card("BITPIX", "8"), card("NAXIS", "0")]);
        assert!(matches!(parse_model_grid(&bytes), Err(FitError::Parse(_))));
    }

    #[test]
    fn quoted_values_unescape_and_trim() {
        assert_eq!(parse_value("'O''Donnell'  / curve"), "O'Donnell");
        assert_eq!(parse_value("   42 / answer"), "42");
    }

    #[test]
    fn tform_repeat_counts() {
        assert_eq!(parse_tform("1D").unwrap(), ColumnType::F64);
        assert_eq!(parse_tform("E").unwrap(), ColumnType::F32);
        assert!(parse_tform("3E").is_err());
        assert!(parse_tform("20A").is_err());
    }
}
