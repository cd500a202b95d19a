//! Minimal file I/O: reading a dense point matrix from a delimited text file.
//!
//! This is deliberately narrow — a coreset only needs a matrix of floating-point coordinates in,
//! not a general tabular-data parser. It follows the reader-construction pattern `bioshell_io`
//! uses for its own `read_tsv`/`read_csv` helpers, but returns a single `nalgebra::DMatrix<f64>`
//! instead of `Vec<Vec<T>>`, since every row of a coreset input matrix must have the same width.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::DMatrix;

use crate::errors::CoresetError;

/// Reads a whitespace/tab-separated matrix of `f64` values from `path`, one row per line.
///
/// Every row must have the same number of fields; a row-length mismatch is reported as
/// [`CoresetError::InvalidConfig`]. Blank lines are skipped.
pub fn read_matrix_tsv<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>, CoresetError> {
    let file = File::open(path)?;
    read_matrix_tsv_from(BufReader::new(file))
}

/// As [`read_matrix_tsv`], reading from any `BufRead` source rather than a file path.
pub fn read_matrix_tsv_from<R: std::io::BufRead>(reader: R) -> Result<DMatrix<f64>, CoresetError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width = None;

    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row: Result<Vec<f64>, _> = record.iter().map(|field| field.trim().parse::<f64>()).collect();
        let row = row.map_err(|e| CoresetError::InvalidConfig {
            reason: format!("could not parse row {} as floating-point values: {e}", rows.len()),
        })?;

        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(CoresetError::InvalidConfig {
                    reason: format!("row {} has {} fields, expected {w}", rows.len(), row.len()),
                });
            }
            _ => {}
        }
        rows.push(row);
    }

    let n = rows.len();
    let d = width.unwrap_or(0);
    if n == 0 || d == 0 {
        return Err(CoresetError::DegenerateData {
            reason: "input matrix is empty".to_string(),
        });
    }

    let mut matrix = DMatrix::<f64>::zeros(n, d);
    for (r, row) in rows.into_iter().enumerate() {
        for (c, value) in row.into_iter().enumerate() {
            matrix[(r, c)] = value;
        }
    }
    Ok(matrix)
}
