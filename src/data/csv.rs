//! Labeled CSV tables
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label (any string)
//! - All other columns are numeric features
//! - First row can be headers naming the features (automatically detected)
//! - Blank lines and lines starting with `#` are skipped

use crate::core::{Feature, LabeledObservation, Observation, Result, SvmDataset, SvmError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reader for labeled CSV tables
#[derive(Debug, Clone, Copy)]
pub struct CsvReader {
    delimiter: char,
    auto_detect_header: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self {
            delimiter: ',',
            auto_detect_header: true,
        }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field separator, `,` by default
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header_detection(mut self, auto_detect_header: bool) -> Self {
        self.auto_detect_header = auto_detect_header;
        self
    }

    /// Load a dataset from a CSV file
    pub fn from_file<P: AsRef<Path>>(&self, path: P) -> Result<SvmDataset> {
        let file = File::open(path)?;
        self.from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(&self, reader: R) -> Result<SvmDataset> {
        let mut header: Option<Vec<String>> = None;
        let mut observations = Vec::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(self.delimiter).map(str::trim).collect();
            if header.is_none()
                && observations.is_empty()
                && self.auto_detect_header
                && is_header_line(&fields)
            {
                header = Some(fields.iter().map(|f| f.to_string()).collect());
                continue;
            }

            let index = observations.len();
            observations.push(parse_data_line(&fields, line_number + 1, index)?);
        }

        if observations.is_empty() {
            return Err(SvmError::EmptyDataset);
        }

        let dim = observations[0].observation.len();
        let features = match header {
            Some(names) => {
                if names.len() != dim + 1 {
                    return Err(SvmError::ParseError(format!(
                        "header has {} columns but rows have {}",
                        names.len(),
                        dim + 1
                    )));
                }
                names
                    .into_iter()
                    .take(dim)
                    .enumerate()
                    .map(|(i, name)| Feature::new(name, i))
                    .collect()
            }
            None => (0..dim)
                .map(|i| Feature::new(format!("feature{}", i + 1), i))
                .collect(),
        };

        SvmDataset::new(observations, features)
    }
}

/// Load a comma-separated file with header detection
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<SvmDataset> {
    CsvReader::new().from_file(path)
}

/// A header line has mostly non-numeric feature columns
fn is_header_line(fields: &[&str]) -> bool {
    if fields.len() < 2 {
        return false;
    }
    let non_numeric_count = fields
        .iter()
        .take(fields.len() - 1)
        .filter(|field| field.parse::<f64>().is_err())
        .count();
    non_numeric_count > (fields.len() - 1) / 2
}

fn parse_data_line(fields: &[&str], line_number: usize, index: usize) -> Result<LabeledObservation> {
    let Some((label, values)) = fields.split_last() else {
        return Err(SvmError::ParseError(format!("line {line_number} is empty")));
    };
    if values.is_empty() {
        return Err(SvmError::ParseError(format!(
            "line {line_number} has too few fields"
        )));
    }
    if label.is_empty() {
        return Err(SvmError::ParseError(format!(
            "line {line_number} has an empty label"
        )));
    }

    let values = values
        .iter()
        .enumerate()
        .map(|(column, field)| {
            field.parse::<f64>().map_err(|_| {
                SvmError::ParseError(format!(
                    "invalid feature value at line {line_number}, column {}: '{field}'",
                    column + 1
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(LabeledObservation::new(*label, Observation::new(values), index))
}
