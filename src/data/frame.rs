//! Tabular model data (the data a model was fitted on).

use crate::error::{ReportError, Result};
use crate::stats::descriptive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Values of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    /// Numeric column; `None` is a missing value.
    Numeric(Vec<Option<f64>>),
    /// Factor (categorical) column; `None` is a missing value.
    Factor(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Factor(v) => v.len(),
        }
    }

    /// Check if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is a numeric column.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }

    /// Try to get numeric values.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Factor(_) => None,
        }
    }

    /// Try to get factor values.
    pub fn as_factor(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnData::Factor(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }

    fn render(&self, row: usize) -> String {
        match self {
            ColumnData::Numeric(v) => match v[row] {
                Some(x) => x.to_string(),
                None => "NA".to_string(),
            },
            ColumnData::Factor(v) => v[row].clone().unwrap_or_else(|| "NA".to_string()),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw == "NA" || raw == "na"
}

/// Numeric value of a cell; `NaN` and infinities count as missing.
fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// A column-oriented data frame with numeric and factor columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl DataFrame {
    /// Create a data frame from columns of equal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for col in &columns {
            if col.data.len() != n_rows {
                return Err(ReportError::DimensionMismatch {
                    expected: n_rows,
                    actual: col.data.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(ReportError::InvalidParameter(format!(
                    "Duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Load a data frame from a TSV file with a header row.
    ///
    /// Columns are numeric if every non-missing value parses as a number,
    /// otherwise they are factors. `NA`, `na`, empty cells and non-finite
    /// numbers (`NaN`, `Inf`) are missing.
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| ReportError::EmptyData("Empty data file".to_string()))??;
        let names: Vec<String> = header_line
            .split('\t')
            .map(|s| s.trim().to_string())
            .collect();
        if names.iter().all(|n| n.is_empty()) {
            return Err(ReportError::EmptyData("Data file has no columns".to_string()));
        }

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
        for (row_idx, line_result) in lines.enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() > names.len() {
                return Err(ReportError::InvalidValue {
                    value: line.clone(),
                    row: row_idx,
                    col: names.len(),
                });
            }
            for (col_idx, column) in raw.iter_mut().enumerate() {
                let value = fields.get(col_idx).map(|s| s.trim()).unwrap_or("");
                column.push(value.to_string());
            }
        }

        if raw[0].is_empty() {
            return Err(ReportError::EmptyData("No rows in data file".to_string()));
        }

        let columns = names
            .into_iter()
            .zip(raw)
            .map(|(name, values)| {
                let all_numeric = values
                    .iter()
                    .all(|v| is_missing(v) || v.parse::<f64>().is_ok());
                let data = if all_numeric {
                    ColumnData::Numeric(
                        values
                            .iter()
                            .map(|v| if is_missing(v) { None } else { parse_finite(v) })
                            .collect(),
                    )
                } else {
                    ColumnData::Factor(
                        values
                            .into_iter()
                            .map(|v| if is_missing(&v) { None } else { Some(v) })
                            .collect(),
                    )
                };
                Column { name, data }
            })
            .collect();

        Self::new(columns)
    }

    /// Write the data frame to a TSV file. Missing values are written as `NA`.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(writer, "{}", header.join("\t"))?;

        for row in 0..self.n_rows {
            let fields: Vec<String> = self.columns.iter().map(|c| c.data.render(row)).collect();
            writeln!(writer, "{}", fields.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
    }

    /// Replace the data of an existing column.
    pub fn set_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.n_rows {
            return Err(ReportError::DimensionMismatch {
                expected: self.n_rows,
                actual: data.len(),
            });
        }
        let col = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_string()))?;
        col.data = data;
        Ok(())
    }

    /// Non-missing values of a numeric column.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let col = self.column(name)?;
        let values = col.data.as_numeric().ok_or_else(|| {
            ReportError::InvalidParameter(format!("Column '{}' is not numeric", name))
        })?;
        Ok(values.iter().flatten().copied().collect())
    }

    /// Sample standard deviation of a numeric column, ignoring missing values.
    pub fn sd(&self, name: &str) -> Result<f64> {
        descriptive::sd(&self.numeric_values(name)?)
    }

    /// Sorted unique levels of a factor column.
    pub fn levels(&self, name: &str) -> Result<Vec<String>> {
        let col = self.column(name)?;
        let values = col.data.as_factor().ok_or_else(|| {
            ReportError::InvalidParameter(format!("Column '{}' is not a factor", name))
        })?;
        let mut levels: Vec<String> = values
            .iter()
            .flatten()
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        levels.sort();
        Ok(levels)
    }
}
