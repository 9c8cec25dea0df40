//! Tabular evaluation logs and their conversion to matrices.
//!
//! The schema is fixed: each record carries an integer `time_period`, an
//! `algorithm` name, a `performance` score and one value per named constraint.
//! [`EvaluationTable::pivot`] turns the rows into the (T, K) performance matrix
//! and the (T, p) constraint matrix the engines work on.
//!
//! # Example
//!
//! ```ignore
//! use circbias::data::load_evaluation_csv;
//! use std::path::Path;
//!
//! let table = load_evaluation_csv(Path::new("evaluations.csv"))?;
//! let pivoted = table.pivot()?;
//! println!("{} periods, {} algorithms", pivoted.periods.len(), pivoted.algorithm_names.len());
//! ```

mod csv;

pub use csv::{load_evaluation_csv, parse_evaluation_csv};

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use circbias_core::{BiasError, EvaluationData, Matrix};

/// Errors that can occur while loading an evaluation log.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural problem at a specific line.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// Line number (1-indexed).
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A required column is absent from the header.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// A cell could not be parsed as the column's type.
    #[error("Invalid value at line {line}, column '{column}': '{value}'")]
    InvalidValue {
        /// Line number (1-indexed).
        line: usize,
        /// Column name.
        column: String,
        /// The offending cell.
        value: String,
    },

    /// The file has a header but no data rows.
    #[error("No evaluation records found")]
    Empty,
}

/// One row of the evaluation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Evaluation period.
    pub time_period: i64,
    /// Algorithm name.
    pub algorithm: String,
    /// Performance score.
    pub performance: f64,
    /// Constraint values, in the table's `constraint_names` order.
    pub constraints: Vec<f64>,
}

impl EvaluationRecord {
    /// Create a record.
    pub fn new(
        time_period: i64,
        algorithm: impl Into<String>,
        performance: f64,
        constraints: Vec<f64>,
    ) -> Self {
        Self {
            time_period,
            algorithm: algorithm.into(),
            performance,
            constraints,
        }
    }
}

/// A full evaluation log with named constraint columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationTable {
    /// Constraint column names.
    pub constraint_names: Vec<String>,
    /// Rows in file order.
    pub records: Vec<EvaluationRecord>,
}

/// Output of [`EvaluationTable::pivot`].
#[derive(Debug, Clone, PartialEq)]
pub struct PivotedTable {
    /// Performance and constraint matrices.
    pub data: EvaluationData,
    /// Column labels of the performance matrix.
    pub algorithm_names: Vec<String>,
    /// Row labels of both matrices, ascending.
    pub periods: Vec<i64>,
}

/// Running sum for averaging duplicate cells.
#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

impl EvaluationTable {
    /// Create an empty table with the given constraint columns.
    pub fn new(constraint_names: Vec<String>) -> Self {
        Self {
            constraint_names,
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn push(&mut self, record: EvaluationRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pivot into matrices.
    ///
    /// Periods are sorted ascending and algorithms keep their order of first
    /// appearance. Repeated (period, algorithm) cells are averaged, and so are
    /// the constraint values of all records sharing a period. Every period must
    /// report every algorithm.
    pub fn pivot(&self) -> Result<PivotedTable, BiasError> {
        if self.records.is_empty() {
            return Err(BiasError::shape("table", "no evaluation records"));
        }
        let p = self.constraint_names.len();
        if p == 0 {
            return Err(BiasError::shape("table", "no constraint columns"));
        }

        let mut algorithm_names: Vec<String> = Vec::new();
        let mut algorithm_index: HashMap<&str, usize> = HashMap::new();
        let mut cells: BTreeMap<i64, HashMap<usize, Accumulator>> = BTreeMap::new();
        let mut constraint_rows: BTreeMap<i64, Vec<Accumulator>> = BTreeMap::new();

        for (row, record) in self.records.iter().enumerate() {
            if record.constraints.len() != p {
                return Err(BiasError::shape(
                    "table",
                    format!(
                        "record {} has {} constraint value(s), expected {}",
                        row + 1,
                        record.constraints.len(),
                        p
                    ),
                ));
            }
            let k = *algorithm_index
                .entry(record.algorithm.as_str())
                .or_insert_with(|| {
                    algorithm_names.push(record.algorithm.clone());
                    algorithm_names.len() - 1
                });

            cells
                .entry(record.time_period)
                .or_default()
                .entry(k)
                .or_default()
                .add(record.performance);

            let sums = constraint_rows
                .entry(record.time_period)
                .or_insert_with(|| (0..p).map(|_| Accumulator::default()).collect());
            for (acc, &value) in sums.iter_mut().zip(&record.constraints) {
                acc.add(value);
            }
        }

        let periods: Vec<i64> = cells.keys().copied().collect();
        let t = periods.len();
        let k = algorithm_names.len();

        let mut performance = Matrix::zeros(t, k);
        for (i, (period, row)) in cells.iter().enumerate() {
            for (j, name) in algorithm_names.iter().enumerate() {
                let cell = row.get(&j).ok_or_else(|| {
                    BiasError::shape(
                        "table",
                        format!("missing performance for period {}, algorithm '{}'", period, name),
                    )
                })?;
                performance[(i, j)] = cell.mean();
            }
        }

        let mut constraints = Matrix::zeros(t, p);
        for (i, sums) in constraint_rows.values().enumerate() {
            for (j, acc) in sums.iter().enumerate() {
                constraints[(i, j)] = acc.mean();
            }
        }

        Ok(PivotedTable {
            data: EvaluationData::new(performance, constraints),
            algorithm_names,
            periods,
        })
    }
}
