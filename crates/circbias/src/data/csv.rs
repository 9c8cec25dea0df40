//! CSV parsing for evaluation logs.
//!
//! Expected header: `time_period,algorithm,performance,<constraint>...`.
//! Column order is free; every column other than the three required ones is
//! read as a constraint, in header order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{DataError, EvaluationRecord, EvaluationTable};

const TIME_PERIOD: &str = "time_period";
const ALGORITHM: &str = "algorithm";
const PERFORMANCE: &str = "performance";

/// Load an evaluation log from a CSV file.
///
/// # Example file content
/// ```csv
/// time_period,algorithm,performance,compute_budget,max_tokens
/// 1,baseline,0.72,100,512
/// 1,candidate,0.70,100,512
/// 2,baseline,0.74,150,1024
/// 2,candidate,0.79,150,1024
/// ```
///
/// # Errors
/// Returns `DataError` if the file cannot be read, lacks a required column,
/// or contains a cell that does not parse.
pub fn load_evaluation_csv(path: &Path) -> Result<EvaluationTable, DataError> {
    let file = File::open(path)?;
    parse_evaluation_csv(BufReader::new(file))
}

/// Parse an evaluation log from any buffered reader.
///
/// Empty lines and lines starting with `#` are skipped.
pub fn parse_evaluation_csv<R: BufRead>(reader: R) -> Result<EvaluationTable, DataError> {
    let mut layout: Option<Layout> = None;
    let mut table = EvaluationTable::default();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();
        let line_no = line_num + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();

        let Some(columns) = layout.as_ref() else {
            let parsed = Layout::from_header(&parts)?;
            table.constraint_names = parsed.constraint_names.clone();
            layout = Some(parsed);
            continue;
        };

        if parts.len() != columns.width {
            return Err(DataError::Parse {
                line: line_no,
                message: format!("Expected {} columns, got {}", columns.width, parts.len()),
            });
        }

        let time_period: i64 =
            parts[columns.time_period]
                .parse()
                .map_err(|_| DataError::InvalidValue {
                    line: line_no,
                    column: TIME_PERIOD.to_string(),
                    value: parts[columns.time_period].to_string(),
                })?;
        let algorithm = parts[columns.algorithm];
        if algorithm.is_empty() {
            return Err(DataError::InvalidValue {
                line: line_no,
                column: ALGORITHM.to_string(),
                value: String::new(),
            });
        }
        let performance = parse_float(parts[columns.performance], line_no, PERFORMANCE)?;

        let constraints = columns
            .constraints
            .iter()
            .zip(&columns.constraint_names)
            .map(|(&idx, name)| parse_float(parts[idx], line_no, name))
            .collect::<Result<Vec<f64>, DataError>>()?;

        table.push(EvaluationRecord::new(
            time_period,
            algorithm,
            performance,
            constraints,
        ));
    }

    if layout.is_none() || table.is_empty() {
        return Err(DataError::Empty);
    }
    Ok(table)
}

/// Column positions resolved from the header.
struct Layout {
    width: usize,
    time_period: usize,
    algorithm: usize,
    performance: usize,
    constraints: Vec<usize>,
    constraint_names: Vec<String>,
}

impl Layout {
    fn from_header(header: &[&str]) -> Result<Self, DataError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|&h| h == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };
        let time_period = find(TIME_PERIOD)?;
        let algorithm = find(ALGORITHM)?;
        let performance = find(PERFORMANCE)?;

        let (constraints, constraint_names): (Vec<usize>, Vec<String>) = header
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != time_period && i != algorithm && i != performance)
            .map(|(i, &name)| (i, name.to_string()))
            .unzip();

        Ok(Self {
            width: header.len(),
            time_period,
            algorithm,
            performance,
            constraints,
            constraint_names,
        })
    }
}

fn parse_float(value: &str, line: usize, column: &str) -> Result<f64, DataError> {
    value.parse().map_err(|_| DataError::InvalidValue {
        line,
        column: column.to_string(),
        value: value.to_string(),
    })
}
