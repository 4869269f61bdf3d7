use calamine::{CellErrorType, Data};
use chrono::{NaiveDateTime, NaiveTime};

/// Floats at or above this magnitude keep their float rendering.
const MAX_INTEGRAL_FLOAT: f64 = 1e15;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    #[error("cell holds spreadsheet error value {0}")]
    ErrorValue(CellErrorType),
}

/// Converts a cell into its untrimmed canonical string.
///
/// Integral floats drop the fraction (`1.0` → `1`), dates render as
/// `YYYY-MM-DD` (or `YYYY-MM-DDTHH:MM:SS` when a time part exists), booleans
/// as `TRUE`/`FALSE`. Error values such as `#REF!` are rejected.
pub fn coerce(cell: &Data) -> Result<String, CellError> {
    let value = match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(true) => "TRUE".to_owned(),
        Data::Bool(false) => "FALSE".to_owned(),
        Data::DateTime(dt) => {
            let naive = if dt.is_duration() {
                None
            } else {
                dt.as_datetime()
            };
            match naive {
                Some(naive) => format_datetime(naive),
                None => format_float(dt.as_f64()),
            }
        }
        Data::Error(err) => return Err(CellError::ErrorValue(err.clone())),
    };
    Ok(value)
}

/// Coerces and trims; a missing cell reads as empty.
pub fn coerce_trimmed(cell: Option<&Data>) -> Result<String, CellError> {
    match cell {
        Some(cell) => Ok(coerce(cell)?.trim().to_owned()),
        None => Ok(String::new()),
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_INTEGRAL_FLOAT {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
