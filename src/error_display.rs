//! Turn load and export failures into short messages for the error modal and
//! the report mode's stderr.

use color_eyre::eyre::Report;
use polars::prelude::PolarsError;
use std::io::ErrorKind;

use crate::schema::UnresolvedSchema;

/// A one-paragraph, user-facing description of `err`.
pub fn user_message(err: &Report) -> String {
    if let Some(schema) = err.downcast_ref::<UnresolvedSchema>() {
        return schema.to_string();
    }
    if let Some(io) = err.downcast_ref::<std::io::Error>() {
        return io_message(io);
    }
    if let Some(polars) = err.downcast_ref::<PolarsError>() {
        return polars_message(polars);
    }
    first_line(&err.to_string())
}

fn io_message(err: &std::io::Error) -> String {
    match err.kind() {
        ErrorKind::NotFound => "File not found".to_string(),
        ErrorKind::PermissionDenied => "Permission denied while reading the file".to_string(),
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            format!("The file could not be decompressed: {}", err)
        }
        _ => format!("I/O error: {}", err),
    }
}

fn polars_message(err: &PolarsError) -> String {
    match err {
        PolarsError::NoData(_) => "The file is empty or has no header row".to_string(),
        PolarsError::ColumnNotFound(msg) => {
            format!("Column not found: {}", first_line(&msg.to_string()))
        }
        PolarsError::ComputeError(msg) => {
            format!("Could not parse the CSV: {}", first_line(&msg.to_string()))
        }
        PolarsError::IO { error, .. } => io_message(error),
        other => format!("Could not read the data: {}", first_line(&other.to_string())),
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().trim().to_string()
}
