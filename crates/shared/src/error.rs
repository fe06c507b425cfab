use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReelsApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("unable to read video file '{path}': {message}")]
    File { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    File,
    Caption,
    Stock,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::File => "video file",
            MissingField::Caption => "caption",
            MissingField::Stock => "stock identifier",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("All fields are required (missing: {})", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<MissingField>,
}

fn join_fields(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
