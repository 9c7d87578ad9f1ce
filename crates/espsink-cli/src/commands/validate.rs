use std::io::Read;

use espsink_core::{MalformedPayload, normalize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// The sink would refuse this payload.
    #[error("Rejected: {0}")]
    Rejected(#[from] MalformedPayload),
    /// The payload was accepted but the record could not be printed.
    #[error("Error rendering record: {0}")]
    Render(#[source] serde_json::Error),
}

/// Normalize `raw` and render the record as pretty JSON.
pub fn validate(raw: &[u8]) -> Result<String, ValidateError> {
    let record = normalize(raw)?;
    serde_json::to_string_pretty(&record).map_err(ValidateError::Render)
}

fn read_input(path: &str) -> std::io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}

pub fn run(path: &str) {
    let raw = match read_input(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    };

    match validate(&raw) {
        Ok(pretty) => println!("{pretty}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
