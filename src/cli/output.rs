//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;
use std::error::Error;

/// Map domain/service errors to a string for CLI output, including the source chain.
pub fn map_error(e: &ApiError) -> String {
    let mut message = format!("Error: {}", e);
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(&format!("\n  caused by: {}", text));
        }
        source = cause.source();
    }
    message
}
