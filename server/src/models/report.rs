//! Text reports returned by every tool

use std::fmt::Display;

/// A human-readable outcome. Every tool returns one, success or failure.
pub trait ToolReport: Display {
    fn is_error(&self) -> bool;

    /// Split into the protocol's success/error content
    fn into_result(self) -> Result<String, String>
    where
        Self: Sized,
    {
        let text = self.to_string();
        if self.is_error() {
            Err(text)
        } else {
            Ok(text)
        }
    }
}
