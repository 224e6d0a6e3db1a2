pub mod canonical;
pub mod classify;
pub mod lines;
pub mod patterns;
pub mod range;
pub mod summary;
pub mod types;

pub use canonical::*;
pub use classify::*;
pub use lines::*;
pub use range::{interpret, parse_reference_range};
pub use summary::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Text encoding error: {0}")]
    EncodingError(String),

    #[error("Text source failed: {0}")]
    TextSource(String),
}

/// Non-blank, trimmed lines. Splits on the same separators a PDF text dump
/// uses: `\n`, `\r`, vertical tab and form feed (page breaks).
pub fn report_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', '\r', '\u{0b}', '\u{0c}'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lines_trims_and_drops_blanks() {
        let lines: Vec<&str> = report_lines("  a  \r\n\r\n b\u{0c}c \n   ").collect();
        assert_eq!(lines, ["a", "b", "c"]);
    }
}
