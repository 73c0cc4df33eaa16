//! Source front-ends using tree-sitter
//!
//! The engine consumes a [`crate::ast::ParsedFile`]; this module
//! produces one from TypeScript/TSX source. The engine itself never
//! parses text.

pub mod typescript;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ast::ParsedFile;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}", .0.display())]
    Parse(PathBuf),
}

/// File extensions this front-end understands
pub fn supported_extensions() -> &'static [&'static str] {
    &["ts", "tsx"]
}

/// Parse a file into the engine's input model.
pub fn parse_file(path: &Path) -> Result<ParsedFile, ParseError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "ts" | "tsx" => typescript::parse(path),
        _ => Ok(ParsedFile::default()),
    }
}
