use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("failed to set {dialect} language for parser")]
    LanguageSet { dialect: &'static str },

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error at line {line}, column {column} (byte {byte_start}..{byte_end})")]
    SyntaxError {
        byte_start: usize,
        byte_end: usize,
        line: usize,
        column: usize,
    },

    #[error("{count} syntax errors detected, first at line {line}, column {column}")]
    MultipleSyntaxErrors {
        count: usize,
        line: usize,
        column: usize,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },
}
