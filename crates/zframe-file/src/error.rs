//! 文件操作错误定义

use thiserror::Error;
use zframe_core::error::ModelError;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("{kind} {record} references missing node {node}")]
    MissingNode {
        kind: &'static str,
        record: usize,
        node: usize,
    },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
