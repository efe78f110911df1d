use thiserror::Error;

#[derive(Error, Debug)]
pub enum RudderError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("malformed matrix header: {rows} x {columns}")]
    MalformedHeader { rows: i32, columns: i32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RudderResult<T> = Result<T, RudderError>;
