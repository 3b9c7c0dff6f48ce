use thiserror::Error;

// Unified error type for blockmat

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
    #[error("matrix is not positive definite: pivot {value} at row {row}")]
    NumericDomain { row: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, MatrixError>;
