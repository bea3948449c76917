/*!
 * 错误类型
 *
 * 所有失败都归入 `PersistenceError`：
 * - 前置条件违反（filtration 条件、缺失的 face、越界的边界矩阵行、重复 cell）
 * - 数值退化（系数域中对零或不可逆元素求逆）
 * - zigzag 状态机内部不变量被破坏
 * - 配置解析失败
 *
 * 未配对的 cell 是结果（无穷 bar），不是错误。
 */

use thiserror::Error;

use super::types::Value;

/// 持久同调计算错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("filtration condition violated: {dim}-cell {cell} has value {value} but its face {face} has value {face_value}")]
    FiltrationViolation {
        dim: usize,
        cell: usize,
        value: Value,
        face: usize,
        face_value: Value,
    },

    #[error("interval [{start}, {end}] of {dim}-cell {cell} is not covered by the intervals of face {face}")]
    IntervalNotCovered {
        dim: usize,
        cell: usize,
        start: Value,
        end: Value,
        face: usize,
    },

    #[error("face {face:?} of simplex {simplex:?} is not in the complex")]
    MissingFace { simplex: Vec<usize>, face: Vec<usize> },

    #[error("{dim}-cell {cell} already has value {existing}, cannot add it again with value {value}")]
    DuplicateCell {
        dim: usize,
        cell: usize,
        value: Value,
        existing: Value,
    },

    #[error("invalid simplex {0:?}: vertices must be non-empty and distinct")]
    InvalidSimplex(Vec<usize>),

    #[error("malformed boundary: column {cell} of dimension {dim} references row {row}, but only {nrows} rows exist")]
    MalformedBoundary {
        dim: usize,
        cell: usize,
        row: usize,
        nrows: usize,
    },

    #[error("cells of dimension {dim} are not sorted by filtration value at position {position}")]
    UnsortedCells { dim: usize, position: usize },

    #[error("value count mismatch in dimension {dim}: expected {expected}, got {actual}")]
    ValueCountMismatch {
        dim: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid interval [{start}, {end}]")]
    InvalidInterval { start: Value, end: Value },

    #[error("{dim}-cell {cell} is not present")]
    CellNotPresent { dim: usize, cell: usize },

    #[error("attempted to invert zero in the coefficient field")]
    InverseOfZero,

    #[error("{value} has no inverse modulo {modulus}")]
    NotInvertible { value: u32, modulus: u32 },

    #[error("zigzag invariant broken: {0}")]
    ZigzagInvariant(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// 统一的返回类型
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Config(err.to_string())
    }
}
