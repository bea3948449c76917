//! # Rust Persistence - 持久同调归约引擎
//!
//! 单调与 zigzag filtration 的 barcode 计算：系数域泛型的稀疏边界矩阵归约，
//! 支持 apparent pairs、clearing、compression 与 extra reduction。
//! 启用 `python` feature 时编译为 Python 扩展模块。

pub mod persistence;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn _rust_persistence(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // 注册持久同调函数
    persistence::ffi::register_persistence_functions(m)?;
    m.add("__version__", persistence::VERSION)?;
    Ok(())
}
