//! Python FFI 绑定
//!
//! 通过 PyO3 提供 Python 可调用的接口。
//!
//! 复形以单纯形列表给出（每个单纯形是顶点列表），face 必须排在 coface 之前
//! 或与 coface 位于同一列表中；输入按维度稳定排序后依次加入。
//! 系数域由 `prime` 选择，支持 2、3、5、7。

use ndarray::Array2;
use numpy::{IntoPyArray, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use pyo3::Bound;

use super::core::{
    barcode, barcode_batch, extend_zigzag_filtration, zigzag_barcode, Field, Filtration, ModP,
    ReductionOptions, RightFiltration, SimplicialComplex,
};
use super::error::{PersistenceError, PersistenceResult};
use super::types::{Barcode, ZigzagBarcode};

fn to_py_err(e: PersistenceError) -> PyErr {
    PyValueError::new_err(format!("persistence error: {}", e))
}

/// 按维度稳定排序的下标
fn by_dimension(simplices: &[Vec<usize>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..simplices.len()).collect();
    order.sort_by_key(|&i| simplices[i].len());
    order
}

fn check_len(what: &str, expected: usize, actual: usize) -> PyResult<()> {
    if expected != actual {
        return Err(PyValueError::new_err(format!(
            "{} has length {}, expected {}",
            what, actual, expected
        )));
    }
    Ok(())
}

fn build_filtration(simplices: &[Vec<usize>], values: &[f64]) -> PersistenceResult<Filtration> {
    let mut f = Filtration::new();
    for i in by_dimension(simplices) {
        f.add(values[i], &simplices[i])?;
    }
    Ok(f)
}

fn build_right_filtration(
    simplices: &[Vec<usize>],
    starts: &[f64],
    ends: &[f64],
) -> PersistenceResult<RightFiltration> {
    let mut f = RightFiltration::new();
    for i in by_dimension(simplices) {
        f.add(starts[i], ends[i], &simplices[i])?;
    }
    Ok(f)
}

fn parse_options(options: Option<&str>) -> PyResult<ReductionOptions> {
    options
        .map_or(Ok(ReductionOptions::default()), ReductionOptions::from_json)
        .map_err(to_py_err)
}

/// 按素数分派到具体的系数域
macro_rules! dispatch_prime {
    ($prime:expr, $f:ident ( $($arg:expr),* )) => {
        match $prime {
            2 => $f::<ModP<2>>($($arg),*),
            3 => $f::<ModP<3>>($($arg),*),
            5 => $f::<ModP<5>>($($arg),*),
            7 => $f::<ModP<7>>($($arg),*),
            p => Err(PersistenceError::Config(format!("unsupported prime {}", p))),
        }
    };
}

fn run_barcode<F: Field>(f: &Filtration, opts: &ReductionOptions) -> PersistenceResult<Barcode> {
    barcode::<F, _>(f, opts)
}

fn run_batch<F: Field>(
    fs: &[Filtration],
    opts: &ReductionOptions,
) -> PersistenceResult<Vec<PersistenceResult<Barcode>>> {
    Ok(barcode_batch::<F, _>(fs, opts))
}

fn run_zigzag<F: Field>(f: &RightFiltration) -> PersistenceResult<ZigzagBarcode> {
    zigzag_barcode::<F, _>(f)
}

fn barcode_to_list<'py>(py: Python<'py>, bc: &Barcode) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty(py);
    for dim in 0..=bc.maxdim() {
        list.append(bc.to_array(dim).into_pyarray(py))?;
    }
    Ok(list)
}

fn zigzag_to_dict<'py>(py: Python<'py>, bc: &ZigzagBarcode) -> PyResult<Bound<'py, PyDict>> {
    let intervals = PyList::empty(py);
    let closed = PyList::empty(py);
    for dim in 0..=bc.maxdim() {
        let pairs = bc.pairs(dim);
        intervals.append(bc.to_array(dim).into_pyarray(py))?;
        let flags = Array2::from_shape_fn((pairs.len(), 2), |(i, j)| {
            if j == 0 {
                pairs[i].birth.closed
            } else {
                pairs[i].death.closed
            }
        });
        closed.append(flags.into_pyarray(py))?;
    }
    let dict = PyDict::new(py);
    dict.set_item("intervals", intervals)?;
    dict.set_item("closed", closed)?;
    Ok(dict)
}

/// 单调 filtration 的 barcode
///
/// # Arguments
/// * `simplices` - 单纯形列表
/// * `values` - 每个单纯形的 filtration 值
/// * `prime` - 系数域 GF(p) (default: 2)
/// * `options` - JSON 格式的归约选项 (default: 无优化)
///
/// # Returns
/// List of (n, 2) arrays: 第 k 个数组为 H_k 的 [birth, death]
#[pyfunction]
#[pyo3(signature = (simplices, values, prime=2, options=None))]
pub fn barcode_py<'py>(
    py: Python<'py>,
    simplices: Vec<Vec<usize>>,
    values: PyReadonlyArray1<f64>,
    prime: u32,
    options: Option<&str>,
) -> PyResult<Bound<'py, PyList>> {
    let values = values.as_array().to_vec();
    check_len("values", simplices.len(), values.len())?;
    let opts = parse_options(options)?;

    let bc = py
        .detach(|| {
            let f = build_filtration(&simplices, &values)?;
            dispatch_prime!(prime, run_barcode(&f, &opts))
        })
        .map_err(to_py_err)?;
    barcode_to_list(py, &bc)
}

/// 同一复形上多组 filtration 值的 barcode（Rayon 并行）
///
/// # Returns
/// List of barcodes，每个 barcode 的格式同 `barcode_py`
#[pyfunction]
#[pyo3(signature = (simplices, values_batch, prime=2, options=None))]
pub fn barcode_batch_py<'py>(
    py: Python<'py>,
    simplices: Vec<Vec<usize>>,
    values_batch: Vec<PyReadonlyArray1<f64>>,
    prime: u32,
    options: Option<&str>,
) -> PyResult<Vec<Bound<'py, PyList>>> {
    let values_owned: Vec<Vec<f64>> = values_batch.iter().map(|v| v.as_array().to_vec()).collect();
    for values in &values_owned {
        check_len("values", simplices.len(), values.len())?;
    }
    let opts = parse_options(options)?;

    // 释放 GIL 并行处理
    let results = py
        .detach(|| {
            let fs = values_owned
                .iter()
                .map(|values| build_filtration(&simplices, values))
                .collect::<PersistenceResult<Vec<_>>>()?;
            dispatch_prime!(prime, run_batch(&fs, &opts))
        })
        .map_err(to_py_err)?;

    results
        .into_iter()
        .map(|r| r.map_err(to_py_err).and_then(|bc| barcode_to_list(py, &bc)))
        .collect()
}

/// right filtration 的 zigzag barcode
///
/// # Arguments
/// * `simplices` - 单纯形列表（同一单纯形可出现多次，对应多个区间）
/// * `starts` / `ends` - 每个区间的端点，`ends` 可为 inf
/// * `prime` - 系数域 GF(p) (default: 2)
///
/// # Returns
/// dict:
/// - 'intervals': 各维 (n, 2) 数组 [birth, death]
/// - 'closed': 各维 (n, 2) 布尔数组，端点是否闭合
#[pyfunction]
#[pyo3(signature = (simplices, starts, ends, prime=2))]
pub fn zigzag_barcode_py<'py>(
    py: Python<'py>,
    simplices: Vec<Vec<usize>>,
    starts: PyReadonlyArray1<f64>,
    ends: PyReadonlyArray1<f64>,
    prime: u32,
) -> PyResult<Bound<'py, PyDict>> {
    let starts = starts.as_array().to_vec();
    let ends = ends.as_array().to_vec();
    check_len("starts", simplices.len(), starts.len())?;
    check_len("ends", simplices.len(), ends.len())?;

    let bc = py
        .detach(|| {
            let f = build_right_filtration(&simplices, &starts, &ends)?;
            dispatch_prime!(prime, run_zigzag(&f))
        })
        .map_err(to_py_err)?;
    zigzag_to_dict(py, &bc)
}

/// 顶点采样函数的 level-set zigzag barcode
///
/// # Arguments
/// * `simplices` - 单纯形列表
/// * `vertex_values` - 顶点上的函数值，按顶点标签索引
/// * `eps` - 容差
/// * `prime` - 系数域 GF(p) (default: 2)
///
/// # Returns
/// dict（格式同 `zigzag_barcode_py`）
#[pyfunction]
#[pyo3(signature = (simplices, vertex_values, eps, prime=2))]
pub fn levelset_barcode_py<'py>(
    py: Python<'py>,
    simplices: Vec<Vec<usize>>,
    vertex_values: PyReadonlyArray1<f64>,
    eps: f64,
    prime: u32,
) -> PyResult<Bound<'py, PyDict>> {
    let values = vertex_values.as_array().to_owned();

    let bc = py
        .detach(|| {
            let mut complex = SimplicialComplex::new();
            for i in by_dimension(&simplices) {
                complex.add_recursive(&simplices[i])?;
            }
            let f = extend_zigzag_filtration(values.view(), &complex, eps)?;
            dispatch_prime!(prime, run_zigzag(&f))
        })
        .map_err(to_py_err)?;
    zigzag_to_dict(py, &bc)
}

/// 注册持久同调函数到 Python 模块
pub fn register_persistence_functions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(barcode_py, m)?)?;
    m.add_function(wrap_pyfunction!(barcode_batch_py, m)?)?;
    m.add_function(wrap_pyfunction!(zigzag_barcode_py, m)?)?;
    m.add_function(wrap_pyfunction!(levelset_barcode_py, m)?)?;
    Ok(())
}
