/*!
 * 由顶点采样构造 level-set zigzag filtration
 *
 * 给定顶点上的函数值 f 和容差 eps，cell σ 的有效区间为
 *
 * ```text
 * [max_{v∈σ} f(v) − eps, min_{v∈σ} f(v) + eps]
 * ```
 *
 * 当 σ 的振幅 max f − min f 不超过 2·eps 时区间非空。face 的振幅不大于
 * cell 的振幅，所以 cell 的区间总是包含在 face 的区间内。
 *
 * 顶点的标签即为 `values` 的下标。
 */

use ndarray::ArrayView1;

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::Value;
use super::complex::{CellComplex, SimplicialComplex};
use super::right_filtration::{Interval, RightFiltration};

fn check_eps(eps: Value) -> PersistenceResult<()> {
    if !(eps >= 0.0) || !eps.is_finite() {
        return Err(PersistenceError::Config(format!(
            "level-set tolerance must be finite and non-negative, got {}",
            eps
        )));
    }
    Ok(())
}

fn sample(values: &ArrayView1<'_, Value>, vertex: usize) -> PersistenceResult<Value> {
    values
        .get(vertex)
        .copied()
        .ok_or(PersistenceError::ValueCountMismatch {
            dim: 0,
            expected: vertex + 1,
            actual: values.len(),
        })
}

/// 每个 cell 的 level-set 区间
///
/// # Arguments
///
/// * `values` - 顶点上的函数值，按顶点标签索引
/// * `complex` - 单纯复形
/// * `eps` - 容差（≥ 0）
///
/// # Returns
///
/// `out[dim][cell]`：振幅超过 2·eps 的 cell 为 `None`
pub fn extend_levelset(
    values: ArrayView1<'_, Value>,
    complex: &SimplicialComplex,
    eps: Value,
) -> PersistenceResult<Vec<Vec<Option<Interval>>>> {
    check_eps(eps)?;
    let mut out = Vec::with_capacity(complex.maxdim() + 1);
    for dim in 0..=complex.maxdim() {
        let mut cells = Vec::with_capacity(complex.ncells(dim));
        for s in complex.simplices(dim) {
            let mut lo = Value::NEG_INFINITY;
            let mut hi = Value::INFINITY;
            for &v in s {
                let x = sample(&values, v)?;
                if x.is_nan() {
                    return Err(PersistenceError::InvalidInterval { start: x, end: x });
                }
                lo = lo.max(x);
                hi = hi.min(x);
            }
            let (start, end) = (lo - eps, hi + eps);
            cells.push(if start <= end {
                Some(Interval::new(start, end)?)
            } else {
                None
            });
        }
        out.push(cells);
    }
    Ok(out)
}

/// level-set zigzag filtration
///
/// 振幅超过 2·eps 的 cell 保留在复形中，但区间集合为空，永远不会插入。
pub fn extend_zigzag_filtration(
    values: ArrayView1<'_, Value>,
    complex: &SimplicialComplex,
    eps: Value,
) -> PersistenceResult<RightFiltration<SimplicialComplex>> {
    let intervals = extend_levelset(values, complex, eps)?
        .into_iter()
        .map(|cells| cells.into_iter().map(|iv| iv.into_iter().collect()).collect())
        .collect();
    RightFiltration::from_intervals(complex.clone(), intervals)
}

/// 边上的最大振幅 max |f(u) − f(v)|
///
/// 没有边时返回 0。
pub fn lipschitz_constant(
    values: ArrayView1<'_, Value>,
    complex: &SimplicialComplex,
) -> PersistenceResult<Value> {
    let mut lc: Value = 0.0;
    for edge in complex.simplices(1) {
        let a = sample(&values, edge[0])?;
        let b = sample(&values, edge[1])?;
        lc = lc.max((a - b).abs());
    }
    Ok(lc)
}

// ============================================================================
// 单元测试
// ============================================================================
