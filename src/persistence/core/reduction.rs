/*!
 * 边界矩阵归约
 *
 * # 算法流程
 *
 * 1. 对每一列，找到其 pivot（最大的非零行索引）
 * 2. 如果 pivot 已被前面的列占有，用该列消元：col_j ← col_j − (c_j / c_i)·col_i
 * 3. 重复直到 pivot 唯一（记录 pivot → 列）或列变为零
 *
 * 可选项：
 * - **extra reduction**: pivot 确定后，继续消去被其他列占有的非 pivot 项
 * - **apparent pairs**: τ 是 σ 的 pivot 且 σ 是第一个包含 τ 的列时，
 *   σ 的 pivot 在归约中不会改变，直接登记，跳过归约
 * - **clearing**: 调用者给出已知必为零的列，直接置零
 *
 * 行和列都必须已按 filtration 顺序排列。
 */

use super::super::error::PersistenceResult;
use super::column_matrix::ColumnMatrix;
use super::field::Field;
use super::options::ReductionKind;

// ============================================================================
// PivotMap - pivot 追踪表
// ============================================================================

/// pivot 行 ↔ 列的双向稠密表
///
/// 每行至多一个拥有者列；每列至多一个 pivot 行。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PivotMap {
    /// row_owner[row] = 以 row 为 pivot 的列
    row_owner: Vec<Option<usize>>,
    /// col_pivot[col] = 列 col 的 pivot 行
    col_pivot: Vec<Option<usize>>,
}

impl PivotMap {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            row_owner: vec![None; nrows],
            col_pivot: vec![None; ncols],
        }
    }

    /// 以 row 为 pivot 的列
    #[inline]
    pub fn owner(&self, row: usize) -> Option<usize> {
        self.row_owner.get(row).copied().flatten()
    }

    /// 列 col 的 pivot 行
    #[inline]
    pub fn pivot(&self, col: usize) -> Option<usize> {
        self.col_pivot.get(col).copied().flatten()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize) {
        debug_assert!(self.row_owner[row].is_none(), "row {} already owned", row);
        self.row_owner[row] = Some(col);
        self.col_pivot[col] = Some(row);
    }

    /// (pivot 行, 列) 对，按列升序
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.col_pivot
            .iter()
            .enumerate()
            .filter_map(|(col, row)| row.map(|r| (r, col)))
    }

    /// pivot 数量，即矩阵的秩
    pub fn rank(&self) -> usize {
        self.col_pivot.iter().filter(|p| p.is_some()).count()
    }

    pub fn nrows(&self) -> usize {
        self.row_owner.len()
    }

    pub fn ncols(&self) -> usize {
        self.col_pivot.len()
    }
}

// ============================================================================
// 统计信息
// ============================================================================

/// 归约过程计数
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReductionStats {
    /// 处理的列数
    pub columns: usize,
    /// 列加法次数
    pub column_additions: usize,
    /// 识别的 apparent pair 数
    pub apparent_pairs: usize,
    /// clearing 置零的列数
    pub cleared_columns: usize,
    /// compression 删除的矩阵项数
    pub compressed_entries: usize,
    /// compression 丢弃的零持久性列数
    pub discarded_columns: usize,
}

impl ReductionStats {
    pub fn merge(&mut self, other: &ReductionStats) {
        self.columns += other.columns;
        self.column_additions += other.column_additions;
        self.apparent_pairs += other.apparent_pairs;
        self.cleared_columns += other.cleared_columns;
        self.compressed_entries += other.compressed_entries;
        self.discarded_columns += other.discarded_columns;
    }
}

// ============================================================================
// Apparent pairs
// ============================================================================

/// 找出所有 apparent pair (τ, σ)
///
/// τ 是列 σ 的 pivot，且 σ 是第一个在行 τ 上非零的列。
/// 归约只会把前面的列加到后面的列上，所以 σ 之前的列永远不会出现 τ，
/// σ 的 pivot 在归约中保持为 τ。
///
/// # Returns
///
/// (pivot 行, 列) 的向量
pub fn apparent_pairs<F: Field>(matrix: &ColumnMatrix<F>) -> Vec<(usize, usize)> {
    let mut first_col: Vec<Option<usize>> = vec![None; matrix.nrows()];
    for (j, col) in matrix.columns().iter().enumerate() {
        for &(r, _) in col.iter() {
            if let Some(slot) = first_col.get_mut(r) {
                if slot.is_none() {
                    *slot = Some(j);
                }
            }
        }
    }

    matrix
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(j, col)| {
            let (r, _) = col.pivot()?;
            (first_col.get(r).copied().flatten() == Some(j)).then_some((r, j))
        })
        .collect()
}

// ============================================================================
// 列归约
// ============================================================================

/// 归约一个边界矩阵（原地）
///
/// # Arguments
///
/// * `matrix` - 行列均按 filtration 顺序排列的矩阵，归约后为 R
/// * `kind` - 标准或 extra 归约
/// * `use_apparent` - 是否先登记 apparent pair
/// * `cleared` - 已知归约后必为零的列（clearing），直接置零
///
/// # Returns
///
/// (pivot 表, 统计信息)
pub fn reduce_matrix<F: Field>(
    matrix: &mut ColumnMatrix<F>,
    kind: ReductionKind,
    use_apparent: bool,
    cleared: Option<&[bool]>,
) -> PersistenceResult<(PivotMap, ReductionStats)> {
    let ncols = matrix.ncols();
    let mut pivots = PivotMap::new(matrix.nrows(), ncols);
    let mut stats = ReductionStats {
        columns: ncols,
        ..Default::default()
    };
    let mut skip = vec![false; ncols];

    if let Some(cleared) = cleared {
        for (j, done) in skip.iter_mut().enumerate() {
            if cleared.get(j).copied().unwrap_or(false) {
                matrix.col_mut(j).clear();
                *done = true;
                stats.cleared_columns += 1;
            }
        }
    }

    if use_apparent {
        for (row, col) in apparent_pairs(matrix) {
            if !skip[col] {
                pivots.set(row, col);
                skip[col] = true;
                stats.apparent_pairs += 1;
            }
        }
    }

    for j in 0..ncols {
        if skip[j] {
            continue;
        }
        stats.column_additions += reduce_column(matrix, &mut pivots, j)?;
        if kind == ReductionKind::Extra {
            stats.column_additions += extra_reduce_column(matrix, &pivots, j)?;
        }
    }

    Ok((pivots, stats))
}

/// 消去 pivot 冲突，直到 pivot 唯一或列为零
fn reduce_column<F: Field>(
    matrix: &mut ColumnMatrix<F>,
    pivots: &mut PivotMap,
    j: usize,
) -> PersistenceResult<usize> {
    let mut additions = 0;
    while let Some((row, coeff)) = matrix.col(j).pivot() {
        match pivots.owner(row) {
            Some(i) => {
                let ci = matrix.col(i).pivot().map_or(F::zero(), |(_, c)| c);
                matrix.col_axpy(j, -coeff.try_div(ci)?, i);
                additions += 1;
            }
            None => {
                pivots.set(row, j);
                break;
            }
        }
    }
    Ok(additions)
}

/// 从 pivot 往下，消去行已被其他列占有的项
fn extra_reduce_column<F: Field>(
    matrix: &mut ColumnMatrix<F>,
    pivots: &PivotMap,
    j: usize,
) -> PersistenceResult<usize> {
    let Some((mut bound, _)) = matrix.col(j).pivot() else {
        return Ok(0);
    };

    let mut additions = 0;
    loop {
        let next = matrix
            .col(j)
            .iter()
            .rev()
            .filter(|&&(r, _)| r < bound)
            .find_map(|&(r, c)| pivots.owner(r).filter(|&i| i != j).map(|i| (r, c, i)));
        let Some((r, c, i)) = next else {
            break;
        };
        debug_assert!(i < j);
        let ci = matrix.col(i).pivot().map_or(F::zero(), |(_, x)| x);
        matrix.col_axpy(j, -c.try_div(ci)?, i);
        additions += 1;
        bound = r;
    }
    Ok(additions)
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::core::field::{F2, F3};
    use crate::persistence::core::sparse_vector::SparseVector;

    fn col<F: Field>(pairs: &[(usize, i64)]) -> SparseVector<F> {
        SparseVector::from_pairs(pairs.iter().map(|&(i, c)| (i, F::from_i64(c))))
    }

    /// 三角形的 ∂1：边 01, 02, 12（列），顶点 0, 1, 2（行）
    fn triangle_d1<F: Field>() -> ColumnMatrix<F> {
        ColumnMatrix::from_columns(
            3,
            vec![col(&[(0, -1), (1, 1)]), col(&[(0, -1), (2, 1)]), col(&[(1, -1), (2, 1)])],
        )
    }

    #[test]
    fn test_pivot_map() {
        let mut p = PivotMap::new(4, 3);
        assert_eq!(p.owner(2), None);
        p.set(2, 1);
        assert_eq!(p.owner(2), Some(1));
        assert_eq!(p.pivot(1), Some(2));
        assert_eq!(p.pivot(0), None);
        assert_eq!(p.rank(), 1);
        assert_eq!(p.pairs().collect::<Vec<_>>(), vec![(2, 1)]);
        // 越界查询
        assert_eq!(p.owner(10), None);
    }

    #[test]
    fn test_reduce_triangle_boundary_f2() {
        let mut m = triangle_d1::<F2>();
        let (pivots, stats) = reduce_matrix(&mut m, ReductionKind::Standard, false, None).unwrap();

        assert_eq!(pivots.pivot(0), Some(1));
        assert_eq!(pivots.pivot(1), Some(2));
        assert_eq!(pivots.pivot(2), None);
        assert!(m.col(2).is_zero());
        assert_eq!(pivots.rank(), 2);
        assert_eq!(stats.column_additions, 2);
    }

    #[test]
    fn test_reduce_triangle_boundary_f3() {
        let mut m = triangle_d1::<F3>();
        let (pivots, _) = reduce_matrix(&mut m, ReductionKind::Standard, false, None).unwrap();
        assert_eq!(pivots.rank(), 2);
        assert!(m.col(2).is_zero());
    }

    #[test]
    fn test_extra_reduction_clears_owned_rows() {
        // 列 0: {0,1}；列 1: {1,2}，pivot 2；非 pivot 项 1 被列 0 占有
        let mut m: ColumnMatrix<F3> =
            ColumnMatrix::from_columns(3, vec![col(&[(0, 1), (1, 1)]), col(&[(1, 1), (2, 1)])]);
        let (pivots, stats) = reduce_matrix(&mut m, ReductionKind::Extra, false, None).unwrap();

        assert_eq!(pivots.pivot(0), Some(1));
        assert_eq!(pivots.pivot(1), Some(2));
        // 行 1 已被消去，换成了行 0
        assert_eq!(m.col(1).get(1), F3::from_i64(0));
        assert_eq!(m.col(1).get(0), F3::from_i64(-1));
        assert_eq!(stats.column_additions, 1);

        let mut s: ColumnMatrix<F3> =
            ColumnMatrix::from_columns(3, vec![col(&[(0, 1), (1, 1)]), col(&[(1, 1), (2, 1)])]);
        let (ps, _) = reduce_matrix(&mut s, ReductionKind::Standard, false, None).unwrap();
        assert_eq!(ps, pivots);
    }

    #[test]
    fn test_apparent_pairs() {
        let m = triangle_d1::<F2>();
        // 列 0 的 pivot 是行 1，列 0 是第一个含行 1 的列
        // 列 1 的 pivot 是行 2，列 1 是第一个含行 2 的列
        // 列 2 的 pivot 是行 2，但第一个含行 2 的是列 1
        assert_eq!(apparent_pairs(&m), vec![(1, 0), (2, 1)]);

        let mut a = m.clone();
        let (pa, stats) = reduce_matrix(&mut a, ReductionKind::Standard, true, None).unwrap();
        let mut b = m.clone();
        let (pb, _) = reduce_matrix(&mut b, ReductionKind::Standard, false, None).unwrap();
        assert_eq!(pa, pb);
        assert_eq!(stats.apparent_pairs, 2);
    }

    #[test]
    fn test_cleared_columns() {
        let mut m = triangle_d1::<F2>();
        let cleared = [false, false, true];
        let (pivots, stats) =
            reduce_matrix(&mut m, ReductionKind::Standard, false, Some(&cleared)).unwrap();
        assert_eq!(stats.cleared_columns, 1);
        assert_eq!(stats.column_additions, 0);
        assert_eq!(pivots.rank(), 2);
        assert!(m.col(2).is_zero());
    }
}
