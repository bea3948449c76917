/*!
 * 列稀疏矩阵
 *
 * 矩阵按列存储为 `SparseVector`，行数只作为信息记录，
 * 在 debug 构建中检查越界。归约中唯一的热点操作是 `col_axpy`。
 */

use std::fmt;

use super::field::Field;
use super::sparse_vector::SparseVector;

/// 列稀疏矩阵
#[derive(Clone, PartialEq)]
pub struct ColumnMatrix<F> {
    nrows: usize,
    cols: Vec<SparseVector<F>>,
}

impl<F: Field> ColumnMatrix<F> {
    /// nrows 行、0 列的空矩阵
    pub fn new(nrows: usize) -> Self {
        Self {
            nrows,
            cols: Vec::new(),
        }
    }

    /// nrows × ncols 零矩阵
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            cols: vec![SparseVector::new(); ncols],
        }
    }

    /// n 阶单位矩阵
    pub fn identity(n: usize) -> Self {
        Self {
            nrows: n,
            cols: (0..n).map(SparseVector::unit).collect(),
        }
    }

    pub fn from_columns(nrows: usize, cols: Vec<SparseVector<F>>) -> Self {
        debug_assert!(
            cols.iter()
                .all(|c| c.pivot().map_or(true, |(r, _)| r < nrows)),
            "column entry outside of row range"
        );
        Self { nrows, cols }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub fn col(&self, j: usize) -> &SparseVector<F> {
        &self.cols[j]
    }

    #[inline]
    pub fn col_mut(&mut self, j: usize) -> &mut SparseVector<F> {
        &mut self.cols[j]
    }

    pub fn columns(&self) -> &[SparseVector<F>] {
        &self.cols
    }

    pub fn push_col(&mut self, col: SparseVector<F>) {
        debug_assert!(col.pivot().map_or(true, |(r, _)| r < self.nrows));
        self.cols.push(col);
    }

    /// 替换第 j 列，返回旧列
    pub fn replace_col(&mut self, j: usize, col: SparseVector<F>) -> SparseVector<F> {
        debug_assert!(col.pivot().map_or(true, |(r, _)| r < self.nrows));
        std::mem::replace(&mut self.cols[j], col)
    }

    /// 取出第 j 列，原位置留下零列
    pub fn take_col(&mut self, j: usize) -> SparseVector<F> {
        std::mem::take(&mut self.cols[j])
    }

    pub fn swap_cols(&mut self, i: usize, j: usize) {
        self.cols.swap(i, j);
    }

    pub fn scale_col(&mut self, j: usize, a: F) {
        self.cols[j].scale(a);
    }

    /// col[target] ← col[target] + a·col[source]
    pub fn col_axpy(&mut self, target: usize, a: F, source: usize) {
        if target == source {
            self.cols[target].scale(F::one() + a);
            return;
        }
        if target < source {
            let (lo, hi) = self.cols.split_at_mut(source);
            lo[target].axpy(a, &hi[0]);
        } else {
            let (lo, hi) = self.cols.split_at_mut(target);
            hi[0].axpy(a, &lo[source]);
        }
    }

    /// 删除 `rows[r] == true` 的所有行的项（行数不变）
    pub fn clear_rows(&mut self, rows: &[bool]) -> usize {
        let mut removed = 0;
        for col in self.cols.iter_mut() {
            let before = col.nnz();
            col.retain(|r| !rows.get(r).copied().unwrap_or(false));
            removed += before - col.nnz();
        }
        removed
    }

    /// 非零项总数
    pub fn nnz(&self) -> usize {
        self.cols.iter().map(SparseVector::nnz).sum()
    }

    /// 第一个越界项 (列, 行)
    pub fn check_rows(&self) -> Option<(usize, usize)> {
        self.cols.iter().enumerate().find_map(|(j, c)| {
            c.pivot()
                .filter(|&(r, _)| r >= self.nrows)
                .map(|(r, _)| (j, r))
        })
    }

    /// 按 `new_row[old] = new` 重新编号行
    pub fn permute_rows(&self, new_row: &[usize]) -> Self {
        Self {
            nrows: self.nrows,
            cols: self.cols.iter().map(|c| c.permute(new_row)).collect(),
        }
    }

    /// 按 `order[new] = old` 重排列
    pub fn permute_cols(&self, order: &[usize]) -> Self {
        Self {
            nrows: self.nrows,
            cols: order.iter().map(|&j| self.cols[j].clone()).collect(),
        }
    }

    /// 矩阵乘法 self · other
    pub fn matmul(&self, other: &Self) -> Self {
        debug_assert_eq!(self.ncols(), other.nrows());
        let cols = other
            .cols
            .iter()
            .map(|c| {
                let mut out = SparseVector::new();
                for &(k, a) in c.iter() {
                    out.axpy(a, &self.cols[k]);
                }
                out
            })
            .collect();
        Self {
            nrows: self.nrows,
            cols,
        }
    }

    /// 所有项为零
    pub fn is_zero(&self) -> bool {
        self.cols.iter().all(SparseVector::is_zero)
    }
}

impl<F: fmt::Debug> fmt::Debug for ColumnMatrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ColumnMatrix({} x {})", self.nrows, self.cols.len())?;
        for (j, c) in self.cols.iter().enumerate() {
            writeln!(f, "  {}: {:?}", j, c)?;
        }
        Ok(())
    }
}

// ============================================================================
// 单元测试
// ============================================================================
