/*!
 * 单调 filtration 的持久同调
 *
 * # 流程
 *
 * 1. `FilteredChainComplex`：检查 filtration 条件，按 (值, 索引) 排列行列
 * 2. 按 `ReductionOptions` 归约各维 ∂_k：
 *    - `None`: 各维独立（可并行）
 *    - `Clearing`: 自顶向下，R_{k+1} 的 pivot 行对应的 k 维列直接置零
 *    - `Compression`: 自底向上，k 维 negative cell 的行从 ∂_{k+1} 删除
 * 3. 读出 pairs：
 *    - k 维 cell i 是 R_{k+1} 中某列 j 的 pivot → 有限 pair (val_k[i], val_{k+1}[j])
 *    - i 自身的列有 pivot（negative cell）→ 它是某个 pair 的 death，跳过
 *    - 否则 → 无穷 pair
 *
 * 每个 cell 恰好出现一次：有限 pair 的 birth、有限 pair 的 death、或无穷 pair 的 birth。
 *
 * # 使用示例
 *
 * ```ignore
 * let bc = barcode::<F2, _>(&filtration, &ReductionOptions::new())?;
 * for p in bc.nonzero(1) {
 *     println!("{}", p);
 * }
 * ```
 */

use rayon::prelude::*;

use super::super::error::PersistenceResult;
use super::super::types::{Barcode, PersistencePair, Value};
use super::column_matrix::ColumnMatrix;
use super::complex::CellComplex;
use super::field::Field;
use super::filtration::Filtration;
use super::options::{Optimization, ReductionOptions};
use super::reduction::{reduce_matrix, PivotMap, ReductionStats};
use super::chain_complex::FilteredChainComplex;

/// 归约后的 filtered 链复形
#[derive(Clone, Debug)]
pub struct ReducedFilteredChainComplex<F> {
    /// vals[k][pos]：排序后的值
    vals: Vec<Vec<Value>>,
    /// cells[k][pos]：原始 cell 索引
    cells: Vec<Vec<usize>>,
    /// reduced[k] = R_k（compression 下零持久性列被丢弃）
    reduced: Vec<ColumnMatrix<F>>,
    /// pivots[k]：R_k 的 pivot 表
    pivots: Vec<PivotMap>,
    /// 报告的最高同调维度
    report_dim: usize,
    stats: ReductionStats,
}

impl<F: Field> ReducedFilteredChainComplex<F> {
    /// 归约 filtered 链复形
    ///
    /// # Arguments
    ///
    /// * `fc` - filtered 链复形
    /// * `opts` - 归约选项（不影响结果，只影响时间与内存）
    #[tracing::instrument(skip_all, fields(maxdim = fc.maxdim(), optimization = ?opts.optimization))]
    pub fn new(fc: FilteredChainComplex<F>, opts: &ReductionOptions) -> PersistenceResult<Self> {
        let maxdim = fc.maxdim();
        let report_dim = opts.max_dim.map_or(maxdim, |d| d.min(maxdim));
        // 计算 H_0..H_report_dim 需要 ∂_0..∂_{report_dim+1}
        let top = (report_dim + 1).min(maxdim);

        let (complex, vals, cells) = fc.into_parts();
        let mut matrices = complex.into_boundaries();
        matrices.truncate(top + 1);

        let mut stats = ReductionStats::default();
        let pivots = match opts.optimization {
            Optimization::None => reduce_independent(&mut matrices, opts, &mut stats)?,
            Optimization::Clearing => reduce_clearing(&mut matrices, opts, &mut stats)?,
            Optimization::Compression => {
                reduce_compression(&mut matrices, &vals, opts, &mut stats)?
            }
        };

        tracing::debug!(
            columns = stats.columns,
            additions = stats.column_additions,
            apparent = stats.apparent_pairs,
            cleared = stats.cleared_columns,
            compressed = stats.compressed_entries,
            "filtered reduction finished"
        );

        Ok(Self {
            vals,
            cells,
            reduced: matrices,
            pivots,
            report_dim,
            stats,
        })
    }

    /// 报告的最高维度
    pub fn maxdim(&self) -> usize {
        self.report_dim
    }

    /// k 维 persistence pairs（按 birth 的 filtration 位置排序）
    pub fn persistence_pairs(&self, k: usize) -> Vec<PersistencePair> {
        if k > self.report_dim {
            return Vec::new();
        }
        let ncells = self.vals[k].len();
        let mut pairs = Vec::new();
        for i in 0..ncells {
            let killer = self.pivots.get(k + 1).and_then(|p| p.owner(i));
            if let Some(j) = killer {
                pairs.push(PersistencePair::finite(
                    k,
                    self.vals[k][i],
                    self.vals[k + 1][j],
                    self.cells[k][i],
                    self.cells[k + 1][j],
                ));
            } else if self.pivots[k].pivot(i).is_none() {
                pairs.push(PersistencePair::essential(k, self.vals[k][i], self.cells[k][i]));
            }
        }
        pairs
    }

    /// k 维同调的维数（无穷 pair 数量）
    pub fn hdim(&self, k: usize) -> usize {
        self.persistence_pairs(k)
            .iter()
            .filter(|p| p.is_essential())
            .count()
    }

    pub fn barcode(&self) -> Barcode {
        Barcode::from_pairs((0..=self.report_dim).map(|k| self.persistence_pairs(k)).collect())
    }

    /// R_k
    pub fn reduced_matrix(&self, k: usize) -> &ColumnMatrix<F> {
        &self.reduced[k]
    }

    pub fn pivots(&self, k: usize) -> &PivotMap {
        &self.pivots[k]
    }

    pub fn stats(&self) -> &ReductionStats {
        &self.stats
    }
}

// ============================================================================
// 三种跨维策略
// ============================================================================

fn reduce_independent<F: Field>(
    matrices: &mut [ColumnMatrix<F>],
    opts: &ReductionOptions,
    stats: &mut ReductionStats,
) -> PersistenceResult<Vec<PivotMap>> {
    let results: Vec<PersistenceResult<(PivotMap, ReductionStats)>> = if opts.parallel {
        matrices
            .par_iter_mut()
            .map(|m| reduce_matrix(m, opts.reduction, opts.apparent_pairs, None))
            .collect()
    } else {
        matrices
            .iter_mut()
            .map(|m| reduce_matrix(m, opts.reduction, opts.apparent_pairs, None))
            .collect()
    };

    let mut pivots = Vec::with_capacity(results.len());
    for result in results {
        let (p, s) = result?;
        stats.merge(&s);
        pivots.push(p);
    }
    Ok(pivots)
}

fn reduce_clearing<F: Field>(
    matrices: &mut [ColumnMatrix<F>],
    opts: &ReductionOptions,
    stats: &mut ReductionStats,
) -> PersistenceResult<Vec<PivotMap>> {
    let top = matrices.len() - 1;
    let mut pivots: Vec<PivotMap> = vec![PivotMap::default(); matrices.len()];

    for k in (0..=top).rev() {
        // R_{k+1} 的 pivot 行是 positive k-cell，其 ∂_k 列归约后必为零
        let cleared: Option<Vec<bool>> = (k < top).then(|| {
            let above = &pivots[k + 1];
            (0..matrices[k].ncols())
                .map(|i| above.owner(i).is_some())
                .collect()
        });
        let (p, s) = reduce_matrix(
            &mut matrices[k],
            opts.reduction,
            opts.apparent_pairs,
            cleared.as_deref(),
        )?;
        tracing::trace!(dim = k, cleared = s.cleared_columns, "cleared dimension");
        stats.merge(&s);
        pivots[k] = p;
    }
    Ok(pivots)
}

fn reduce_compression<F: Field>(
    matrices: &mut [ColumnMatrix<F>],
    vals: &[Vec<Value>],
    opts: &ReductionOptions,
    stats: &mut ReductionStats,
) -> PersistenceResult<Vec<PivotMap>> {
    let mut pivots: Vec<PivotMap> = Vec::with_capacity(matrices.len());

    for k in 0..matrices.len() {
        if k > 0 {
            // R_{k-1} 中有 pivot 的 (k-1)-cell 是 negative，不可能是 R_k 的 pivot
            let below = &pivots[k - 1];
            let negative: Vec<bool> = (0..matrices[k].nrows())
                .map(|i| below.pivot(i).is_some())
                .collect();
            stats.compressed_entries += matrices[k].clear_rows(&negative);
        }

        let (p, s) = reduce_matrix(&mut matrices[k], opts.reduction, opts.apparent_pairs, None)?;
        stats.merge(&s);

        // 零持久性 pair 的归约列不再需要
        for (row, col) in p.pairs() {
            if vals[k - 1][row] == vals[k][col] {
                matrices[k].take_col(col);
                stats.discarded_columns += 1;
            }
        }
        pivots.push(p);
    }
    Ok(pivots)
}

// ============================================================================
// 入口函数
// ============================================================================

/// 计算单调 filtration 的 barcode
///
/// # Arguments
///
/// * `filtration` - 满足 filtration 条件的 filtration
/// * `opts` - 归约选项
///
/// # Returns
///
/// 各维度的 persistence pairs；filtration 条件不满足时返回错误
pub fn barcode<F: Field, C: CellComplex>(
    filtration: &Filtration<C>,
    opts: &ReductionOptions,
) -> PersistenceResult<Barcode> {
    let fc = FilteredChainComplex::<F>::new(filtration)?;
    let reduced = ReducedFilteredChainComplex::new(fc, opts)?;
    Ok(reduced.barcode())
}

/// 批量计算（Rayon 并行）
///
/// 各 filtration 互相独立，每个结果单独返回。
pub fn barcode_batch<F: Field, C: CellComplex + Sync>(
    filtrations: &[Filtration<C>],
    opts: &ReductionOptions,
) -> Vec<PersistenceResult<Barcode>> {
    filtrations
        .par_iter()
        .map(|f| barcode::<F, C>(f, opts))
        .collect()
}

// ============================================================================
// 单元测试
// ============================================================================
