/*!
 * 链复形
 *
 * - `ChainComplex`: 每个维度一个边界矩阵 ∂_k : C_k → C_{k-1}（∂_0 为 0 × n_0 零矩阵）
 * - `FilteredChainComplex`: 行列按 filtration 顺序排列的链复形 + 排序后的值
 * - `ReducedChainComplex`: 各维独立归约，给出秩与同调维数
 *
 * 同调维数：hdim(k) = #cells(k) − rank(∂_k) − rank(∂_{k+1})
 */

use rayon::prelude::*;

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::Value;
use super::column_matrix::ColumnMatrix;
use super::complex::CellComplex;
use super::field::Field;
use super::filtration::Filtration;
use super::options::ReductionKind;
use super::reduction::reduce_matrix;
use super::sparse_vector::SparseVector;

// ============================================================================
// ChainComplex
// ============================================================================

/// 链复形：boundaries[k] = ∂_k
#[derive(Clone, Debug, PartialEq)]
pub struct ChainComplex<F> {
    boundaries: Vec<ColumnMatrix<F>>,
}

impl<F: Field> ChainComplex<F> {
    /// 从胞腔复形构造（cell 保持原始顺序）
    ///
    /// 边界引用了不存在的 face 时返回 `MalformedBoundary`。
    pub fn from_complex<C: CellComplex>(complex: &C) -> PersistenceResult<Self> {
        let maxdim = complex.maxdim();
        let mut boundaries = Vec::with_capacity(maxdim + 1);
        boundaries.push(ColumnMatrix::zeros(0, complex.ncells(0)));
        for k in 1..=maxdim {
            let cols = (0..complex.ncells(k))
                .map(|i| boundary_column(complex, k, i, None))
                .collect::<PersistenceResult<Vec<_>>>()?;
            boundaries.push(ColumnMatrix::from_columns(complex.ncells(k - 1), cols));
        }
        Ok(Self { boundaries })
    }

    /// 直接由边界矩阵构造，检查维度衔接与行越界
    ///
    /// `boundaries[0]` 的行数必须为 0。
    pub fn from_boundaries(boundaries: Vec<ColumnMatrix<F>>) -> PersistenceResult<Self> {
        for (k, d) in boundaries.iter().enumerate() {
            let expected_rows = if k == 0 { 0 } else { boundaries[k - 1].ncols() };
            if let Some((cell, row)) = d.check_rows() {
                return Err(PersistenceError::MalformedBoundary {
                    dim: k,
                    cell,
                    row,
                    nrows: d.nrows(),
                });
            }
            if d.nrows() != expected_rows {
                return Err(PersistenceError::ValueCountMismatch {
                    dim: k.saturating_sub(1),
                    expected: expected_rows,
                    actual: d.nrows(),
                });
            }
        }
        Ok(Self { boundaries })
    }

    pub fn maxdim(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// k 维 cell 数量
    pub fn dim(&self, k: usize) -> usize {
        self.boundaries.get(k).map_or(0, ColumnMatrix::ncols)
    }

    /// ∂_k
    pub fn boundary(&self, k: usize) -> &ColumnMatrix<F> {
        &self.boundaries[k]
    }

    pub fn boundaries(&self) -> &[ColumnMatrix<F>] {
        &self.boundaries
    }

    pub(crate) fn into_boundaries(self) -> Vec<ColumnMatrix<F>> {
        self.boundaries
    }

    /// 交错和 Σ (-1)^k #cells(k)
    pub fn euler_characteristic(&self) -> i64 {
        (0..=self.maxdim())
            .map(|k| {
                let n = self.dim(k) as i64;
                if k % 2 == 0 {
                    n
                } else {
                    -n
                }
            })
            .sum()
    }
}

/// 第 k 维第 i 个 cell 的边界列；`row_position` 给出 (k-1) 维的重新编号
fn boundary_column<F: Field, C: CellComplex>(
    complex: &C,
    k: usize,
    i: usize,
    row_position: Option<&[usize]>,
) -> PersistenceResult<SparseVector<F>> {
    let nrows = complex.ncells(k - 1);
    let mut pairs = Vec::new();
    for (face, c) in complex.boundary(k, i) {
        if face >= nrows {
            return Err(PersistenceError::MalformedBoundary {
                dim: k,
                cell: i,
                row: face,
                nrows,
            });
        }
        let row = row_position.map_or(face, |pos| pos[face]);
        pairs.push((row, F::from_i64(c)));
    }
    Ok(SparseVector::from_pairs(pairs))
}

// ============================================================================
// FilteredChainComplex
// ============================================================================

/// 按 filtration 顺序排列的链复形
///
/// 第 k 维第 pos 列对应原始 cell `cells[k][pos]`，其值为 `vals[k][pos]`，
/// 每个维度的值单调不减。
#[derive(Clone, Debug)]
pub struct FilteredChainComplex<F> {
    complex: ChainComplex<F>,
    vals: Vec<Vec<Value>>,
    cells: Vec<Vec<usize>>,
}

impl<F: Field> FilteredChainComplex<F> {
    /// 从 filtration 构造：检查 filtration 条件，按 (值, 索引) 排序行列
    pub fn new<C: CellComplex>(filtration: &Filtration<C>) -> PersistenceResult<Self> {
        filtration.validate()?;
        let complex = filtration.complex();
        let maxdim = complex.maxdim();

        let cells: Vec<Vec<usize>> = (0..=maxdim).map(|k| filtration.sortperm(k)).collect();
        let positions: Vec<Vec<usize>> = cells
            .iter()
            .map(|order| {
                let mut pos = vec![0; order.len()];
                for (p, &i) in order.iter().enumerate() {
                    pos[i] = p;
                }
                pos
            })
            .collect();

        let mut boundaries = Vec::with_capacity(maxdim + 1);
        boundaries.push(ColumnMatrix::zeros(0, complex.ncells(0)));
        for k in 1..=maxdim {
            let cols = cells[k]
                .iter()
                .map(|&i| boundary_column(complex, k, i, Some(&positions[k - 1])))
                .collect::<PersistenceResult<Vec<_>>>()?;
            boundaries.push(ColumnMatrix::from_columns(complex.ncells(k - 1), cols));
        }

        let vals = cells
            .iter()
            .enumerate()
            .map(|(k, order)| order.iter().map(|&i| filtration.vals(k)[i]).collect())
            .collect();

        let fc = Self {
            complex: ChainComplex { boundaries },
            vals,
            cells,
        };
        fc.check_boundaries()?;
        Ok(fc)
    }

    /// 由已排好序的边界矩阵和值构造
    ///
    /// 高于 `complex.maxdim()` 的维度只能是空的。
    pub fn from_parts(complex: ChainComplex<F>, mut vals: Vec<Vec<Value>>) -> PersistenceResult<Self> {
        if let Some((k, extra)) = vals
            .iter()
            .enumerate()
            .skip(complex.maxdim() + 1)
            .find(|(_, v)| !v.is_empty())
        {
            return Err(PersistenceError::ValueCountMismatch {
                dim: k,
                expected: 0,
                actual: extra.len(),
            });
        }
        vals.resize_with(complex.maxdim() + 1, Vec::new);
        for k in 0..=complex.maxdim() {
            let actual = vals[k].len();
            if actual != complex.dim(k) {
                return Err(PersistenceError::ValueCountMismatch {
                    dim: k,
                    expected: complex.dim(k),
                    actual,
                });
            }
            if let Some(position) = vals[k].windows(2).position(|w| !(w[0] <= w[1])) {
                return Err(PersistenceError::UnsortedCells {
                    dim: k,
                    position: position + 1,
                });
            }
        }
        let cells = (0..=complex.maxdim())
            .map(|k| (0..complex.dim(k)).collect())
            .collect();
        let fc = Self {
            complex,
            vals,
            cells,
        };
        fc.check_boundaries()?;
        Ok(fc)
    }

    /// 每个边界项：行在范围内，且 face 的值不大于列的值
    fn check_boundaries(&self) -> PersistenceResult<()> {
        for k in 1..=self.complex.maxdim() {
            let d = self.complex.boundary(k);
            for (j, col) in d.columns().iter().enumerate() {
                for &(row, _) in col.iter() {
                    if row >= self.vals[k - 1].len() {
                        return Err(PersistenceError::MalformedBoundary {
                            dim: k,
                            cell: self.cells[k][j],
                            row,
                            nrows: self.vals[k - 1].len(),
                        });
                    }
                    if !(self.vals[k - 1][row] <= self.vals[k][j]) {
                        return Err(PersistenceError::FiltrationViolation {
                            dim: k,
                            cell: self.cells[k][j],
                            value: self.vals[k][j],
                            face: self.cells[k - 1][row],
                            face_value: self.vals[k - 1][row],
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn maxdim(&self) -> usize {
        self.complex.maxdim()
    }

    pub fn dim(&self, k: usize) -> usize {
        self.complex.dim(k)
    }

    pub fn complex(&self) -> &ChainComplex<F> {
        &self.complex
    }

    /// 第 k 维排序后的值
    pub fn vals(&self, k: usize) -> &[Value] {
        &self.vals[k]
    }

    /// filtration 位置 → 原始 cell 索引
    pub fn cells(&self, k: usize) -> &[usize] {
        &self.cells[k]
    }

    pub(crate) fn into_parts(self) -> (ChainComplex<F>, Vec<Vec<Value>>, Vec<Vec<usize>>) {
        (self.complex, self.vals, self.cells)
    }
}

// ============================================================================
// ReducedChainComplex
// ============================================================================

/// 各维归约后的链复形
#[derive(Clone, Debug)]
pub struct ReducedChainComplex<F> {
    dims: Vec<usize>,
    ranks: Vec<usize>,
    reduced: Vec<ColumnMatrix<F>>,
}

impl<F: Field> ReducedChainComplex<F> {
    /// 各维 ∂_k 互不依赖，在 rayon 线程池上并行归约
    pub fn new(complex: &ChainComplex<F>) -> PersistenceResult<Self> {
        let results: Vec<PersistenceResult<(ColumnMatrix<F>, usize)>> = complex
            .boundaries()
            .par_iter()
            .map(|d| {
                let mut r = d.clone();
                let (pivots, _) = reduce_matrix(&mut r, ReductionKind::Standard, false, None)?;
                Ok((r, pivots.rank()))
            })
            .collect();

        let mut reduced = Vec::with_capacity(results.len());
        let mut ranks = Vec::with_capacity(results.len());
        for result in results {
            let (r, rank) = result?;
            reduced.push(r);
            ranks.push(rank);
        }

        let dims = (0..=complex.maxdim()).map(|k| complex.dim(k)).collect();
        tracing::debug!(maxdim = complex.maxdim(), ?ranks, "reduced chain complex");
        Ok(Self {
            dims,
            ranks,
            reduced,
        })
    }

    pub fn maxdim(&self) -> usize {
        self.dims.len().saturating_sub(1)
    }

    /// rank(∂_k)，超出范围为 0
    pub fn rank(&self, k: usize) -> usize {
        self.ranks.get(k).copied().unwrap_or(0)
    }

    /// k 维同调的维数
    pub fn hdim(&self, k: usize) -> usize {
        let n = self.dims.get(k).copied().unwrap_or(0);
        n.saturating_sub(self.rank(k) + self.rank(k + 1))
    }

    pub fn betti_numbers(&self) -> Vec<usize> {
        (0..self.dims.len()).map(|k| self.hdim(k)).collect()
    }

    /// 交错和 Σ (-1)^k #cells(k)
    pub fn euler_characteristic(&self) -> i64 {
        self.dims
            .iter()
            .enumerate()
            .map(|(k, &n)| if k % 2 == 0 { n as i64 } else { -(n as i64) })
            .sum()
    }

    /// 归约后的 ∂_k
    pub fn reduced(&self, k: usize) -> &ColumnMatrix<F> {
        &self.reduced[k]
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::core::complex::SimplicialComplex;
    use crate::persistence::core::field::{F2, F3};

    fn hollow_triangle() -> SimplicialComplex {
        let mut c = SimplicialComplex::new();
        c.add_recursive(&[0, 1]).unwrap();
        c.add_recursive(&[0, 2]).unwrap();
        c.add_recursive(&[1, 2]).unwrap();
        c
    }

    /// 四面体的表面（2-球面）
    fn sphere() -> SimplicialComplex {
        let mut c = SimplicialComplex::new();
        for t in [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]] {
            c.add_recursive(&t).unwrap();
        }
        c
    }

    #[test]
    fn test_boundary_of_boundary_is_zero() {
        let cc: ChainComplex<F3> = ChainComplex::from_complex(&sphere()).unwrap();
        let d1 = cc.boundary(1);
        let d2 = cc.boundary(2);
        assert!(d1.matmul(d2).is_zero());
    }

    #[test]
    fn test_hollow_triangle_homology() {
        let cc: ChainComplex<F2> = ChainComplex::from_complex(&hollow_triangle()).unwrap();
        let r = ReducedChainComplex::new(&cc).unwrap();
        assert_eq!(r.hdim(0), 1);
        assert_eq!(r.hdim(1), 1);
        assert_eq!(r.rank(1), 2);
        assert_eq!(r.euler_characteristic(), 0);
        assert_eq!(cc.euler_characteristic(), 0);
    }

    #[test]
    fn test_sphere_homology_over_f3() {
        let cc: ChainComplex<F3> = ChainComplex::from_complex(&sphere()).unwrap();
        let r = ReducedChainComplex::new(&cc).unwrap();
        assert_eq!(r.betti_numbers(), vec![1, 0, 1]);
        assert_eq!(r.euler_characteristic(), 2);
    }

    #[test]
    fn test_filtered_chain_complex_ordering() {
        let mut f = Filtration::new();
        f.add(0.0, &[0]).unwrap();
        f.add(1.0, &[1]).unwrap();
        f.add(0.5, &[2]).unwrap();
        f.add(2.0, &[0, 1]).unwrap();
        f.add(1.0, &[0, 2]).unwrap();

        let fc: FilteredChainComplex<F2> = FilteredChainComplex::new(&f).unwrap();
        assert_eq!(fc.vals(0), &[0.0, 0.5, 1.0]);
        assert_eq!(fc.cells(0), &[0, 2, 1]);
        assert_eq!(fc.cells(1), &[1, 0]);
        // 边 {0,2} 在位置 0，行为 v0(位置 0) 和 v2(位置 1)
        let rows: Vec<usize> = fc.complex().boundary(1).col(0).iter().map(|e| e.0).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn test_from_parts_detects_bad_input() {
        let d0: ColumnMatrix<F2> = ColumnMatrix::zeros(0, 2);
        let d1 = ColumnMatrix::from_columns(
            2,
            vec![SparseVector::from_pairs(vec![(0, F2::from_i64(1)), (1, F2::from_i64(1))])],
        );
        let cc = ChainComplex::from_boundaries(vec![d0, d1]).unwrap();

        // 值未排序
        let err = FilteredChainComplex::from_parts(cc.clone(), vec![vec![1.0, 0.0], vec![2.0]])
            .unwrap_err();
        assert!(matches!(err, PersistenceError::UnsortedCells { dim: 0, position: 1 }));

        // 边的值小于顶点
        let err = FilteredChainComplex::from_parts(cc.clone(), vec![vec![0.0, 3.0], vec![2.0]])
            .unwrap_err();
        assert!(matches!(err, PersistenceError::FiltrationViolation { dim: 1, face: 1, .. }));

        assert!(FilteredChainComplex::from_parts(cc.clone(), vec![vec![0.0, 1.0], vec![2.0]]).is_ok());

        // 复形中不存在的维度带有值
        let err = FilteredChainComplex::from_parts(cc.clone(), vec![vec![0.0, 1.0], vec![2.0], vec![3.0]])
            .unwrap_err();
        assert_eq!(
            err,
            PersistenceError::ValueCountMismatch {
                dim: 2,
                expected: 0,
                actual: 1,
            }
        );
        let fc = FilteredChainComplex::from_parts(cc, vec![vec![0.0, 1.0], vec![2.0], vec![]]).unwrap();
        assert_eq!(fc.complex().maxdim(), 1);
    }

    /// 边界引用了不存在的 face 的复形
    #[derive(Debug)]
    struct DanglingFace;

    impl CellComplex for DanglingFace {
        fn maxdim(&self) -> usize {
            1
        }

        fn ncells(&self, dim: usize) -> usize {
            [2, 1].get(dim).copied().unwrap_or(0)
        }

        fn boundary(&self, dim: usize, _cell: usize) -> Vec<(usize, i64)> {
            if dim == 1 {
                vec![(0, -1), (5, 1)]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn test_dangling_face_is_error() {
        let malformed = PersistenceError::MalformedBoundary {
            dim: 1,
            cell: 0,
            row: 5,
            nrows: 2,
        };
        let err = ChainComplex::<F2>::from_complex(&DanglingFace).unwrap_err();
        assert_eq!(err, malformed);

        // Filtration 的检查先于边界矩阵的构造
        let f = Filtration::from_values(DanglingFace, vec![vec![0.0, 0.0], vec![1.0]]);
        assert_eq!(f.unwrap_err(), malformed);
    }

    #[test]
    fn test_from_boundaries_detects_mismatch() {
        let d0: ColumnMatrix<F2> = ColumnMatrix::zeros(0, 2);
        let d1: ColumnMatrix<F2> = ColumnMatrix::zeros(3, 1);
        let err = ChainComplex::from_boundaries(vec![d0, d1]).unwrap_err();
        assert!(matches!(err, PersistenceError::ValueCountMismatch { .. }));
    }
}
