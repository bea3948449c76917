/*!
 * 胞腔复形接口
 *
 * 归约引擎只通过 `CellComplex` 看复形：每个维度的 cell 数量和每个 cell
 * 的带符号边界。复形的构造（Rips、witness、cubical 等）由调用者负责。
 *
 * `SimplicialComplex` 是最小的单纯复形实现：单纯形以排序后的顶点列表
 * 存储，第 i 个 face（删去第 i 个顶点）的系数为 (-1)^i。
 */

use std::collections::HashMap;
use std::fmt;

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::CellId;

/// 胞腔复形
pub trait CellComplex {
    /// 最高维度（空复形为 0）
    fn maxdim(&self) -> usize;

    /// dim 维 cell 数量
    fn ncells(&self, dim: usize) -> usize;

    /// dim 维第 cell 个 cell 的边界：((dim-1) 维 face 索引, 系数)
    fn boundary(&self, dim: usize, cell: usize) -> Vec<(usize, i64)>;

    /// 所有维度的 cell 总数
    fn total_cells(&self) -> usize {
        (0..=self.maxdim()).map(|k| self.ncells(k)).sum()
    }
}

// ============================================================================
// SimplicialComplex
// ============================================================================

/// 单纯复形
///
/// 单纯形按维度分组，维内索引即插入顺序。
/// 加入一个单纯形前，它的所有 facet 必须已存在（或使用 `add_recursive`）。
#[derive(Clone, Debug, Default)]
pub struct SimplicialComplex {
    /// simplices[dim][index] = 排序后的顶点
    simplices: Vec<Vec<Vec<usize>>>,
    /// lookup[dim][顶点列表] = index
    lookup: Vec<HashMap<Vec<usize>, usize>>,
}

/// 排序并检查顶点互不相同
pub(crate) fn canonical_simplex(simplex: &[usize]) -> PersistenceResult<Vec<usize>> {
    let mut s = simplex.to_vec();
    s.sort_unstable();
    s.dedup();
    if s.is_empty() || s.len() != simplex.len() {
        return Err(PersistenceError::InvalidSimplex(simplex.to_vec()));
    }
    Ok(s)
}

/// 删去第 i 个顶点得到的 facet 及其符号
pub(crate) fn facets(simplex: &[usize]) -> impl Iterator<Item = (Vec<usize>, i64)> + '_ {
    let n = if simplex.len() > 1 { simplex.len() } else { 0 };
    (0..n).map(move |i| {
        let mut face = Vec::with_capacity(simplex.len() - 1);
        face.extend_from_slice(&simplex[..i]);
        face.extend_from_slice(&simplex[i + 1..]);
        (face, if i % 2 == 0 { 1 } else { -1 })
    })
}

impl SimplicialComplex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查找单纯形（顶点顺序任意）
    pub fn find(&self, simplex: &[usize]) -> Option<CellId> {
        let s = canonical_simplex(simplex).ok()?;
        let dim = s.len() - 1;
        self.lookup
            .get(dim)
            .and_then(|m| m.get(&s))
            .map(|&index| CellId::new(dim, index))
    }

    pub fn contains(&self, simplex: &[usize]) -> bool {
        self.find(simplex).is_some()
    }

    /// 单纯形的顶点
    pub fn simplex(&self, cell: CellId) -> Option<&[usize]> {
        self.simplices
            .get(cell.dim)
            .and_then(|v| v.get(cell.index))
            .map(Vec::as_slice)
    }

    /// dim 维所有单纯形
    pub fn simplices(&self, dim: usize) -> &[Vec<usize>] {
        self.simplices.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 加入单纯形，所有 facet 必须已存在
    ///
    /// 已存在的单纯形直接返回其 id。
    pub fn add(&mut self, simplex: &[usize]) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        if let Some(id) = self.find(&s) {
            return Ok(id);
        }
        for (face, _) in facets(&s) {
            if !self.contains(&face) {
                return Err(PersistenceError::MissingFace {
                    simplex: s.clone(),
                    face,
                });
            }
        }
        Ok(self.insert(s))
    }

    /// 加入单纯形及其所有缺失的 face
    pub fn add_recursive(&mut self, simplex: &[usize]) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        if let Some(id) = self.find(&s) {
            return Ok(id);
        }
        for (face, _) in facets(&s) {
            self.add_recursive(&face)?;
        }
        Ok(self.insert(s))
    }

    fn insert(&mut self, s: Vec<usize>) -> CellId {
        let dim = s.len() - 1;
        if self.simplices.len() <= dim {
            self.simplices.resize_with(dim + 1, Vec::new);
            self.lookup.resize_with(dim + 1, HashMap::new);
        }
        let index = self.simplices[dim].len();
        self.lookup[dim].insert(s.clone(), index);
        self.simplices[dim].push(s);
        CellId::new(dim, index)
    }
}

impl CellComplex for SimplicialComplex {
    fn maxdim(&self) -> usize {
        self.simplices.len().saturating_sub(1)
    }

    fn ncells(&self, dim: usize) -> usize {
        self.simplices.get(dim).map_or(0, Vec::len)
    }

    fn boundary(&self, dim: usize, cell: usize) -> Vec<(usize, i64)> {
        if dim == 0 {
            return Vec::new();
        }
        let s = &self.simplices[dim][cell];
        facets(s)
            .filter_map(|(face, sign)| self.lookup[dim - 1].get(&face).map(|&i| (i, sign)))
            .collect()
    }
}

impl fmt::Display for SimplicialComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimplicialComplex, maxdim = {}", self.maxdim())?;
        for (dim, cells) in self.simplices.iter().enumerate() {
            write!(f, "\n  dim {} : {} cells", dim, cells.len())?;
        }
        Ok(())
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_faces() {
        let mut c = SimplicialComplex::new();
        let err = c.add(&[0, 1]).unwrap_err();
        assert!(matches!(err, PersistenceError::MissingFace { .. }));

        c.add(&[0]).unwrap();
        c.add(&[1]).unwrap();
        let e = c.add(&[1, 0]).unwrap();
        assert_eq!(e, CellId::new(1, 0));
        assert_eq!(c.simplex(e), Some(&[0usize, 1][..]));
    }

    #[test]
    fn test_add_recursive_builds_faces() {
        let mut c = SimplicialComplex::new();
        let t = c.add_recursive(&[2, 0, 1]).unwrap();
        assert_eq!(t, CellId::new(2, 0));
        assert_eq!(c.ncells(0), 3);
        assert_eq!(c.ncells(1), 3);
        assert_eq!(c.ncells(2), 1);
        assert_eq!(c.total_cells(), 7);
        assert_eq!(c.maxdim(), 2);

        // 再次加入返回已有 id
        assert_eq!(c.add_recursive(&[0, 1, 2]).unwrap(), t);
        assert_eq!(c.total_cells(), 7);
    }

    #[test]
    fn test_invalid_simplex() {
        let mut c = SimplicialComplex::new();
        assert!(matches!(c.add(&[]), Err(PersistenceError::InvalidSimplex(_))));
        assert!(matches!(c.add(&[1, 1]), Err(PersistenceError::InvalidSimplex(_))));
    }

    #[test]
    fn test_boundary_signs() {
        let mut c = SimplicialComplex::new();
        c.add_recursive(&[0, 1, 2]).unwrap();
        let e01 = c.find(&[0, 1]).unwrap().index;
        let e02 = c.find(&[0, 2]).unwrap().index;
        let e12 = c.find(&[1, 2]).unwrap().index;

        let mut bd = c.boundary(2, 0);
        bd.sort();
        let mut expected = vec![(e12, 1), (e02, -1), (e01, 1)];
        expected.sort();
        assert_eq!(bd, expected);

        let v0 = c.find(&[0]).unwrap().index;
        let v1 = c.find(&[1]).unwrap().index;
        let mut bd = c.boundary(1, e01);
        bd.sort();
        let mut expected = vec![(v1, 1), (v0, -1)];
        expected.sort();
        assert_eq!(bd, expected);
        assert!(c.boundary(0, v0).is_empty());
    }
}
