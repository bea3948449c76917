/*!
 * 单调 filtration
 *
 * 每个 cell 一个 filtration 值。filtration 条件：cell 的值不小于其所有 face 的值，
 * 即任意阈值 t 处 {cell : val ≤ t} 都是子复形。
 *
 * # 使用示例
 *
 * ```ignore
 * let mut f = Filtration::new();
 * f.add_recursive(0.0, &[0, 1])?;
 * f.add_recursive(1.0, &[1, 2])?;
 * f.add(2.0, &[0, 2])?;
 * ```
 */

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::{CellId, CellKey, Value};
use super::complex::{canonical_simplex, facets, CellComplex, SimplicialComplex};

/// 单调 filtration：复形 + 每个 cell 的值
#[derive(Clone, Debug, Default)]
pub struct Filtration<C = SimplicialComplex> {
    complex: C,
    /// vals[dim][cell]
    vals: Vec<Vec<Value>>,
}

impl<C: CellComplex> Filtration<C> {
    /// 从已有复形和值构造，并检查 filtration 条件
    pub fn from_values(complex: C, vals: Vec<Vec<Value>>) -> PersistenceResult<Self> {
        let f = Self { complex, vals };
        f.validate()?;
        Ok(f)
    }

    pub fn complex(&self) -> &C {
        &self.complex
    }

    pub fn vals(&self, dim: usize) -> &[Value] {
        self.vals.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_vals(&self) -> &[Vec<Value>] {
        &self.vals
    }

    pub fn val(&self, cell: CellId) -> Option<Value> {
        self.vals.get(cell.dim).and_then(|v| v.get(cell.index)).copied()
    }

    pub fn maxdim(&self) -> usize {
        self.complex.maxdim()
    }

    pub fn ncells(&self, dim: usize) -> usize {
        self.complex.ncells(dim)
    }

    /// 检查值的数量、边界的 face 索引与 filtration 条件
    ///
    /// NaN 值总是视为违反条件。
    pub fn validate(&self) -> PersistenceResult<()> {
        for dim in 0..=self.complex.maxdim() {
            let expected = self.complex.ncells(dim);
            let actual = self.vals(dim).len();
            if expected != actual {
                return Err(PersistenceError::ValueCountMismatch {
                    dim,
                    expected,
                    actual,
                });
            }
        }

        for dim in 1..=self.complex.maxdim() {
            for cell in 0..self.complex.ncells(dim) {
                let value = self.vals[dim][cell];
                for (face, _) in self.complex.boundary(dim, cell) {
                    let face_value = self.vals[dim - 1].get(face).copied().ok_or(
                        PersistenceError::MalformedBoundary {
                            dim,
                            cell,
                            row: face,
                            nrows: self.vals[dim - 1].len(),
                        },
                    )?;
                    if !(face_value <= value) {
                        return Err(PersistenceError::FiltrationViolation {
                            dim,
                            cell,
                            value,
                            face,
                            face_value,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// dim 维 cell 的 filtration 顺序：order[pos] = cell 索引
    ///
    /// 按值升序，值相同时按 cell 索引（插入顺序）。
    pub fn sortperm(&self, dim: usize) -> Vec<usize> {
        let vals = self.vals(dim);
        let mut order: Vec<usize> = (0..vals.len()).collect();
        order.sort_by_key(|&i| CellKey::new(vals[i], i));
        order
    }
}

impl Filtration<SimplicialComplex> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以值 value 加入单纯形；所有 facet 必须已存在且值不大于 value
    ///
    /// 以相同的值重复加入返回已有 id；值不同则返回 `DuplicateCell`。
    pub fn add(&mut self, value: Value, simplex: &[usize]) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        if let Some(id) = self.complex.find(&s) {
            return self.check_duplicate(id, value);
        }
        for (face, _) in facets(&s) {
            let id = self.complex.find(&face).ok_or_else(|| PersistenceError::MissingFace {
                simplex: s.clone(),
                face: face.clone(),
            })?;
            self.check_face(id, value, s.len() - 1)?;
        }
        let id = self.complex.add(&s)?;
        self.push_val(id, value);
        Ok(id)
    }

    /// 以值 value 加入单纯形，缺失的 face 以相同的值递归加入
    ///
    /// 已存在的 face 的值必须不大于 value；单纯形本身已存在时规则同 `add`。
    pub fn add_recursive(&mut self, value: Value, simplex: &[usize]) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        if let Some(id) = self.complex.find(&s) {
            return self.check_duplicate(id, value);
        }
        for (face, _) in facets(&s) {
            match self.complex.find(&face) {
                Some(id) => self.check_face(id, value, s.len() - 1)?,
                None => {
                    self.add_recursive(value, &face)?;
                }
            }
        }
        let id = self.complex.add(&s)?;
        self.push_val(id, value);
        Ok(id)
    }

    /// 阈值 t 处的子复形 {cell : val ≤ t}
    pub fn sublevel_complex(&self, t: Value) -> PersistenceResult<SimplicialComplex> {
        let mut sub = SimplicialComplex::new();
        for dim in 0..=self.complex.maxdim() {
            for (cell, s) in self.complex.simplices(dim).iter().enumerate() {
                if self.vals[dim][cell] <= t {
                    sub.add(s)?;
                }
            }
        }
        Ok(sub)
    }

    fn check_duplicate(&self, id: CellId, value: Value) -> PersistenceResult<CellId> {
        let existing = self.vals[id.dim][id.index];
        if existing.total_cmp(&value).is_ne() {
            return Err(PersistenceError::DuplicateCell {
                dim: id.dim,
                cell: id.index,
                value,
                existing,
            });
        }
        Ok(id)
    }

    fn check_face(&self, face: CellId, value: Value, dim: usize) -> PersistenceResult<()> {
        let face_value = self.vals[face.dim][face.index];
        if !(face_value <= value) {
            return Err(PersistenceError::FiltrationViolation {
                dim,
                cell: self.complex.ncells(dim),
                value,
                face: face.index,
                face_value,
            });
        }
        Ok(())
    }

    fn push_val(&mut self, id: CellId, value: Value) {
        if self.vals.len() <= id.dim {
            self.vals.resize_with(id.dim + 1, Vec::new);
        }
        debug_assert_eq!(self.vals[id.dim].len(), id.index);
        self.vals[id.dim].push(value);
    }
}

// ============================================================================
// 单元测试
// ============================================================================
