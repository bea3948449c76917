/*!
 * Right filtration（区间 filtration）
 *
 * 每个 cell 带有若干互不相交的闭区间 `[start, end]`，cell 在区间内存在。
 * `end` 可以为 `INFINITY`。filtration 条件：cell 的每个区间都包含在
 * 每个 face 的某一个区间内，即任意时刻存在的 cell 构成子复形。
 *
 * # 事件序列
 *
 * 区间展开为插入/删除操作：在 `start` 插入，在 `end` 之后删除。
 * 排序规则：
 * 1. 按值升序
 * 2. 同值时插入先于删除
 * 3. 插入按 (维度, 索引) 升序；删除按 (维度, 索引) 降序
 *
 * 规则 2-3 保证每个操作前后都是子复形。
 *
 * # 使用示例
 *
 * ```ignore
 * let mut f = RightFiltration::new();
 * f.add_recursive(0.0, 10.0, &[0, 1])?;
 * f.add_recursive(0.0, 10.0, &[1, 2])?;
 * f.add_recursive(0.0, 10.0, &[0, 2])?;
 * f.add(2.0, 4.0, &[0, 1, 2])?;
 * ```
 */

use std::cmp::Ordering;
use std::fmt;

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::{CellId, Value};
use super::complex::{canonical_simplex, facets, CellComplex, SimplicialComplex};
use super::filtration::Filtration;

// ============================================================================
// Interval
// ============================================================================

/// 闭区间 [start, end]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub start: Value,
    pub end: Value,
}

impl Interval {
    /// 要求 start ≤ end、start 有限，end 可为 INFINITY
    pub fn new(start: Value, end: Value) -> PersistenceResult<Self> {
        if !start.is_finite() || end.is_nan() || start > end {
            return Err(PersistenceError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// [start, ∞]
    pub fn from_start(start: Value) -> PersistenceResult<Self> {
        Self::new(start, Value::INFINITY)
    }

    #[inline]
    pub fn contains(&self, t: Value) -> bool {
        self.start <= t && t <= self.end
    }

    /// other ⊆ self
    #[inline]
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// 两个闭区间有公共点
    #[inline]
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn length(&self) -> Value {
        self.end - self.start
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// 把区间并入有序不交的区间集合，相交的区间合并
fn merge_interval(set: &mut Vec<Interval>, interval: Interval) {
    let mut merged = interval;
    set.retain(|iv| {
        if iv.intersects(&merged) {
            merged.start = merged.start.min(iv.start);
            merged.end = merged.end.max(iv.end);
            false
        } else {
            true
        }
    });
    let pos = set.partition_point(|iv| iv.start < merged.start);
    set.insert(pos, merged);
}

/// 排序并合并任意区间列表
fn normalize(intervals: Vec<Interval>) -> Vec<Interval> {
    let mut out = Vec::with_capacity(intervals.len());
    for iv in intervals {
        merge_interval(&mut out, iv);
    }
    out
}

// ============================================================================
// 事件
// ============================================================================

/// 基本操作类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZigzagOp {
    Insert,
    Remove,
}

/// 一个 zigzag 事件：在 value 处插入或删除 cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZigzagEvent {
    pub value: Value,
    pub op: ZigzagOp,
    pub cell: CellId,
}

impl ZigzagEvent {
    fn order(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value).then_with(|| match (self.op, other.op) {
            (ZigzagOp::Insert, ZigzagOp::Remove) => Ordering::Less,
            (ZigzagOp::Remove, ZigzagOp::Insert) => Ordering::Greater,
            (ZigzagOp::Insert, ZigzagOp::Insert) => (self.cell.dim, self.cell.index)
                .cmp(&(other.cell.dim, other.cell.index)),
            (ZigzagOp::Remove, ZigzagOp::Remove) => (other.cell.dim, other.cell.index)
                .cmp(&(self.cell.dim, self.cell.index)),
        })
    }
}

// ============================================================================
// RightFiltration
// ============================================================================

/// 区间 filtration：复形 + 每个 cell 的有序不交闭区间集合
#[derive(Clone, Debug, Default)]
pub struct RightFiltration<C = SimplicialComplex> {
    complex: C,
    /// intervals[dim][cell]
    intervals: Vec<Vec<Vec<Interval>>>,
}

impl<C: CellComplex> RightFiltration<C> {
    /// 从复形和区间构造；每个 cell 的区间先排序合并，再检查 filtration 条件
    pub fn from_intervals(complex: C, intervals: Vec<Vec<Vec<Interval>>>) -> PersistenceResult<Self> {
        let intervals = intervals
            .into_iter()
            .map(|cells| cells.into_iter().map(normalize).collect())
            .collect();
        let f = Self { complex, intervals };
        f.validate()?;
        Ok(f)
    }

    pub fn complex(&self) -> &C {
        &self.complex
    }

    pub fn maxdim(&self) -> usize {
        self.complex.maxdim()
    }

    pub fn ncells(&self, dim: usize) -> usize {
        self.complex.ncells(dim)
    }

    /// cell 的区间（不存在的 cell 返回空切片）
    pub fn intervals(&self, cell: CellId) -> &[Interval] {
        self.intervals
            .get(cell.dim)
            .and_then(|v| v.get(cell.index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// cell 在时刻 t 是否存在
    pub fn is_present(&self, cell: CellId, t: Value) -> bool {
        self.intervals(cell).iter().any(|iv| iv.contains(t))
    }

    /// 检查区间数量、边界的 face 索引与覆盖条件
    pub fn validate(&self) -> PersistenceResult<()> {
        for dim in 0..=self.complex.maxdim() {
            let expected = self.complex.ncells(dim);
            let actual = self.intervals.get(dim).map_or(0, Vec::len);
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
                let faces = self.complex.boundary(dim, cell);
                let nrows = self.intervals[dim - 1].len();
                if let Some(&(face, _)) = faces.iter().find(|&&(face, _)| face >= nrows) {
                    return Err(PersistenceError::MalformedBoundary {
                        dim,
                        cell,
                        row: face,
                        nrows,
                    });
                }
                for iv in &self.intervals[dim][cell] {
                    for &(face, _) in &faces {
                        let covered = self.intervals[dim - 1][face].iter().any(|f| f.covers(iv));
                        if !covered {
                            return Err(PersistenceError::IntervalNotCovered {
                                dim,
                                cell,
                                start: iv.start,
                                end: iv.end,
                                face,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// 展开为排序后的插入/删除事件
    ///
    /// `end == INFINITY` 的区间没有删除事件。
    pub fn events(&self) -> Vec<ZigzagEvent> {
        let mut events = Vec::new();
        for (dim, cells) in self.intervals.iter().enumerate() {
            for (index, ivs) in cells.iter().enumerate() {
                let cell = CellId::new(dim, index);
                for iv in ivs {
                    events.push(ZigzagEvent {
                        value: iv.start,
                        op: ZigzagOp::Insert,
                        cell,
                    });
                    if iv.end.is_finite() {
                        events.push(ZigzagEvent {
                            value: iv.end,
                            op: ZigzagOp::Remove,
                            cell,
                        });
                    }
                }
            }
        }
        events.sort_by(|a, b| a.order(b));
        events
    }
}

impl<C: CellComplex + Clone> RightFiltration<C> {
    /// 单调 filtration 视为 right filtration：每个 cell 的区间为 [val, ∞]
    pub fn from_filtration(filtration: &Filtration<C>) -> PersistenceResult<Self> {
        let intervals = (0..=filtration.maxdim())
            .map(|dim| {
                filtration
                    .vals(dim)
                    .iter()
                    .map(|&v| Interval::from_start(v).map(|iv| vec![iv]))
                    .collect::<PersistenceResult<Vec<_>>>()
            })
            .collect::<PersistenceResult<Vec<_>>>()?;
        Self::from_intervals(filtration.complex().clone(), intervals)
    }
}

impl RightFiltration<SimplicialComplex> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在区间 [start, end] 加入单纯形
    ///
    /// 每个 facet 必须已存在且有一个区间覆盖 [start, end]。
    /// 单纯形已存在时，区间并入它的区间集合。
    pub fn add(&mut self, start: Value, end: Value, simplex: &[usize]) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        let iv = Interval::new(start, end)?;
        let dim = s.len() - 1;
        for (face, _) in facets(&s) {
            let id = self.complex.find(&face).ok_or_else(|| PersistenceError::MissingFace {
                simplex: s.clone(),
                face: face.clone(),
            })?;
            if !self.intervals(id).iter().any(|f| f.covers(&iv)) {
                return Err(PersistenceError::IntervalNotCovered {
                    dim,
                    cell: self.complex.find(&s).map_or(self.complex.ncells(dim), |c| c.index),
                    start,
                    end,
                    face: id.index,
                });
            }
        }
        let id = match self.complex.find(&s) {
            Some(id) => id,
            None => self.complex.add(&s)?,
        };
        self.merge(id, iv);
        Ok(id)
    }

    /// 在区间 [start, end] 加入单纯形；缺失的 face 以相同区间加入，
    /// 已存在的 face 的区间集合被扩展以覆盖 [start, end]
    pub fn add_recursive(
        &mut self,
        start: Value,
        end: Value,
        simplex: &[usize],
    ) -> PersistenceResult<CellId> {
        let s = canonical_simplex(simplex)?;
        let iv = Interval::new(start, end)?;
        for (face, _) in facets(&s) {
            self.add_recursive(start, end, &face)?;
        }
        let id = match self.complex.find(&s) {
            Some(id) => id,
            None => self.complex.add(&s)?,
        };
        self.merge(id, iv);
        Ok(id)
    }

    fn merge(&mut self, id: CellId, iv: Interval) {
        if self.intervals.len() <= id.dim {
            self.intervals.resize_with(id.dim + 1, Vec::new);
        }
        let cells = &mut self.intervals[id.dim];
        if cells.len() <= id.index {
            cells.resize_with(id.index + 1, Vec::new);
        }
        merge_interval(&mut cells[id.index], iv);
    }
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked_cycle() -> RightFiltration {
        let mut f = RightFiltration::new();
        f.add_recursive(0.0, 10.0, &[0, 1]).unwrap();
        f.add_recursive(0.0, 10.0, &[0, 2]).unwrap();
        f.add_recursive(0.0, 10.0, &[1, 2]).unwrap();
        f.add(2.0, 4.0, &[0, 1, 2]).unwrap();
        f
    }

    #[test]
    fn test_interval_new() {
        assert!(Interval::new(1.0, 0.0).is_err());
        assert!(Interval::new(f64::NAN, 1.0).is_err());
        assert!(Interval::new(f64::INFINITY, f64::INFINITY).is_err());
        let iv = Interval::new(0.0, f64::INFINITY).unwrap();
        assert!(iv.contains(1e300));
        assert!(Interval::new(2.0, 2.0).unwrap().contains(2.0));
    }

    #[test]
    fn test_merge_intervals() {
        let mut set = Vec::new();
        merge_interval(&mut set, Interval::new(5.0, 6.0).unwrap());
        merge_interval(&mut set, Interval::new(0.0, 1.0).unwrap());
        merge_interval(&mut set, Interval::new(3.0, 4.0).unwrap());
        assert_eq!(set.len(), 3);
        assert_eq!(set[0].start, 0.0);

        // 闭区间在端点相接也合并
        merge_interval(&mut set, Interval::new(1.0, 3.0).unwrap());
        assert_eq!(set, vec![Interval::new(0.0, 4.0).unwrap(), Interval::new(5.0, 6.0).unwrap()]);
    }

    #[test]
    fn test_add_requires_cover() {
        let mut f = RightFiltration::new();
        f.add_recursive(0.0, 5.0, &[0, 1]).unwrap();
        f.add_recursive(0.0, 5.0, &[1, 2]).unwrap();
        f.add_recursive(1.0, 3.0, &[0, 2]).unwrap();

        let err = f.add(0.0, 4.0, &[0, 1, 2]).unwrap_err();
        assert!(matches!(err, PersistenceError::IntervalNotCovered { dim: 2, .. }));
        assert!(f.add(1.0, 2.0, &[0, 1, 2]).is_ok());

        let err = f.add(0.0, 1.0, &[3, 4]).unwrap_err();
        assert!(matches!(err, PersistenceError::MissingFace { .. }));
    }

    #[test]
    fn test_add_recursive_extends_faces() {
        let mut f = RightFiltration::new();
        f.add_recursive(0.0, 1.0, &[0, 1]).unwrap();
        f.add_recursive(3.0, 4.0, &[0, 1]).unwrap();
        let e = f.complex().find(&[0, 1]).unwrap();
        assert_eq!(f.intervals(e).len(), 2);
        let v = f.complex().find(&[0]).unwrap();
        assert_eq!(f.intervals(v).len(), 2);

        f.add_recursive(0.5, 3.5, &[0, 1]).unwrap();
        assert_eq!(f.intervals(e), &[Interval::new(0.0, 4.0).unwrap()]);
        assert!(f.is_present(e, 2.0));
        assert!(!f.is_present(e, 4.5));
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_from_intervals_detects_uncovered() {
        let mut c = SimplicialComplex::new();
        c.add_recursive(&[0, 1]).unwrap();
        let iv = |a, b| Interval::new(a, b).unwrap();
        // 边跨过了顶点 1 的两个区间之间的空隙
        let intervals = vec![
            vec![vec![iv(0.0, 10.0)], vec![iv(0.0, 2.0), iv(3.0, 10.0)]],
            vec![vec![iv(1.0, 4.0)]],
        ];
        let err = RightFiltration::from_intervals(c.clone(), intervals).unwrap_err();
        assert!(matches!(err, PersistenceError::IntervalNotCovered { dim: 1, cell: 0, face: 1, .. }));

        let intervals = vec![
            vec![vec![iv(0.0, 10.0)], vec![iv(0.0, 2.0), iv(3.0, 10.0)]],
            vec![vec![iv(0.0, 1.0), iv(3.5, 4.0)]],
        ];
        assert!(RightFiltration::from_intervals(c, intervals).is_ok());
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
    fn test_from_intervals_detects_dangling_face() {
        let iv = |a, b| Interval::new(a, b).unwrap();
        let intervals = vec![vec![vec![iv(0.0, 10.0)], vec![iv(0.0, 10.0)]], vec![vec![iv(1.0, 2.0)]]];
        let err = RightFiltration::from_intervals(DanglingFace, intervals).unwrap_err();
        assert_eq!(
            err,
            PersistenceError::MalformedBoundary {
                dim: 1,
                cell: 0,
                row: 5,
                nrows: 2,
            }
        );

        // 没有区间的 cell 也要检查边界
        let intervals = vec![vec![vec![iv(0.0, 10.0)], vec![]], vec![vec![]]];
        assert!(matches!(
            RightFiltration::from_intervals(DanglingFace, intervals),
            Err(PersistenceError::MalformedBoundary { row: 5, .. })
        ));
    }

    #[test]
    fn test_events_order() {
        let f = blocked_cycle();
        let events = f.events();
        // 3 个顶点 + 3 条边插入，三角形插入与删除
        assert_eq!(events.len(), 3 + 3 + 2 + 3 + 3);

        let tri = f.complex().find(&[0, 1, 2]).unwrap();
        assert_eq!(events[6], ZigzagEvent { value: 2.0, op: ZigzagOp::Insert, cell: tri });
        assert_eq!(events[7], ZigzagEvent { value: 4.0, op: ZigzagOp::Remove, cell: tri });

        // 同值插入按维度升序
        let dims: Vec<usize> = events[..6].iter().map(|e| e.cell.dim).collect();
        assert_eq!(dims, vec![0, 0, 0, 1, 1, 1]);
        // 同值删除按维度降序、索引降序
        let removed: Vec<(usize, usize)> =
            events[8..].iter().map(|e| (e.cell.dim, e.cell.index)).collect();
        assert_eq!(removed, vec![(1, 2), (1, 1), (1, 0), (0, 2), (0, 1), (0, 0)]);
    }

    #[test]
    fn test_insert_before_remove_at_same_value() {
        let mut f = RightFiltration::new();
        f.add_recursive(0.0, 1.0, &[0]).unwrap();
        f.add_recursive(1.0, 2.0, &[1]).unwrap();
        let events = f.events();
        assert_eq!(events[1].op, ZigzagOp::Insert);
        assert_eq!(events[1].cell, CellId::new(0, 1));
        assert_eq!(events[2].op, ZigzagOp::Remove);
        assert_eq!(events[2].cell, CellId::new(0, 0));
    }

    #[test]
    fn test_from_filtration() {
        let mut mono = Filtration::new();
        mono.add_recursive(0.0, &[0, 1]).unwrap();
        mono.add_recursive(1.0, &[1, 2]).unwrap();
        let f = RightFiltration::from_filtration(&mono).unwrap();
        let events = f.events();
        assert!(events.iter().all(|e| e.op == ZigzagOp::Insert));
        assert_eq!(events.len(), 5);
        assert_eq!(f.intervals(CellId::new(1, 1)), &[Interval::from_start(1.0).unwrap()]);
    }
}
