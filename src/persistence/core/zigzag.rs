/*!
 * Zigzag 持久同调
 *
 * # 状态
 *
 * `ZigzagReducer` 维护当前复形上的三组列：
 *
 * - **Z**：cycle 基，按出生顺序（Z 序）以 i64 键排列。反向出生（删除时出生）
 *   的 cycle 放在最前，正向出生（插入时出生）的放在最后。
 *   每个 Z 列的 low（最大的 cell 键）互不相同。
 * - **B**：Z 坐标下的边界矩阵，每列的 low（最大的 Z 键）互不相同。
 *   low 在 B 中出现的 Z 列是边界（已死亡的类）；其余是活着的同调类。
 * - **C**：与 B 一一对应的链，∂C_b = Σ B[z, b]·z。
 *
 * [Z | C] 始终是当前链空间的一组基。cell 键按插入时间单调递增，
 * 同一 cell 被重新插入时获得新键。
 *
 * # 操作
 *
 * 插入 σ：
 * 1. 把 ∂σ 写成 Z 坐标，再用 B 列消去 low
 * 2. 坐标为零 → 新 cycle 出生 `[v`，追加到 Z 末尾
 * 3. 否则 low 所在的类死亡 `v)`，坐标与链成为新的 B 列
 *
 * 删除 σ：
 * - σ 出现在某个 Z 列中：取 Z 序最小的 z_j，用它消去其他 Z 列与 C 链中的 σ，
 *   z_j 死亡 `v]` 并被删除
 * - σ 只出现在 C 链中：取 B low 最小的链 C*，用它消去其他链中的 σ；
 *   删除 C*，它的边界成为新 cycle，替换 low 所在的 Z 列，出生 `(v`，放到 Z 最前
 *
 * 每次修改 Z 后，用较早的列消去较晚的列，恢复 Z low 的唯一性。
 */

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use super::super::error::{PersistenceError, PersistenceResult};
use super::super::types::{CellId, Endpoint, Value, ZigzagBarcode, ZigzagPair};
use super::complex::CellComplex;
use super::field::Field;
use super::right_filtration::{RightFiltration, ZigzagEvent, ZigzagOp};
use super::sparse_vector::SparseVector;

/// 以 cell 键为下标的链
type Chain<F> = SparseVector<F, usize>;
/// 以 Z 键为下标的坐标
type Coords<F> = SparseVector<F, i64>;

#[derive(Clone, Debug)]
struct CycleColumn<F> {
    chain: Chain<F>,
    birth: Endpoint,
    birth_cell: CellId,
    dim: usize,
}

#[derive(Clone, Debug)]
struct BoundaryColumn<F> {
    coords: Coords<F>,
    chain: Chain<F>,
}

fn invariant(msg: impl Into<String>) -> PersistenceError {
    PersistenceError::ZigzagInvariant(msg.into())
}

fn link<I: Hash + Eq, K: Ord>(rows: &mut HashMap<I, BTreeSet<K>>, row: I, col: K) {
    rows.entry(row).or_default().insert(col);
}

fn unlink<I: Hash + Eq, K: Ord>(rows: &mut HashMap<I, BTreeSet<K>>, row: &I, col: &K) {
    if let Some(set) = rows.get_mut(row) {
        set.remove(col);
        if set.is_empty() {
            rows.remove(row);
        }
    }
}

// ============================================================================
// ZigzagReducer
// ============================================================================

/// zigzag 归约状态机
#[derive(Clone, Debug)]
pub struct ZigzagReducer<F> {
    /// 下一个 cell 键
    next_key: usize,
    /// 当前存在的 cell → cell 键
    keys: HashMap<CellId, usize>,

    z: BTreeMap<i64, CycleColumn<F>>,
    /// 最小的已用 Z 键
    z_front: i64,
    /// 下一个追加的 Z 键
    z_back: i64,
    /// cell 键 → 以它为 low 的 Z 列
    z_low: HashMap<usize, i64>,
    /// cell 键 → 包含它的 Z 列
    z_rows: HashMap<usize, BTreeSet<i64>>,

    b: HashMap<usize, BoundaryColumn<F>>,
    next_bid: usize,
    /// Z 键 → 以它为 low 的 B 列
    b_low: HashMap<i64, usize>,
    /// Z 键 → 在该行非零的 B 列
    b_rows: HashMap<i64, BTreeSet<usize>>,
    /// cell 键 → 包含它的 C 链
    c_rows: HashMap<usize, BTreeSet<usize>>,

    barcode: ZigzagBarcode,
    ops: usize,
}

impl<F: Field> ZigzagReducer<F> {
    pub fn new(maxdim: usize) -> Self {
        Self {
            next_key: 0,
            keys: HashMap::new(),
            z: BTreeMap::new(),
            z_front: 0,
            z_back: 0,
            z_low: HashMap::new(),
            z_rows: HashMap::new(),
            b: HashMap::new(),
            next_bid: 0,
            b_low: HashMap::new(),
            b_rows: HashMap::new(),
            c_rows: HashMap::new(),
            barcode: ZigzagBarcode::new(maxdim),
            ops: 0,
        }
    }

    /// 执行一个事件
    pub fn apply<C: CellComplex>(&mut self, complex: &C, event: &ZigzagEvent) -> PersistenceResult<()> {
        match event.op {
            ZigzagOp::Insert => self.insert(complex, event.cell, event.value),
            ZigzagOp::Remove => self.remove(event.cell, event.value),
        }
    }

    /// 当前 dim 维活着的同调类数量，即当前复形的 Betti 数
    pub fn live_classes(&self, dim: usize) -> usize {
        self.z
            .iter()
            .filter(|&(k, col)| col.dim == dim && !self.b_low.contains_key(k))
            .count()
    }

    /// 当前存在的 cell 数量
    pub fn ncells(&self) -> usize {
        self.keys.len()
    }

    /// 已产生的 pairs
    pub fn pairs(&self) -> &ZigzagBarcode {
        &self.barcode
    }

    /// 结束：活着的类成为无穷 bar
    pub fn finish(mut self) -> ZigzagBarcode {
        for (k, col) in &self.z {
            if self.b_low.contains_key(k) {
                continue;
            }
            self.barcode.push(ZigzagPair {
                dim: col.dim,
                birth: col.birth,
                death: Endpoint::open(Value::INFINITY),
                birth_cell: col.birth_cell,
                death_cell: None,
            });
        }
        tracing::debug!(
            ops = self.ops,
            pairs = self.barcode.total_pairs(),
            "zigzag reduction finished"
        );
        self.barcode
    }

    // ========================================================================
    // 插入
    // ========================================================================

    /// 插入 cell；它的所有 face 必须已存在
    pub fn insert<C: CellComplex>(
        &mut self,
        complex: &C,
        cell: CellId,
        value: Value,
    ) -> PersistenceResult<()> {
        if self.keys.contains_key(&cell) {
            return Err(invariant(format!("{} inserted while present", cell)));
        }
        self.ops += 1;

        let mut boundary = Vec::new();
        if cell.dim > 0 {
            for (face, c) in complex.boundary(cell.dim, cell.index) {
                let key = self
                    .keys
                    .get(&CellId::new(cell.dim - 1, face))
                    .copied()
                    .ok_or(PersistenceError::CellNotPresent {
                        dim: cell.dim - 1,
                        cell: face,
                    })?;
                boundary.push((key, F::from_i64(c)));
            }
        }

        // ∂σ 的 Z 坐标
        let mut rem: Chain<F> = SparseVector::from_pairs(boundary);
        let mut coords = Vec::new();
        while let Some((r, c)) = rem.pivot() {
            let zk = self
                .z_low
                .get(&r)
                .copied()
                .ok_or_else(|| invariant("boundary is not spanned by the cycle basis"))?;
            let z = &self.z[&zk].chain;
            let a = c.try_div(z.get(r))?;
            rem.axpy(-a, z);
            coords.push((zk, a));
        }
        let mut coords: Coords<F> = SparseVector::from_pairs(coords);

        let key = self.next_key;
        self.next_key += 1;
        self.keys.insert(cell, key);

        // 用 B 列消去坐标的 low，同时累积链
        let mut chain: Chain<F> = SparseVector::unit(key);
        while let Some((l, c)) = coords.pivot() {
            let Some(bid) = self.b_low.get(&l).copied() else {
                break;
            };
            let col = &self.b[&bid];
            let f = c.try_div(col.coords.get(l))?;
            coords.axpy(-f, &col.coords);
            chain.axpy(-f, &col.chain);
        }

        match coords.pivot() {
            None => {
                let zk = self.z_back;
                self.z_back += 1;
                self.z.insert(
                    zk,
                    CycleColumn {
                        chain,
                        birth: Endpoint::closed(value),
                        birth_cell: cell,
                        dim: cell.dim,
                    },
                );
                self.index_z_rows(zk);
                self.z_low.insert(key, zk);
                tracing::trace!(%cell, value, z = zk, "insert: birth");
            }
            Some((l, _)) => {
                let born = self
                    .z
                    .get(&l)
                    .ok_or_else(|| invariant("boundary low is not a cycle"))?;
                self.barcode.push(ZigzagPair {
                    dim: born.dim,
                    birth: born.birth,
                    death: Endpoint::open(value),
                    birth_cell: born.birth_cell,
                    death_cell: Some(cell),
                });
                let bid = self.next_bid;
                self.next_bid += 1;
                self.b.insert(bid, BoundaryColumn { coords, chain });
                self.index_b(bid);
                tracing::trace!(%cell, value, z = l, "insert: death");
            }
        }
        Ok(())
    }

    // ========================================================================
    // 删除
    // ========================================================================

    /// 删除 cell；它的所有 coface 必须已被删除
    pub fn remove(&mut self, cell: CellId, value: Value) -> PersistenceResult<()> {
        let key = self.keys.remove(&cell).ok_or(PersistenceError::CellNotPresent {
            dim: cell.dim,
            cell: cell.index,
        })?;
        self.ops += 1;

        let holders: Vec<i64> = self
            .z_rows
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        match holders.split_first() {
            Some((&j, rest)) => self.remove_from_cycle(key, cell, value, j, rest)?,
            None => self.remove_from_chain(key, cell, value)?,
        }

        if self.z_rows.contains_key(&key) || self.c_rows.contains_key(&key) {
            return Err(invariant(format!("{} still referenced after removal", cell)));
        }
        Ok(())
    }

    /// σ 在 Z 列中：Z 序最小的 z_j 死亡
    fn remove_from_cycle(
        &mut self,
        key: usize,
        cell: CellId,
        value: Value,
        j: i64,
        rest: &[i64],
    ) -> PersistenceResult<()> {
        let pivot = self.z[&j].chain.get(key);

        for &k in rest {
            let a = -(self.z[&k].chain.get(key).try_div(pivot)?);
            self.z_axpy(k, a, j)?;
        }

        let zj = self.z[&j].chain.clone();
        let holders: Vec<usize> = self
            .c_rows
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        for bid in holders {
            let f = self.b[&bid].chain.get(key).try_div(pivot)?;
            self.update_b(bid, |col| col.chain.axpy(-f, &zj));
        }

        // 边界不含 σ，所以 B 的第 j 行此时为零
        if self.b_rows.contains_key(&j) {
            return Err(invariant(format!("dying cycle {} is still a boundary term", j)));
        }

        self.unindex_z(j);
        let col = self
            .z
            .remove(&j)
            .ok_or_else(|| invariant("missing cycle column"))?;
        self.barcode.push(ZigzagPair {
            dim: col.dim,
            birth: col.birth,
            death: Endpoint::closed(value),
            birth_cell: col.birth_cell,
            death_cell: Some(cell),
        });
        tracing::trace!(%cell, value, z = j, "remove: death");

        self.restore_z_lows(rest.iter().copied().collect())
    }

    /// σ 只在 C 链中：一个边界复活为 cycle
    fn remove_from_chain(&mut self, key: usize, cell: CellId, value: Value) -> PersistenceResult<()> {
        let holders: Vec<usize> = self
            .c_rows
            .get(&key)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        let dim = cell
            .dim
            .checked_sub(1)
            .ok_or_else(|| invariant(format!("{} is in no cycle", cell)))?;

        let mut star: Option<(i64, usize)> = None;
        for &bid in &holders {
            let low = self.b[&bid]
                .coords
                .pivot()
                .map(|(l, _)| l)
                .ok_or_else(|| invariant("empty boundary column"))?;
            if star.map_or(true, |(best, _)| low < best) {
                star = Some((low, bid));
            }
        }
        let (l, star) = star.ok_or_else(|| invariant(format!("{} is in no cycle or chain", cell)))?;

        let star_col = self.b[&star].clone();
        let cs = star_col.chain.get(key);
        for &bid in holders.iter().filter(|&&b| b != star) {
            let f = self.b[&bid].chain.get(key).try_div(cs)?;
            self.update_b(bid, |col| {
                col.chain.axpy(-f, &star_col.chain);
                col.coords.axpy(-f, &star_col.coords);
            });
        }
        self.unindex_b(star);
        self.b.remove(&star);

        // 新 cycle y = Σ coords*[z]·z，替换 z_l
        let beta = star_col.coords.get(l);
        let mut y: Chain<F> = SparseVector::new();
        for &(zk, c) in star_col.coords.iter() {
            y.axpy(c, &self.z[&zk].chain);
        }
        self.unindex_z(l);
        self.z.remove(&l);

        self.z_front -= 1;
        let nk = self.z_front;
        self.z.insert(
            nk,
            CycleColumn {
                chain: y,
                birth: Endpoint::open(value),
                birth_cell: cell,
                dim,
            },
        );
        self.index_z_rows(nk);

        // z_l = (y − Σ_{z≠l} coords*[z]·z) / β
        let bids: Vec<usize> = self
            .b_rows
            .get(&l)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        for bid in bids {
            let t = self.b[&bid].coords.get(l).try_div(beta)?;
            let unit: Coords<F> = SparseVector::unit(nk);
            self.update_b(bid, |col| {
                col.coords.axpy(-t, &star_col.coords);
                col.coords.axpy(t, &unit);
            });
        }
        tracing::trace!(%cell, value, z = nk, "remove: birth");

        self.restore_z_lows(BTreeSet::from([nk]))
    }

    // ========================================================================
    // 列操作与行索引
    // ========================================================================

    /// z_target += a·z_source，同时 B[source, ·] −= a·B[target, ·] 保持 Z·B 不变
    fn z_axpy(&mut self, target: i64, a: F, source: i64) -> PersistenceResult<()> {
        debug_assert!(source < target);
        let src = self
            .z
            .get(&source)
            .map(|col| col.chain.clone())
            .ok_or_else(|| invariant("missing cycle column"))?;
        self.unindex_z(target);
        if let Some(col) = self.z.get_mut(&target) {
            col.chain.axpy(a, &src);
        }
        self.index_z_rows(target);

        let bids: Vec<usize> = self
            .b_rows
            .get(&target)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        let unit: Coords<F> = SparseVector::unit(source);
        for bid in bids {
            let bt = self.b[&bid].coords.get(target);
            self.update_b(bid, |col| col.coords.axpy(-(a * bt), &unit));
        }
        Ok(())
    }

    /// 逐个检查被修改的 Z 列：low 冲突时较晚的列减去较早的列
    fn restore_z_lows(&mut self, mut work: BTreeSet<i64>) -> PersistenceResult<()> {
        while let Some(k) = work.pop_first() {
            loop {
                let Some(col) = self.z.get(&k) else {
                    break;
                };
                let (low, lc) = col
                    .chain
                    .pivot()
                    .ok_or_else(|| invariant("cycle basis became dependent"))?;
                match self.z_low.get(&low).copied() {
                    None => {
                        self.z_low.insert(low, k);
                        break;
                    }
                    Some(e) if e == k => break,
                    Some(e) if e < k => {
                        let a = -(lc.try_div(self.z[&e].chain.get(low))?);
                        self.z_axpy(k, a, e)?;
                    }
                    Some(e) => {
                        self.z_low.insert(low, k);
                        let a = -(self.z[&e].chain.get(low).try_div(lc)?);
                        self.z_axpy(e, a, k)?;
                        work.insert(e);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn index_z_rows(&mut self, key: i64) {
        if let Some(col) = self.z.get(&key) {
            for &(r, _) in col.chain.iter() {
                link(&mut self.z_rows, r, key);
            }
        }
    }

    /// 移除 Z 列的行索引；若它拥有 low，同时释放
    fn unindex_z(&mut self, key: i64) {
        if let Some(col) = self.z.get(&key) {
            for (r, _) in col.chain.iter() {
                unlink(&mut self.z_rows, r, &key);
            }
            if let Some((low, _)) = col.chain.pivot() {
                if self.z_low.get(&low) == Some(&key) {
                    self.z_low.remove(&low);
                }
            }
        }
    }

    fn index_b(&mut self, bid: usize) {
        if let Some(col) = self.b.get(&bid) {
            for &(r, _) in col.coords.iter() {
                link(&mut self.b_rows, r, bid);
            }
            if let Some((low, _)) = col.coords.pivot() {
                let prev = self.b_low.insert(low, bid);
                debug_assert!(prev.map_or(true, |p| p == bid), "duplicate boundary low {}", low);
            }
            for &(r, _) in col.chain.iter() {
                link(&mut self.c_rows, r, bid);
            }
        }
    }

    fn unindex_b(&mut self, bid: usize) {
        if let Some(col) = self.b.get(&bid) {
            for (r, _) in col.coords.iter() {
                unlink(&mut self.b_rows, r, &bid);
            }
            if let Some((low, _)) = col.coords.pivot() {
                if self.b_low.get(&low) == Some(&bid) {
                    self.b_low.remove(&low);
                }
            }
            for (r, _) in col.chain.iter() {
                unlink(&mut self.c_rows, r, &bid);
            }
        }
    }

    fn update_b<G>(&mut self, bid: usize, update: G)
    where
        G: FnOnce(&mut BoundaryColumn<F>),
    {
        self.unindex_b(bid);
        if let Some(col) = self.b.get_mut(&bid) {
            update(col);
        }
        self.index_b(bid);
    }
}

// ============================================================================
// 入口函数
// ============================================================================

/// 计算 right filtration 的 zigzag barcode
///
/// # Arguments
///
/// * `filtration` - 已通过覆盖检查的 right filtration
///
/// # Returns
///
/// 带开闭端点的各维 zigzag pairs
#[tracing::instrument(skip_all, fields(maxdim = filtration.maxdim()))]
pub fn zigzag_barcode<F: Field, C: CellComplex>(
    filtration: &RightFiltration<C>,
) -> PersistenceResult<ZigzagBarcode> {
    let events = filtration.events();
    tracing::debug!(events = events.len(), "zigzag events");

    let mut reducer = ZigzagReducer::<F>::new(filtration.maxdim());
    for event in &events {
        reducer.apply(filtration.complex(), event)?;
    }
    Ok(reducer.finish())
}

// ============================================================================
// 单元测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::core::complex::SimplicialComplex;
    use crate::persistence::core::field::{F2, F3};
    use crate::persistence::core::filtered::barcode;
    use crate::persistence::core::filtration::Filtration;
    use crate::persistence::core::levelset::extend_zigzag_filtration;
    use crate::persistence::core::options::ReductionOptions;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn cycle(start: Value, end: Value) -> RightFiltration {
        let mut f = RightFiltration::new();
        f.add_recursive(start, end, &[0, 1]).unwrap();
        f.add_recursive(start, end, &[0, 2]).unwrap();
        f.add_recursive(start, end, &[1, 2]).unwrap();
        f
    }

    #[test]
    fn test_persistent_cycle() {
        let bc = zigzag_barcode::<F2, _>(&cycle(0.0, 10.0)).unwrap();

        let h1 = bc.nonzero(1);
        assert_eq!(h1.len(), 1);
        assert_eq!(h1[0].birth, Endpoint::closed(0.0));
        assert_eq!(h1[0].death, Endpoint::closed(10.0));
        assert_eq!(h1[0].to_string(), "1 : [0,10]");

        let h0 = bc.nonzero(0);
        assert_eq!(h0.len(), 1);
        assert_eq!(h0[0].death, Endpoint::closed(10.0));
    }

    #[test]
    fn test_blocked_cycle() {
        for bc in [
            zigzag_barcode::<F2, _>(&blocked()).unwrap(),
            zigzag_barcode::<F3, _>(&blocked()).unwrap(),
        ] {
            let h1 = bc.nonzero(1);
            assert_eq!(h1.len(), 2);
            assert_eq!(h1[0].to_string(), "1 : [0,2)");
            assert_eq!(h1[1].to_string(), "1 : (4,10]");
            assert_eq!(h1[1].death_cell.map(|c| c.dim), Some(1));
            assert!(bc.nonzero(2).is_empty());
        }
    }

    fn blocked() -> RightFiltration {
        let mut f = cycle(0.0, 10.0);
        f.add(2.0, 4.0, &[0, 1, 2]).unwrap();
        f
    }

    #[test]
    fn test_live_classes_track_betti_numbers() {
        let f = blocked();
        let events = f.events();
        let mut r = ZigzagReducer::<F3>::new(f.maxdim());

        for e in &events[..6] {
            r.apply(f.complex(), e).unwrap();
        }
        assert_eq!((r.live_classes(0), r.live_classes(1)), (1, 1));

        r.apply(f.complex(), &events[6]).unwrap();
        assert_eq!(r.live_classes(1), 0);
        assert_eq!(r.ncells(), 7);

        r.apply(f.complex(), &events[7]).unwrap();
        assert_eq!(r.live_classes(1), 1);

        for e in &events[8..] {
            r.apply(f.complex(), e).unwrap();
        }
        assert_eq!(r.ncells(), 0);
        assert_eq!(r.live_classes(0), 0);
        let bc = r.finish();
        assert!(bc.iter().all(|p| !p.is_essential()));
    }

    #[test]
    fn test_readded_edge() {
        let mut f = RightFiltration::new();
        f.add_recursive(0.0, 3.0, &[0]).unwrap();
        f.add_recursive(0.0, 3.0, &[1]).unwrap();
        f.add(0.0, 1.0, &[0, 1]).unwrap();
        f.add(2.0, 3.0, &[0, 1]).unwrap();

        let bc = zigzag_barcode::<F3, _>(&f).unwrap();
        let h0: Vec<String> = bc.nonzero(0).iter().map(|p| p.to_string()).collect();
        assert_eq!(h0, vec!["0 : [0,3]", "0 : (1,2)"]);
    }

    #[test]
    fn test_essential_bars() {
        let f = cycle(1.0, Value::INFINITY);
        let bc = zigzag_barcode::<F2, _>(&f).unwrap();
        let h1 = bc.pairs(1);
        assert_eq!(h1.len(), 1);
        assert!(h1[0].is_essential());
        assert_eq!(h1[0].to_string(), "1 : [1,inf)");
        assert_eq!(bc.pairs(0).iter().filter(|p| p.is_essential()).count(), 1);
    }

    #[test]
    fn test_levelset_circle() {
        // 方形圈上的高度函数：中间层有两个分支
        let mut c = SimplicialComplex::new();
        for e in [[0, 1], [1, 2], [2, 3], [0, 3]] {
            c.add_recursive(&e).unwrap();
        }
        let values = array![0.0, 1.0, 2.0, 1.0];
        let f = extend_zigzag_filtration(values.view(), &c, 0.6).unwrap();
        let bc = zigzag_barcode::<F3, _>(&f).unwrap();

        let h0 = bc.nonzero(0);
        assert_eq!(h0.len(), 2);
        assert_relative_eq!(h0[0].birth.value, -0.6);
        assert_relative_eq!(h0[0].death.value, 1.6);
        assert!(h0[0].birth.closed && h0[0].death.closed);
        assert_relative_eq!(h0[1].birth.value, 0.6);
        assert_relative_eq!(h0[1].death.value, 1.4);
        assert!(!h0[1].birth.closed && !h0[1].death.closed);
        assert!(bc.nonzero(1).is_empty());
    }

    /// 四面体表面，值各不相同
    fn sphere_filtration() -> Filtration {
        let mut f = Filtration::new();
        for (v, x) in [0.0, 0.0, 1.0, 2.0].into_iter().enumerate() {
            f.add(x, &[v]).unwrap();
        }
        for (e, x) in [
            ([0, 1], 1.0),
            ([0, 2], 1.0),
            ([1, 2], 3.0),
            ([0, 3], 2.0),
            ([1, 3], 2.5),
            ([2, 3], 4.0),
        ] {
            f.add(x, &e).unwrap();
        }
        for (t, x) in [
            ([0, 1, 2], 3.0),
            ([0, 1, 3], 5.0),
            ([0, 2, 3], 4.0),
            ([1, 2, 3], 6.0),
        ] {
            f.add(x, &t).unwrap();
        }
        f
    }

    #[test]
    fn test_monotone_and_right_filtration_agree() {
        let mut filled = Filtration::new();
        filled.add_recursive(0.0, &[0, 1]).unwrap();
        filled.add_recursive(0.0, &[0, 2]).unwrap();
        filled.add_recursive(1.0, &[1, 2]).unwrap();
        filled.add(2.0, &[0, 1, 2]).unwrap();

        for mono in [sphere_filtration(), filled] {
            let expected = barcode::<F3, _>(&mono, &ReductionOptions::new()).unwrap();
            let right = RightFiltration::from_filtration(&mono).unwrap();
            let zz = zigzag_barcode::<F3, _>(&right).unwrap();

            for k in 0..=mono.maxdim() {
                assert_eq!(zz.intervals(k), expected.intervals(k), "dim {}", k);
            }
            // 只有插入：出生都是闭端点，死亡都是开端点
            assert!(zz.iter().all(|p| p.birth.closed && !p.death.closed));
        }
    }

    #[test]
    fn test_remove_missing_cell() {
        let mut r = ZigzagReducer::<F2>::new(1);
        let err = r.remove(CellId::new(0, 0), 0.0).unwrap_err();
        assert!(matches!(err, PersistenceError::CellNotPresent { dim: 0, cell: 0 }));

        let mut c = SimplicialComplex::new();
        c.add_recursive(&[0, 1]).unwrap();
        let err = r.insert(&c, CellId::new(1, 0), 0.0).unwrap_err();
        assert!(matches!(err, PersistenceError::CellNotPresent { dim: 0, .. }));
    }
}
