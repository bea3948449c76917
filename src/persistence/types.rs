/*!
 * 核心数据类型定义
 *
 * # 核心类型
 *
 * - `Value`: filtration 值（浮点数）
 * - `CellId`: (维度, 维内索引) 形式的 cell 标识
 * - `CellKey`: 排序键（filtration 值, 插入序号）
 * - `PersistencePair` / `Barcode`: 单调 filtration 的输出
 * - `ZigzagPair` / `ZigzagBarcode`: right filtration 的输出（带开闭端点）
 */

use std::fmt;

use ndarray::Array2;

// ============================================================================
// 基础类型别名
// ============================================================================

/// filtration 值类型
///
/// 使用 f64：right filtration 的区间端点来自用户采样的标量函数，
/// 相等性比较（零长度 bar）对精度敏感。
pub type Value = f64;

/// cell 标识：维度 + 该维度内的索引
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub dim: usize,
    pub index: usize,
}

impl CellId {
    #[inline]
    pub fn new(dim: usize, index: usize) -> Self {
        Self { dim, index }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-cell {}", self.dim, self.index)
    }
}

// ============================================================================
// CellKey - filtration 排序键
// ============================================================================

/// 同一维度内 cell 的排序键
///
/// 先按 filtration 值排序，值相同则按插入序号（cell 索引）排序。
/// 这个 tie-break 保证了相同输入总是得到相同的列顺序。
#[derive(Clone, Copy, Debug)]
pub struct CellKey {
    pub value: Value,
    pub index: usize,
}

impl CellKey {
    #[inline]
    pub fn new(value: Value, index: usize) -> Self {
        Self { value, index }
    }
}

impl PartialEq for CellKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellKey {}

impl PartialOrd for CellKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // total_cmp: NaN 排在最后，不会破坏排序
        self.value
            .total_cmp(&other.value)
            .then(self.index.cmp(&other.index))
    }
}

// ============================================================================
// PersistencePair / Barcode
// ============================================================================

/// 持久性对（birth-death pair）
///
/// `death_ind == None` 表示无穷 bar（本质类），此时 `death` 为 `Value::INFINITY`。
/// 无穷 bar 不会与任何合法的 filtration 值混淆。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PersistencePair {
    /// 同调维度
    pub dim: usize,
    /// birth 值
    pub birth: Value,
    /// death 值（无穷 bar 为 INFINITY）
    pub death: Value,
    /// 产生该类的 cell（原始索引）
    pub birth_ind: usize,
    /// 消灭该类的 (dim+1)-cell（原始索引）
    pub death_ind: Option<usize>,
}

impl PersistencePair {
    /// 有限 pair
    pub fn finite(dim: usize, birth: Value, death: Value, birth_ind: usize, death_ind: usize) -> Self {
        Self {
            dim,
            birth,
            death,
            birth_ind,
            death_ind: Some(death_ind),
        }
    }

    /// 无穷 pair
    pub fn essential(dim: usize, birth: Value, birth_ind: usize) -> Self {
        Self {
            dim,
            birth,
            death: Value::INFINITY,
            birth_ind,
            death_ind: None,
        }
    }

    #[inline]
    pub fn is_essential(&self) -> bool {
        self.death_ind.is_none()
    }

    /// bar 长度（无穷 bar 返回 INFINITY）
    #[inline]
    pub fn length(&self) -> Value {
        self.death - self.birth
    }
}

impl fmt::Display for PersistencePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.death_ind {
            Some(d) => write!(
                f,
                "{} : ({},{}) <{},{}>",
                self.dim, self.birth, self.death, self.birth_ind, d
            ),
            None => write!(
                f,
                "{} : ({},inf) <{},inf>",
                self.dim, self.birth, self.birth_ind
            ),
        }
    }
}

/// 各维度的持久性对集合
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Barcode {
    pairs: Vec<Vec<PersistencePair>>,
}

impl Barcode {
    /// 创建空 barcode（预分配 0..=maxdim）
    pub fn new(maxdim: usize) -> Self {
        Self {
            pairs: vec![Vec::new(); maxdim + 1],
        }
    }

    pub fn from_pairs(pairs: Vec<Vec<PersistencePair>>) -> Self {
        Self { pairs }
    }

    /// 添加 pair（维度越界时自动扩展）
    pub fn push(&mut self, pair: PersistencePair) {
        if pair.dim >= self.pairs.len() {
            self.pairs.resize(pair.dim + 1, Vec::new());
        }
        self.pairs[pair.dim].push(pair);
    }

    /// 记录的最高维度
    pub fn maxdim(&self) -> usize {
        self.pairs.len().saturating_sub(1)
    }

    /// 指定维度的 pairs（越界返回空切片）
    pub fn pairs(&self, dim: usize) -> &[PersistencePair] {
        self.pairs.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersistencePair> {
        self.pairs.iter().flatten()
    }

    pub fn total_pairs(&self) -> usize {
        self.pairs.iter().map(Vec::len).sum()
    }

    /// 长度大于零的 pairs
    pub fn nonzero(&self, dim: usize) -> Vec<PersistencePair> {
        self.pairs(dim)
            .iter()
            .filter(|p| p.length() > 0.0)
            .copied()
            .collect()
    }

    pub fn essential_count(&self, dim: usize) -> usize {
        self.pairs(dim).iter().filter(|p| p.is_essential()).count()
    }

    /// 阈值 t 处的 Betti 数：birth ≤ t < death 的 pair 数量
    pub fn betti_at(&self, dim: usize, t: Value) -> usize {
        self.pairs(dim)
            .iter()
            .filter(|p| p.birth <= t && t < p.death)
            .count()
    }

    /// 有限 bar 长度之和
    pub fn total_persistence(&self, dim: usize) -> Value {
        self.pairs(dim)
            .iter()
            .filter(|p| !p.is_essential())
            .map(|p| p.length())
            .sum()
    }

    /// 排序后的 (birth, death) 列表，用于比较两个 barcode 的值是否一致
    pub fn intervals(&self, dim: usize) -> Vec<(Value, Value)> {
        let mut out: Vec<(Value, Value)> =
            self.pairs(dim).iter().map(|p| (p.birth, p.death)).collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        out
    }

    /// 转为 Nx2 数组 [[birth, death], ...]
    pub fn to_array(&self, dim: usize) -> Array2<Value> {
        let pairs = self.pairs(dim);
        Array2::from_shape_fn((pairs.len(), 2), |(i, j)| {
            if j == 0 {
                pairs[i].birth
            } else {
                pairs[i].death
            }
        })
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Barcode {{")?;
        for (dim, pairs) in self.pairs.iter().enumerate() {
            writeln!(f, "  H{}: {} pairs", dim, pairs.len())?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// ZigzagPair / ZigzagBarcode
// ============================================================================

/// zigzag 区间端点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
    pub value: Value,
    /// 闭端点（包含该值）
    pub closed: bool,
}

impl Endpoint {
    #[inline]
    pub fn closed(value: Value) -> Self {
        Self { value, closed: true }
    }

    #[inline]
    pub fn open(value: Value) -> Self {
        Self { value, closed: false }
    }
}

/// zigzag 持久性对
///
/// 插入时出生为闭端点 `[`，删除时出生为开端点 `(`；
/// 插入时死亡为开端点 `)`，删除时死亡为闭端点 `]`。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZigzagPair {
    pub dim: usize,
    pub birth: Endpoint,
    pub death: Endpoint,
    /// 出生时被插入或删除的 cell
    pub birth_cell: CellId,
    /// 死亡时被插入或删除的 cell（无穷 bar 为 None）
    pub death_cell: Option<CellId>,
}

impl ZigzagPair {
    #[inline]
    pub fn is_essential(&self) -> bool {
        self.death_cell.is_none()
    }

    #[inline]
    pub fn length(&self) -> Value {
        self.death.value - self.birth.value
    }
}

impl fmt::Display for ZigzagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.birth.closed { '[' } else { '(' };
        let close = if self.death.closed { ']' } else { ')' };
        if self.is_essential() {
            write!(f, "{} : {}{},inf)", self.dim, open, self.birth.value)
        } else {
            write!(
                f,
                "{} : {}{},{}{}",
                self.dim, open, self.birth.value, self.death.value, close
            )
        }
    }
}

/// 各维度的 zigzag pairs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZigzagBarcode {
    pairs: Vec<Vec<ZigzagPair>>,
}

impl ZigzagBarcode {
    pub fn new(maxdim: usize) -> Self {
        Self {
            pairs: vec![Vec::new(); maxdim + 1],
        }
    }

    pub fn push(&mut self, pair: ZigzagPair) {
        if pair.dim >= self.pairs.len() {
            self.pairs.resize(pair.dim + 1, Vec::new());
        }
        self.pairs[pair.dim].push(pair);
    }

    pub fn maxdim(&self) -> usize {
        self.pairs.len().saturating_sub(1)
    }

    pub fn pairs(&self, dim: usize) -> &[ZigzagPair] {
        self.pairs.get(dim).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZigzagPair> {
        self.pairs.iter().flatten()
    }

    pub fn total_pairs(&self) -> usize {
        self.pairs.iter().map(Vec::len).sum()
    }

    /// 长度大于零的 pairs，按 birth 排序
    pub fn nonzero(&self, dim: usize) -> Vec<ZigzagPair> {
        let mut out: Vec<ZigzagPair> = self
            .pairs(dim)
            .iter()
            .filter(|p| p.length() > 0.0)
            .copied()
            .collect();
        out.sort_by(|a, b| {
            a.birth
                .value
                .total_cmp(&b.birth.value)
                .then(a.death.value.total_cmp(&b.death.value))
        });
        out
    }

    /// 排序后的 (birth, death) 值列表（忽略开闭）
    pub fn intervals(&self, dim: usize) -> Vec<(Value, Value)> {
        let mut out: Vec<(Value, Value)> = self
            .pairs(dim)
            .iter()
            .map(|p| (p.birth.value, p.death.value))
            .collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        out
    }

    pub fn to_array(&self, dim: usize) -> Array2<Value> {
        let pairs = self.pairs(dim);
        Array2::from_shape_fn((pairs.len(), 2), |(i, j)| {
            if j == 0 {
                pairs[i].birth.value
            } else {
                pairs[i].death.value
            }
        })
    }
}

impl fmt::Display for ZigzagBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ZigzagBarcode {{")?;
        for (dim, pairs) in self.pairs.iter().enumerate() {
            writeln!(f, "  H{}: {} pairs", dim, pairs.len())?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// 单元测试
// ============================================================================
