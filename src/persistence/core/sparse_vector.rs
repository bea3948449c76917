/*!
 * 稀疏向量
 *
 * 按索引严格递增存储 (index, coefficient) 对，不存零系数。
 * 这是边界矩阵的列、以及 zigzag 中循环基/链的表示。
 *
 * # 核心操作
 *
 * - `axpy`: self ← self + a·other，一次有序归并，O(nnz(self) + nnz(other))
 * - `pivot`: 最大索引的非零项（矩阵视角下的 "low"）
 * - `from_pairs`: 排序并合并重复索引，合并为零的项被删除
 *
 * 索引类型是泛型的：矩阵列用 `usize`，zigzag 循环基坐标用 `i64`
 * （允许向基的两端插入新列）。
 */

use std::fmt;

use super::field::Field;

/// 有序稀疏向量
#[derive(Clone, PartialEq)]
pub struct SparseVector<F, I = usize> {
    /// 非零项，按索引严格递增
    entries: Vec<(I, F)>,
}

impl<F, I> Default for SparseVector<F, I> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: Field, I: Copy + Ord> SparseVector<F, I> {
    /// 零向量
    pub fn new() -> Self {
        Self::default()
    }

    /// 单位向量 e_index
    pub fn unit(index: I) -> Self {
        Self {
            entries: vec![(index, F::one())],
        }
    }

    /// 从任意顺序的 (index, coefficient) 对构造
    ///
    /// 重复索引的系数相加，结果为零的项被丢弃。
    pub fn from_pairs<T>(pairs: T) -> Self
    where
        T: IntoIterator<Item = (I, F)>,
    {
        let mut raw: Vec<(I, F)> = pairs.into_iter().collect();
        raw.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries: Vec<(I, F)> = Vec::with_capacity(raw.len());
        for (i, c) in raw {
            match entries.last_mut() {
                Some(last) if last.0 == i => last.1 = last.1 + c,
                _ => entries.push((i, c)),
            }
        }
        entries.retain(|(_, c)| !c.is_zero());
        Self { entries }
    }

    /// 非零项数量
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[(I, F)] {
        &self.entries
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &(I, F)> + '_ {
        self.entries.iter()
    }

    /// 索引 `index` 处的系数（不存在时为零）
    pub fn get(&self, index: I) -> F {
        match self.entries.binary_search_by(|e| e.0.cmp(&index)) {
            Ok(pos) => self.entries[pos].1,
            Err(_) => F::zero(),
        }
    }

    /// 最大索引的非零项
    #[inline]
    pub fn pivot(&self) -> Option<(I, F)> {
        self.entries.last().copied()
    }

    /// 最小索引的非零项
    #[inline]
    pub fn first(&self) -> Option<(I, F)> {
        self.entries.first().copied()
    }

    /// self ← self + a·other
    ///
    /// 两个有序序列的一次归并；相消的项被移除，结果仍然有序且无零项。
    pub fn axpy(&mut self, a: F, other: &Self) {
        if a.is_zero() || other.is_zero() {
            return;
        }

        let lhs = &self.entries;
        let rhs = &other.entries;
        let mut merged: Vec<(I, F)> = Vec::with_capacity(lhs.len() + rhs.len());
        let (mut p, mut q) = (0, 0);

        while p < lhs.len() && q < rhs.len() {
            let (i, x) = lhs[p];
            let (j, y) = rhs[q];
            if i < j {
                merged.push((i, x));
                p += 1;
            } else if j < i {
                merged.push((j, a * y));
                q += 1;
            } else {
                let v = x + a * y;
                if !v.is_zero() {
                    merged.push((i, v));
                }
                p += 1;
                q += 1;
            }
        }
        merged.extend_from_slice(&lhs[p..]);
        merged.extend(rhs[q..].iter().map(|&(j, y)| (j, a * y)));

        self.entries = merged;
    }

    /// self ← a·self
    pub fn scale(&mut self, a: F) {
        if a.is_zero() {
            self.entries.clear();
            return;
        }
        for e in self.entries.iter_mut() {
            e.1 = e.1 * a;
        }
    }

    /// 只保留满足谓词的索引
    pub fn retain<P>(&mut self, mut keep: P)
    where
        P: FnMut(I) -> bool,
    {
        self.entries.retain(|(i, _)| keep(*i));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<F: Field> SparseVector<F, usize> {
    /// 按 `new_index[old] = new` 重新编号
    pub fn permute(&self, new_index: &[usize]) -> Self {
        Self::from_pairs(self.entries.iter().map(|&(i, c)| (new_index[i], c)))
    }
}

impl<F: fmt::Debug, I: fmt::Debug> fmt::Debug for SparseVector<F, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (n, (i, c)) in self.entries.iter().enumerate() {
            if n > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}:{:?}", i, c)?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// 单元测试
// ============================================================================
