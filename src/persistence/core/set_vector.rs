/*!
 * 基于有序映射的稀疏向量
 *
 * 与 `SparseVector` 接口一致，但用 `BTreeMap` 存储非零项：
 * 单项插入/删除为 O(log n)，适合对长向量做少量修改；
 * 两个相近长度向量的 `axpy` 则不如有序数组归并快。
 * 两种表示可以互相转换。
 */

use std::collections::BTreeMap;

use super::field::Field;
use super::sparse_vector::SparseVector;

/// 有序映射形式的稀疏向量
#[derive(Clone, Debug, PartialEq)]
pub struct SetVector<F, I = usize> {
    entries: BTreeMap<I, F>,
}

impl<F, I> Default for SetVector<F, I> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<F: Field, I: Copy + Ord> SetVector<F, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从任意顺序的 (index, coefficient) 对构造，重复索引相加
    pub fn from_pairs<T>(pairs: T) -> Self
    where
        T: IntoIterator<Item = (I, F)>,
    {
        let mut v = Self::new();
        for (i, c) in pairs {
            v.add_entry(i, c);
        }
        v
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: I) -> F {
        self.entries.get(&index).copied().unwrap_or_else(F::zero)
    }

    pub fn pivot(&self) -> Option<(I, F)> {
        self.entries.iter().next_back().map(|(&i, &c)| (i, c))
    }

    /// self[index] += c，结果为零时删除该项
    pub fn add_entry(&mut self, index: I, c: F) {
        if c.is_zero() {
            return;
        }
        let v = self.get(index) + c;
        if v.is_zero() {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, v);
        }
    }

    /// self ← self + a·other
    pub fn axpy(&mut self, a: F, other: &Self) {
        if a.is_zero() {
            return;
        }
        for (&i, &c) in other.entries.iter() {
            self.add_entry(i, a * c);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, F)> + '_ {
        self.entries.iter().map(|(&i, &c)| (i, c))
    }

    pub fn to_sparse(&self) -> SparseVector<F, I> {
        SparseVector::from_pairs(self.iter())
    }
}

impl<F: Field, I: Copy + Ord> From<&SparseVector<F, I>> for SetVector<F, I> {
    fn from(v: &SparseVector<F, I>) -> Self {
        Self {
            entries: v.iter().copied().collect(),
        }
    }
}
