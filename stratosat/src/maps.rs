//! Dense containers keyed by typed indices (variables, literals, clause
//! references).
//!
//! Variables are only ever created, never destroyed, so the maps are
//! append-only: a slot is pushed when its index is created and stays valid
//! from then on. Out-of-range access is a bug, not a growth trigger.

use bit_vec::BitVec;
use std::iter;
use std::marker::PhantomData;
use std::ops;

/// Types usable as dense indices.
pub trait AsIndex: Copy {
    fn as_index(self) -> usize;
    fn from_index(index: usize) -> Self;
}

/// Append-only map from a typed index to values.
#[derive(Debug, Clone)]
pub struct IntMap<K: AsIndex, V> {
    map: Vec<V>,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex, V> Default for IntMap<K, V> {
    fn default() -> Self {
        Self {
            map: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<K: AsIndex, V> IntMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Append the slot for the next index.
    pub fn push(&mut self, v: V) {
        self.map.push(v);
    }

    pub fn iter(&self) -> impl iter::Iterator<Item = (K, &V)> {
        self.map
            .iter()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }
    pub fn iter_mut(&mut self) -> impl iter::Iterator<Item = (K, &mut V)> {
        self.map
            .iter_mut()
            .enumerate()
            .map(|(k, v)| (K::from_index(k), v))
    }

    /// Raw access to the underlying dense storage.
    pub(crate) fn raw(&self) -> &[V] {
        &self.map
    }

    /// Permute the map so that `new[i] = old[new_to_old[i]]`.
    pub(crate) fn permute(&mut self, new_to_old: &[u32])
    where
        V: Clone,
    {
        debug_assert_eq!(self.map.len(), new_to_old.len());
        let old = self.map.clone();
        for (i, &o) in new_to_old.iter().enumerate() {
            self.map[i] = old[o as usize].clone();
        }
    }
}

impl<K: AsIndex, V> ops::Index<K> for IntMap<K, V> {
    type Output = V;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for IntMap<K, V> {
    #[inline]
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.map[index.as_index()]
    }
}

/// Bit map keyed by a typed index, grown in blocks.
#[derive(Debug, Clone)]
pub struct IntMapBool<K: AsIndex> {
    map: BitVec,
    _marker: PhantomData<fn(K)>, // contravariance
}

impl<K: AsIndex> Default for IntMapBool<K> {
    fn default() -> Self {
        IntMapBool::new()
    }
}

impl<K: AsIndex> ops::Index<K> for IntMapBool<K> {
    type Output = bool;
    #[inline]
    fn index(&self, index: K) -> &Self::Output {
        &self.map[index.as_index()]
    }
}

impl<K: AsIndex> IntMapBool<K> {
    pub fn new() -> Self {
        Self {
            map: BitVec::new(),
            _marker: PhantomData::default(),
        }
    }

    /// Make sure indices `0..n` are addressable; new bits are false.
    pub fn grow_to(&mut self, n: usize) {
        let len = self.map.len();
        if n > len {
            self.map.grow(n - len, false);
        }
    }

    #[inline]
    pub fn has(&self, k: K) -> bool {
        k.as_index() < self.map.len()
    }

    #[inline]
    pub fn set(&mut self, k: K, b: bool) {
        self.map.set(k.as_index(), b);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    struct K(u32);
    impl AsIndex for K {
        fn as_index(self) -> usize {
            self.0 as usize
        }
        fn from_index(index: usize) -> Self {
            K(index as u32)
        }
    }

    #[test]
    fn test_push_and_permute() {
        let mut m: IntMap<K, u32> = IntMap::new();
        for i in 0..4 {
            m.push(i * 10);
        }
        assert_eq!(m[K(2)], 20);
        m.permute(&[3, 2, 1, 0]);
        assert_eq!(m[K(0)], 30);
        assert_eq!(m[K(3)], 0);
    }

    #[test]
    fn test_bitmap_grow() {
        let mut b: IntMapBool<K> = IntMapBool::new();
        b.grow_to(10);
        assert!(!b[K(7)]);
        b.set(K(7), true);
        assert!(b[K(7)]);
        assert!(b.has(K(9)) && !b.has(K(10)));
    }
}
