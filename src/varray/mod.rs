pub mod types;
pub use types::*;

use crate::error::{DiffError, Result};
use tracing::trace;

/// Slots held by the first bin. Every following bin doubles.
const FIRST_BIN: usize = 32;
const MAX_BINS: usize = 26;

/// Segmented array of lazily allocated bins.
///
/// Bin `b` holds `32 << b` slots and starts at index `32 * (2^b - 1)`, so
/// the array grows without ever moving or copying slots that are already
/// allocated. A bin is allocated the first time any of its indices is
/// touched, and starts out filled with `T::default()`.
///
/// # Examples
///
/// ```
/// use snakes::varray::{BinArray, Slots};
///
/// let mut v: BinArray<usize> = BinArray::new();
/// *v.get(1000).unwrap() = 7;
/// assert_eq!(*v.get(1000).unwrap(), 7);
/// assert_eq!(*v.get(0).unwrap(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct BinArray<T> {
    bins: Vec<Option<Box<[T]>>>,
}

impl<T> BinArray<T> {
    /// Largest index `get` accepts.
    pub const MAX_INDEX: usize = FIRST_BIN * ((1 << MAX_BINS) - 1) - 1;

    pub fn new() -> Self {
        BinArray { bins: Vec::new() }
    }

    /// Number of bins currently backed by memory.
    pub fn allocated_bins(&self) -> usize {
        self.bins.iter().filter(|b| b.is_some()).count()
    }

    /// Total number of slots currently backed by memory.
    pub fn capacity(&self) -> usize {
        self.bins.iter().flatten().map(|b| b.len()).sum()
    }
}

impl<T> Default for BinArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn bin_start(bin: usize) -> usize {
    FIRST_BIN * ((1 << bin) - 1)
}

fn bin_len(bin: usize) -> usize {
    FIRST_BIN << bin
}

/// Maps an index to its bin and the offset inside that bin.
fn locate(index: usize) -> (usize, usize) {
    let bin = (index / FIRST_BIN + 1).ilog2() as usize;
    (bin, index - bin_start(bin))
}

fn allocate<T: Copy + Default>(len: usize) -> Result<Box<[T]>> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(len)
        .map_err(|_| DiffError::OutOfMemory { requested: len })?;
    storage.resize(len, T::default());
    Ok(storage.into_boxed_slice())
}

impl<T: Copy + Default> Slots<T> for BinArray<T> {
    fn get(&mut self, index: usize) -> Result<&mut T> {
        if index > Self::MAX_INDEX {
            return Err(DiffError::OutOfRange {
                index,
                max: Self::MAX_INDEX,
            });
        }
        let (bin, offset) = locate(index);
        if self.bins.len() <= bin {
            self.bins.resize_with(bin + 1, || None);
        }
        let storage = match &mut self.bins[bin] {
            Some(storage) => storage,
            empty => {
                trace!(bin, len = bin_len(bin), "allocating bin");
                empty.insert(allocate(bin_len(bin))?)
            }
        };
        Ok(&mut storage[offset])
    }

    fn release(&mut self, from: usize) {
        for (bin, slot) in self.bins.iter_mut().enumerate() {
            let start = bin_start(bin);
            if start >= from {
                *slot = None;
            } else if let Some(storage) = slot {
                if from < start + storage.len() {
                    storage[from - start..].fill(T::default());
                }
            }
        }
        while matches!(self.bins.last(), Some(None)) {
            self.bins.pop();
        }
    }
}

/// Plain doubling vector. Simpler than `BinArray`, but growth copies.
impl<T: Copy + Default> Slots<T> for Vec<T> {
    fn get(&mut self, index: usize) -> Result<&mut T> {
        let max = BinArray::<T>::MAX_INDEX;
        if index > max {
            return Err(DiffError::OutOfRange { index, max });
        }
        if index >= self.len() {
            let additional = index + 1 - self.len();
            self.try_reserve(additional)
                .map_err(|_| DiffError::OutOfMemory {
                    requested: additional,
                })?;
            self.resize(index + 1, T::default());
        }
        Ok(&mut self[index])
    }

    fn release(&mut self, from: usize) {
        self.truncate(from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Action {
        Set(usize, u32),
        Release(usize),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (0..5000usize, any::<u32>()).prop_map(|(i, v)| Action::Set(i, v)),
            (0..5000usize).prop_map(Action::Release),
        ]
    }

    proptest! {
        #[test]
        fn test_matches_vec(
            actions in prop::collection::vec(action(), 0..50),
            reads in prop::collection::vec(0..5000usize, 0..50),
        ) {
            let mut bins: BinArray<u32> = BinArray::new();
            let mut flat: Vec<u32> = Vec::new();
            for a in &actions {
                match *a {
                    Action::Set(i, v) => {
                        *bins.get(i).unwrap() = v;
                        *Slots::get(&mut flat, i).unwrap() = v;
                    }
                    Action::Release(from) => {
                        bins.release(from);
                        Slots::release(&mut flat, from);
                    }
                }
            }
            for i in reads {
                prop_assert_eq!(*bins.get(i).unwrap(), *Slots::get(&mut flat, i).unwrap());
            }
        }
    }

    #[test]
    fn test_locate_boundaries() {
        assert_eq!(locate(0), (0, 0));
        assert_eq!(locate(31), (0, 31));
        assert_eq!(locate(32), (1, 0));
        assert_eq!(locate(95), (1, 63));
        assert_eq!(locate(96), (2, 0));
        assert_eq!(locate(223), (2, 127));
        assert_eq!(locate(224), (3, 0));
        assert_eq!(
            locate(BinArray::<u8>::MAX_INDEX),
            (MAX_BINS - 1, bin_len(MAX_BINS - 1) - 1)
        );
    }

    #[test]
    fn test_lazy_allocation() {
        let mut v: BinArray<usize> = BinArray::new();
        assert_eq!(v.allocated_bins(), 0);
        assert_eq!(*v.get(100).unwrap(), 0);
        assert_eq!(v.allocated_bins(), 1);
        assert_eq!(v.capacity(), 128);
        *v.get(5).unwrap() = 3;
        assert_eq!(v.allocated_bins(), 2);
        assert_eq!(v.capacity(), 160);
    }

    #[test]
    fn test_values_persist_across_growth() {
        let mut v: BinArray<usize> = BinArray::new();
        *v.get(7).unwrap() = 11;
        *v.get(10_000).unwrap() = 12;
        assert_eq!(*v.get(7).unwrap(), 11);
        assert_eq!(*v.get(10_000).unwrap(), 12);
    }

    #[test]
    fn test_out_of_range() {
        let mut v: BinArray<usize> = BinArray::new();
        let max = BinArray::<usize>::MAX_INDEX;
        assert_eq!(
            v.get(max + 1).unwrap_err(),
            DiffError::OutOfRange {
                index: max + 1,
                max
            }
        );
        let mut flat: Vec<usize> = Vec::new();
        assert!(matches!(
            Slots::get(&mut flat, max + 1),
            Err(DiffError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_release_frees_and_resets() {
        let mut v: BinArray<usize> = BinArray::new();
        *v.get(10).unwrap() = 1;
        *v.get(40).unwrap() = 2;
        *v.get(50).unwrap() = 3;
        *v.get(500).unwrap() = 4;
        v.release(45);
        assert_eq!(v.allocated_bins(), 2);
        assert_eq!(*v.get(10).unwrap(), 1);
        assert_eq!(*v.get(40).unwrap(), 2);
        assert_eq!(*v.get(50).unwrap(), 0);
        assert_eq!(*v.get(500).unwrap(), 0);

        v.release(0);
        assert_eq!(v.allocated_bins(), 0);
        assert_eq!(v.capacity(), 0);
    }
}
