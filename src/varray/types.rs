use crate::error::Result;

/// Index-addressed scratch storage with lazily created, default-filled slots.
///
/// The diff engine keeps its frontier bookkeeping in a `Slots<usize>`.
/// References returned by `get` are never held across another `get`, so
/// implementations are free to move storage when they grow.
pub trait Slots<T> {
    /// Returns the slot at `index`, allocating its backing storage on first touch.
    fn get(&mut self, index: usize) -> Result<&mut T>;

    /// Discards storage at or beyond `from`. Every index `>= from` reads as
    /// the default value afterwards.
    fn release(&mut self, from: usize);
}
