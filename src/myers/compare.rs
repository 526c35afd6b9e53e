//! Element access for the diff engine.
//!
//! The engine never looks at elements itself. It only asks whether left
//! element `i` equals right element `j`, both absolute indices into the
//! caller's sequences.

use crate::error::{DiffError, Result};

/// Equality between an element of the left sequence and one of the right.
pub trait Equality {
    fn equal(&self, left: usize, right: usize) -> bool;

    /// Lengths of the left and right sequences, when known. Ranges handed to
    /// the engine are checked against them.
    fn lens(&self) -> Option<(usize, usize)> {
        None
    }
}

/// Raw byte comparison.
#[derive(Debug, Clone, Copy)]
pub struct Raw<'a> {
    pub left: &'a [u8],
    pub right: &'a [u8],
}

impl<'a> Raw<'a> {
    pub fn new(left: &'a [u8], right: &'a [u8]) -> Self {
        Raw { left, right }
    }
}

impl Equality for Raw<'_> {
    #[inline]
    fn equal(&self, left: usize, right: usize) -> bool {
        self.left[left] == self.right[right]
    }

    fn lens(&self) -> Option<(usize, usize)> {
        Some((self.left.len(), self.right.len()))
    }
}

/// Element-wise comparison of two slices through `PartialEq`.
#[derive(Debug, Clone, Copy)]
pub struct Elements<'a, T> {
    pub left: &'a [T],
    pub right: &'a [T],
}

impl<'a, T: PartialEq> Elements<'a, T> {
    pub fn new(left: &'a [T], right: &'a [T]) -> Self {
        Elements { left, right }
    }
}

impl<T: PartialEq> Equality for Elements<'_, T> {
    #[inline]
    fn equal(&self, left: usize, right: usize) -> bool {
        self.left[left] == self.right[right]
    }

    fn lens(&self) -> Option<(usize, usize)> {
        Some((self.left.len(), self.right.len()))
    }
}

/// Caller-defined elements: `indexer` resolves an offset in a sequence to an
/// element, `comparator` decides whether two elements are equal.
///
/// Any state the callbacks need is captured by the closures.
///
/// # Examples
///
/// ```
/// use snakes::myers::{Callbacks, Equality};
///
/// let left = ["a", "b", "c"];
/// let right = ["a", "B", "c"];
/// let eq = Callbacks::new(
///     &left[..],
///     &right[..],
///     |s: &[&str], i: usize| s[i].to_ascii_lowercase(),
///     |a: &String, b: &String| a == b,
/// );
/// assert!(eq.equal(1, 1));
/// ```
pub struct Callbacks<'a, S: ?Sized, I, C> {
    left: &'a S,
    right: &'a S,
    indexer: I,
    comparator: C,
}

impl<'a, S, E, I, C> Callbacks<'a, S, I, C>
where
    S: ?Sized,
    I: Fn(&'a S, usize) -> E,
    C: Fn(&E, &E) -> bool,
{
    pub fn new(left: &'a S, right: &'a S, indexer: I, comparator: C) -> Self {
        Callbacks {
            left,
            right,
            indexer,
            comparator,
        }
    }

    /// Builds callbacks from optional parts. Both present gives
    /// `Some(callbacks)`, both absent gives `None` (compare raw bytes
    /// instead), and anything else is rejected.
    pub fn from_parts(
        left: &'a S,
        right: &'a S,
        indexer: Option<I>,
        comparator: Option<C>,
    ) -> Result<Option<Self>> {
        match (indexer, comparator) {
            (Some(indexer), Some(comparator)) => {
                Ok(Some(Self::new(left, right, indexer, comparator)))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(DiffError::InvalidArgument(
                "indexer supplied without a comparator",
            )),
            (None, Some(_)) => Err(DiffError::InvalidArgument(
                "comparator supplied without an indexer",
            )),
        }
    }
}

impl<'a, S, E, I, C> Equality for Callbacks<'a, S, I, C>
where
    S: ?Sized,
    I: Fn(&'a S, usize) -> E,
    C: Fn(&E, &E) -> bool,
{
    fn equal(&self, left: usize, right: usize) -> bool {
        let a = (self.indexer)(self.left, left);
        let b = (self.indexer)(self.right, right);
        (self.comparator)(&a, &b)
    }
}

/// Length of the common run starting at `left` and `right`, bounded by the range ends.
pub(crate) fn common_prefix<Q: Equality + ?Sized>(
    eq: &Q,
    left: usize,
    left_end: usize,
    right: usize,
    right_end: usize,
) -> usize {
    let limit = (left_end - left).min(right_end - right);
    (0..limit)
        .find(|&i| !eq.equal(left + i, right + i))
        .unwrap_or(limit)
}

/// Length of the common run ending just before `left_end` and `right_end`.
pub(crate) fn common_suffix<Q: Equality + ?Sized>(
    eq: &Q,
    left: usize,
    left_end: usize,
    right: usize,
    right_end: usize,
) -> usize {
    let limit = (left_end - left).min(right_end - right);
    (0..limit)
        .find(|&i| !eq.equal(left_end - i - 1, right_end - i - 1))
        .unwrap_or(limit)
}
