//! Myers' O(ND) diff with linear-space middle-snake bisection.
//!
//! Forward and reverse searches expand one edit layer at a time until their
//! frontiers overlap. The overlapping snake splits the problem in two, each
//! half is solved recursively, and the runs come out in document order.

pub mod compare;
pub mod types;
pub use compare::{Callbacks, Elements, Equality, Raw};
pub use types::*;

use crate::error::{DiffError, Result};
use crate::varray::{BinArray, Slots};
use compare::{common_prefix, common_suffix};
use std::ops::Range;
use tracing::{debug, trace, warn};

const FORWARD: usize = 0;
const REVERSE: usize = 1;

/// Packs diagonal `k` and a search direction into one scratch index.
fn slot(k: isize, direction: usize) -> usize {
    let zigzag = if k >= 0 {
        (k as usize) * 2
    } else {
        k.unsigned_abs() * 2 - 1
    };
    zigzag * 2 + direction
}

/// Diagonal matched run shared by an optimal path, in absolute indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snake {
    x: usize,
    y: usize,
    u: usize,
    v: usize,
    cost: usize,
}

enum Meet {
    Snake(Snake),
    Cutoff(usize),
}

/// State of one top-level diff.
struct Search<'a, Q: ?Sized, S> {
    eq: &'a Q,
    v: &'a mut S,
    out: Option<&'a mut Script>,
    max_cost: Option<usize>,
}

impl<Q: Equality + ?Sized, S: Slots<usize>> Search<'_, Q, S> {
    fn get(&mut self, k: isize, direction: usize) -> Result<usize> {
        Ok(*self.v.get(slot(k, direction))?)
    }

    fn set(&mut self, k: isize, direction: usize, x: usize) -> Result<()> {
        *self.v.get(slot(k, direction))? = x;
        Ok(())
    }

    /// Furthest `x` on diagonal `k` at layer `d`, before following its snake.
    fn start(&mut self, k: isize, d: isize, direction: usize) -> Result<usize> {
        if k == -d || (k != d && self.get(k - 1, direction)? < self.get(k + 1, direction)?) {
            self.get(k + 1, direction)
        } else {
            Ok(self.get(k - 1, direction)? + 1)
        }
    }

    fn emit(&mut self, op: Op, offset: usize, len: usize) -> Result<()> {
        match self.out.as_deref_mut() {
            Some(out) => out.push(op, offset, len),
            None => Ok(()),
        }
    }

    /// The cutoff, if `cost` goes past it.
    fn over(&self, cost: usize) -> Option<usize> {
        self.max_cost.filter(|&max| cost > max)
    }

    fn solve(&mut self, left: Range<usize>, right: Range<usize>) -> Result<usize> {
        let (n, m) = (left.len(), right.len());
        if n == 0 || m == 0 {
            if let Some(max) = self.over(n + m) {
                return Ok(max);
            }
            self.emit(Op::Insert, right.start, m)?;
            self.emit(Op::Delete, left.start, n)?;
            return Ok(n + m);
        }

        let snake = match self.middle_snake(left.clone(), right.clone())? {
            Meet::Snake(snake) => snake,
            Meet::Cutoff(max) => return Ok(max),
        };
        if let Some(max) = self.over(snake.cost) {
            return Ok(max);
        }
        if self.out.is_none() {
            return Ok(snake.cost);
        }

        match snake.cost {
            0 => self.emit(Op::Match, left.start, n)?,
            1 => self.one_edit(left, right)?,
            _ => {
                trace!(
                    x = snake.x,
                    y = snake.y,
                    u = snake.u,
                    v = snake.v,
                    cost = snake.cost,
                    "splitting at middle snake"
                );
                self.solve(left.start..snake.x, right.start..snake.y)?;
                self.emit(Op::Match, snake.x, snake.u - snake.x)?;
                self.solve(snake.u..left.end, snake.v..right.end)?;
            }
        }
        Ok(snake.cost)
    }

    /// Ranges one insertion or deletion apart. The extra element sits right
    /// after the common prefix, possibly at either end.
    fn one_edit(&mut self, left: Range<usize>, right: Range<usize>) -> Result<()> {
        let (n, m) = (left.len(), right.len());
        let p = common_prefix(self.eq, left.start, left.end, right.start, right.end);
        self.emit(Op::Match, left.start, p)?;
        if n == m + 1 {
            self.emit(Op::Delete, left.start + p, 1)?;
            self.emit(Op::Match, left.start + p + 1, n - p - 1)
        } else if m == n + 1 {
            self.emit(Op::Insert, right.start + p, 1)?;
            self.emit(Op::Match, left.start + p, n - p)
        } else {
            Err(self.fault(n, m))
        }
    }

    fn middle_snake(&mut self, left: Range<usize>, right: Range<usize>) -> Result<Meet> {
        let (n, m) = (left.len(), right.len());
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        let layers = ((n + m + 1) / 2) as isize;

        self.set(1, FORWARD, 0)?;
        self.set(1, REVERSE, 0)?;

        for d in 0..=layers {
            if d > 0 {
                if let Some(max) = self.over(2 * d as usize - 1) {
                    return Ok(Meet::Cutoff(max));
                }
            }

            for k in (-d..=d).step_by(2) {
                let mut x = self.start(k, d, FORWARD)?;
                let (x0, y0) = (x, x as isize - k);
                if x < n && y0 >= 0 && (y0 as usize) < m {
                    x += common_prefix(
                        self.eq,
                        left.start + x,
                        left.end,
                        right.start + y0 as usize,
                        right.end,
                    );
                }
                self.set(k, FORWARD, x)?;

                // reverse diagonal delta - k was last extended on layer d - 1
                if odd && (k - delta).abs() < d && x + self.get(delta - k, REVERSE)? >= n {
                    let y = x as isize - k;
                    let cost = 2 * d as usize - 1;
                    return self.snake(&left, &right, (x0 as isize, y0), (x as isize, y), cost);
                }
            }

            for k in (-d..=d).step_by(2) {
                let mut x = self.start(k, d, REVERSE)?;
                let (x0, y0) = (x, x as isize - k);
                if x < n && y0 >= 0 && (y0 as usize) < m {
                    x += common_suffix(
                        self.eq,
                        left.start,
                        left.end - x,
                        right.start,
                        right.end - y0 as usize,
                    );
                }
                self.set(k, REVERSE, x)?;

                if !odd && (k - delta).abs() <= d && x + self.get(delta - k, FORWARD)? >= n {
                    let (n, m) = (n as isize, m as isize);
                    let y = x as isize - k;
                    let from = (n - x as isize, m - y);
                    let to = (n - x0 as isize, m - y0);
                    return self.snake(&left, &right, from, to, 2 * d as usize);
                }
            }
        }

        Err(self.fault(n, m))
    }

    /// Converts relative snake endpoints to absolute ones, checking they lie in the box.
    fn snake(
        &self,
        left: &Range<usize>,
        right: &Range<usize>,
        (x, y): (isize, isize),
        (u, v): (isize, isize),
        cost: usize,
    ) -> Result<Meet> {
        let (n, m) = (left.len() as isize, right.len() as isize);
        let inside = 0 <= x && x <= u && u <= n && 0 <= y && y <= v && v <= m && u - x == v - y;
        if !inside {
            return Err(self.fault(left.len(), right.len()));
        }
        Ok(Meet::Snake(Snake {
            x: left.start + x as usize,
            y: right.start + y as usize,
            u: left.start + u as usize,
            v: right.start + v as usize,
            cost,
        }))
    }

    fn fault(&self, left: usize, right: usize) -> DiffError {
        warn!(left, right, "frontiers did not meet");
        DiffError::AlgorithmFault { left, right }
    }
}

/// Reusable diff driver. Holds the cost cutoff and the frontier scratch
/// storage, so repeated diffs can share one allocation.
///
/// A `Differ` is not meant to be shared between threads; give each thread its own.
#[derive(Debug, Clone)]
pub struct Differ<S = BinArray<usize>> {
    options: Options,
    scratch: S,
}

impl Differ<BinArray<usize>> {
    pub fn new(options: Options) -> Self {
        Differ {
            options,
            scratch: BinArray::new(),
        }
    }
}

impl Default for Differ<BinArray<usize>> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl<S: Slots<usize>> Differ<S> {
    pub fn with_scratch(options: Options, scratch: S) -> Self {
        Differ { options, scratch }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Frees the scratch storage grown by earlier diffs.
    pub fn release(&mut self) {
        self.scratch.release(0);
    }

    pub fn into_scratch(self) -> S {
        self.scratch
    }

    /// Computes the edit distance between `left` and `right`, appending the
    /// coalesced edit script to `out` when one is given.
    ///
    /// When the distance goes past `max_cost`, `max_cost` is returned and
    /// nothing beyond the common prefix is written to `out`. Ranges must not
    /// run backwards, nor past the sequences when `eq` knows their lengths.
    pub fn compute<Q: Equality + ?Sized>(
        &mut self,
        eq: &Q,
        left: Range<usize>,
        right: Range<usize>,
        mut out: Option<&mut Script>,
    ) -> Result<usize> {
        if left.start > left.end || right.start > right.end {
            return Err(DiffError::InvalidArgument("range start is past its end"));
        }
        if let Some((left_len, right_len)) = eq.lens() {
            if left.end > left_len || right.end > right_len {
                return Err(DiffError::InvalidArgument("range exceeds sequence length"));
            }
        }
        let prefix = common_prefix(eq, left.start, left.end, right.start, right.end);
        if let Some(out) = out.as_deref_mut() {
            out.push(Op::Match, left.start, prefix)?;
        }

        let max_cost = self.options.max_cost;
        let mut search = Search {
            eq,
            v: &mut self.scratch,
            out,
            max_cost,
        };
        let cost = search.solve(
            left.start + prefix..left.end,
            right.start + prefix..right.end,
        )?;

        if max_cost == Some(cost) {
            debug!(cost, "cost cutoff reached");
        }
        debug!(
            left = left.len(),
            right = right.len(),
            prefix,
            cost,
            "diff computed"
        );
        Ok(cost)
    }

    pub fn diff_bytes(
        &mut self,
        left: &[u8],
        right: &[u8],
        out: Option<&mut Script>,
    ) -> Result<usize> {
        self.compute(&Raw::new(left, right), 0..left.len(), 0..right.len(), out)
    }

    pub fn diff_slices<T: PartialEq>(
        &mut self,
        left: &[T],
        right: &[T],
        out: Option<&mut Script>,
    ) -> Result<usize> {
        self.compute(
            &Elements::new(left, right),
            0..left.len(),
            0..right.len(),
            out,
        )
    }

    /// Diffs ranges of two sequences of any shape. `indexer` resolves an
    /// offset to an element and `comparator` decides equality.
    #[allow(clippy::too_many_arguments)]
    pub fn diff_with<'a, T, E, I, C>(
        &mut self,
        left: &'a T,
        left_range: Range<usize>,
        right: &'a T,
        right_range: Range<usize>,
        indexer: I,
        comparator: C,
        out: Option<&mut Script>,
    ) -> Result<usize>
    where
        T: ?Sized,
        I: Fn(&'a T, usize) -> E,
        C: Fn(&E, &E) -> bool,
    {
        let callbacks = Callbacks::new(left, right, indexer, comparator);
        self.compute(&callbacks, left_range, right_range, out)
    }

    /// Diffs ranges of two byte-backed sequences.
    ///
    /// With both `indexer` and `comparator`, elements are whatever `indexer`
    /// returns for an offset. With neither, the sequences are compared byte
    /// by byte. Passing only one of them is an `InvalidArgument`.
    #[allow(clippy::too_many_arguments)]
    pub fn diff_by<'a, T, E, I, C>(
        &mut self,
        left: &'a T,
        left_range: Range<usize>,
        right: &'a T,
        right_range: Range<usize>,
        indexer: Option<I>,
        comparator: Option<C>,
        out: Option<&mut Script>,
    ) -> Result<usize>
    where
        T: AsRef<[u8]> + ?Sized,
        I: Fn(&'a T, usize) -> E,
        C: Fn(&E, &E) -> bool,
    {
        match Callbacks::from_parts(left, right, indexer, comparator)? {
            Some(callbacks) => self.compute(&callbacks, left_range, right_range, out),
            None => {
                let raw = Raw::new(left.as_ref(), right.as_ref());
                self.compute(&raw, left_range, right_range, out)
            }
        }
    }
}

/// One-shot diff over byte-backed sequences with fresh scratch storage.
/// See [`Differ::diff_by`].
#[allow(clippy::too_many_arguments)]
pub fn compute<'a, T, E, I, C>(
    left: &'a T,
    left_range: Range<usize>,
    right: &'a T,
    right_range: Range<usize>,
    indexer: Option<I>,
    comparator: Option<C>,
    options: Options,
    out: Option<&mut Script>,
) -> Result<usize>
where
    T: AsRef<[u8]> + ?Sized,
    I: Fn(&'a T, usize) -> E,
    C: Fn(&E, &E) -> bool,
{
    let mut differ = Differ::new(options);
    differ.diff_by(
        left,
        left_range,
        right,
        right_range,
        indexer,
        comparator,
        out,
    )
}

/// One-shot diff through caller callbacks, for sequences that are not bytes.
/// See [`Differ::diff_with`].
#[allow(clippy::too_many_arguments)]
pub fn compute_with<'a, T, E, I, C>(
    left: &'a T,
    left_range: Range<usize>,
    right: &'a T,
    right_range: Range<usize>,
    indexer: I,
    comparator: C,
    options: Options,
    out: Option<&mut Script>,
) -> Result<usize>
where
    T: ?Sized,
    I: Fn(&'a T, usize) -> E,
    C: Fn(&E, &E) -> bool,
{
    let mut differ = Differ::new(options);
    differ.diff_with(
        left,
        left_range,
        right,
        right_range,
        indexer,
        comparator,
        out,
    )
}

/// Computes the edit script between two sequences.
///
/// # Examples
///
/// ```
/// use snakes::myers::{diff, Op, Run};
///
/// let old = vec![1, 2, 3];
/// let new = vec![1, 3, 4];
/// let script = diff(&old, &new).unwrap();
/// assert_eq!(script.runs(), &[
///     Run::new(Op::Match, 0, 1),
///     Run::new(Op::Delete, 1, 1),
///     Run::new(Op::Match, 2, 1),
///     Run::new(Op::Insert, 2, 1),
/// ]);
/// ```
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> Result<Script> {
    let mut script = Script::new();
    let mut differ = Differ::new(Options::default());
    differ.diff_slices(old, new, Some(&mut script))?;
    Ok(script)
}

/// Edit distance only. Cheaper than [`diff`], no script is built.
pub fn distance<T: PartialEq>(old: &[T], new: &[T]) -> Result<usize> {
    Differ::new(Options::default()).diff_slices(old, new, None)
}

/// Splits both strings on newlines and diffs the lines.
pub fn diff_lines(old: &str, new: &str) -> Result<Script> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    diff(&old_lines, &new_lines)
}
