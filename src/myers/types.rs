use crate::error::{DiffError, Result};

/// Kind of an edit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Match,
    Delete,
    Insert,
}

/// A run of `len` consecutive operations of the same kind.
///
/// `offset` indexes the left sequence for `Match` and `Delete`, and the
/// right sequence for `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub op: Op,
    pub offset: usize,
    pub len: usize,
}

impl Run {
    pub fn new(op: Op, offset: usize, len: usize) -> Self {
        Run { op, offset, len }
    }
}

/// Ordered edit script. Adjacent runs never share an `Op`.
///
/// # Examples
///
/// ```
/// use snakes::myers::{Op, Run, Script};
///
/// let mut script = Script::new();
/// script.push(Op::Match, 0, 2).unwrap();
/// script.push(Op::Match, 2, 3).unwrap();
/// script.push(Op::Insert, 0, 1).unwrap();
/// assert_eq!(script.runs(), &[Run::new(Op::Match, 0, 5), Run::new(Op::Insert, 0, 1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    runs: Vec<Run>,
}

impl Script {
    pub fn new() -> Self {
        Script { runs: Vec::new() }
    }

    /// Appends a run, extending the last one instead when it has the same `op`
    /// and ends where the new run starts. Empty runs are ignored.
    pub fn push(&mut self, op: Op, offset: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        if let Some(last) = self.runs.last_mut() {
            if last.op == op && last.offset + last.len == offset {
                last.len += len;
                return Ok(());
            }
        }
        self.runs
            .try_reserve(1)
            .map_err(|_| DiffError::OutOfMemory { requested: 1 })?;
        self.runs.push(Run { op, offset, len });
        Ok(())
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Run> {
        self.runs.iter()
    }

    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Number of inserted plus deleted elements.
    pub fn distance(&self) -> usize {
        self.total(|op| op != Op::Match)
    }

    /// Number of left elements covered by `Match` and `Delete` runs.
    pub fn left_len(&self) -> usize {
        self.total(|op| op != Op::Insert)
    }

    /// Number of right elements covered by `Match` and `Insert` runs.
    pub fn right_len(&self) -> usize {
        self.total(|op| op != Op::Delete)
    }

    fn total(&self, counted: impl Fn(Op) -> bool) -> usize {
        self.runs
            .iter()
            .filter(|r| counted(r.op))
            .map(|r| r.len)
            .sum()
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.iter()
    }
}

impl IntoIterator for Script {
    type Item = Run;
    type IntoIter = std::vec::IntoIter<Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.runs.into_iter()
    }
}

impl From<Script> for Vec<Run> {
    fn from(script: Script) -> Self {
        script.runs
    }
}

/// Tuning for a diff. The only knob is the cost cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Give up once the edit distance is known to reach this value.
    /// `None` searches until the script is found.
    pub max_cost: Option<usize>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unbounded() -> Self {
        Options { max_cost: None }
    }

    pub fn with_max_cost(max_cost: usize) -> Self {
        Options {
            max_cost: Some(max_cost),
        }
    }
}
