//! Replaying edit scripts onto the sequences they were computed from.

use crate::error::{DiffError, Result};
use crate::myers::{Op, Script};

/// Walks both sequences in step with a script, checking every run lines up.
struct Cursor<'a, T> {
    left: &'a [T],
    right: &'a [T],
    old_line: usize,
    new_line: usize,
}

impl<'a, T: PartialEq> Cursor<'a, T> {
    fn new(left: &'a [T], right: &'a [T]) -> Self {
        Cursor {
            left,
            right,
            old_line: 0,
            new_line: 0,
        }
    }

    /// Advances over one run and returns the span of `right` it produces, if any.
    fn step(&mut self, op: Op, offset: usize, len: usize) -> Result<Option<&'a [T]>> {
        let expected = match op {
            Op::Insert => self.new_line,
            Op::Match | Op::Delete => self.old_line,
        };
        if offset != expected {
            return Err(DiffError::invalid_script(format!(
                "{op:?} run at {offset}, expected {expected}"
            )));
        }
        let old_end = self.old_line + if op == Op::Insert { 0 } else { len };
        let new_end = self.new_line + if op == Op::Delete { 0 } else { len };
        if old_end > self.left.len() || new_end > self.right.len() {
            return Err(DiffError::invalid_script(format!(
                "{op:?} run of {len} at {offset} runs past the end"
            )));
        }

        let produced = match op {
            Op::Match => {
                let old = &self.left[self.old_line..old_end];
                let new = &self.right[self.new_line..new_end];
                if old != new {
                    return Err(DiffError::invalid_script(format!(
                        "context mismatch in match at {offset}"
                    )));
                }
                Some(old)
            }
            Op::Insert => Some(&self.right[self.new_line..new_end]),
            Op::Delete => None,
        };
        self.old_line = old_end;
        self.new_line = new_end;
        Ok(produced)
    }

    fn finish(&self) -> Result<()> {
        if self.old_line != self.left.len() || self.new_line != self.right.len() {
            return Err(DiffError::invalid_script(format!(
                "script covers {} of {} left and {} of {} right elements",
                self.old_line,
                self.left.len(),
                self.new_line,
                self.right.len()
            )));
        }
        Ok(())
    }
}

/// Rebuilds `right` from `left` by following `script`.
///
/// `Match` runs copy from `left`, `Insert` runs copy from `right`, `Delete`
/// runs skip. The script must cover both sequences from start to end, and
/// every matched element must actually be equal on both sides.
pub fn apply<T: Clone + PartialEq>(left: &[T], right: &[T], script: &Script) -> Result<Vec<T>> {
    let mut result = Vec::with_capacity(script.right_len());
    let mut cursor = Cursor::new(left, right);
    for run in script {
        if let Some(span) = cursor.step(run.op, run.offset, run.len)? {
            result.extend_from_slice(span);
        }
    }
    cursor.finish()?;
    Ok(result)
}

/// Turns a script from `left` to `right` into one from `right` to `left`.
pub fn invert(script: &Script) -> Result<Script> {
    let mut inverted = Script::new();
    let mut new_line = 0;
    for run in script {
        match run.op {
            Op::Match => {
                inverted.push(Op::Match, new_line, run.len)?;
                new_line += run.len;
            }
            Op::Delete => inverted.push(Op::Insert, run.offset, run.len)?,
            Op::Insert => {
                inverted.push(Op::Delete, run.offset, run.len)?;
                new_line += run.len;
            }
        }
    }
    Ok(inverted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::myers::{diff, Run};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_apply_roundtrip(
            old in prop::collection::vec(".*", 0..20usize),
            new in prop::collection::vec(".*", 0..20usize),
        ) {
            let script = diff(&old, &new).unwrap();
            prop_assert_eq!(apply(&old, &new, &script), Ok(new));
        }

        #[test]
        fn test_invert_roundtrip(
            old in prop::collection::vec(0u8..3, 0..30usize),
            new in prop::collection::vec(0u8..3, 0..30usize),
        ) {
            let script = diff(&old, &new).unwrap();
            let back = invert(&script).unwrap();
            prop_assert_eq!(back.distance(), script.distance());
            prop_assert_eq!(apply(&new, &old, &back), Ok(old));
        }
    }

    fn script(runs: &[Run]) -> Script {
        let mut script = Script::new();
        for r in runs {
            script.push(r.op, r.offset, r.len).unwrap();
        }
        script
    }

    #[test]
    fn test_apply_change_in_middle() {
        let old = vec!["a", "b", "c", "d", "e"];
        let new = vec!["a", "b", "X", "d", "e"];
        let script = diff(&old, &new).unwrap();
        assert_eq!(apply(&old, &new, &script), Ok(new));
    }

    #[test]
    fn test_apply_empty() {
        let old: Vec<u8> = vec![];
        assert_eq!(apply(&old, &old, &Script::new()), Ok(vec![]));
        let new = vec![1, 2];
        let script = script(&[Run::new(Op::Insert, 0, 2)]);
        assert_eq!(apply(&old, &new, &script), Ok(new));
    }

    #[test]
    fn test_apply_context_mismatch() {
        let old = vec!["a", "b", "c"];
        let new = vec!["x", "b", "c"];
        let bad = script(&[Run::new(Op::Match, 0, 3)]);
        assert!(matches!(
            apply(&old, &new, &bad),
            Err(DiffError::InvalidScript(_))
        ));
    }

    #[test]
    fn test_apply_gap() {
        let old = vec![1, 2, 3];
        let new = vec![1, 3];
        let bad = script(&[Run::new(Op::Match, 0, 1), Run::new(Op::Match, 2, 1)]);
        assert!(matches!(
            apply(&old, &new, &bad),
            Err(DiffError::InvalidScript(_))
        ));
    }

    #[test]
    fn test_apply_incomplete() {
        let old = vec![1, 2, 3];
        let short = script(&[Run::new(Op::Match, 0, 2)]);
        assert!(matches!(
            apply(&old, &old, &short),
            Err(DiffError::InvalidScript(_))
        ));
        let long = script(&[Run::new(Op::Match, 0, 4)]);
        assert!(matches!(
            apply(&old, &old, &long),
            Err(DiffError::InvalidScript(_))
        ));
    }

    #[test]
    fn test_invert() {
        let forward = script(&[
            Run::new(Op::Match, 0, 2),
            Run::new(Op::Delete, 2, 1),
            Run::new(Op::Insert, 2, 3),
            Run::new(Op::Match, 3, 1),
        ]);
        assert_eq!(
            invert(&forward).unwrap().runs(),
            &[
                Run::new(Op::Match, 0, 2),
                Run::new(Op::Insert, 2, 1),
                Run::new(Op::Delete, 2, 3),
                Run::new(Op::Match, 5, 1),
            ]
        );
    }
}
