/// Cursor over the steps of an [`ExecutionTrace`].
///
/// Construction fails for a trace with no steps, so `current` is always a
/// valid index into `steps`.
use crate::review::{ExecutionTrace, TraceStep};

#[derive(Debug, Clone, PartialEq)]
pub struct TraceStepper {
    trace: ExecutionTrace,
    current: usize,
}

impl TraceStepper {
    /// `None` if the trace has no steps.
    #[must_use]
    pub fn new(trace: ExecutionTrace) -> Option<Self> {
        if trace.steps.is_empty() {
            return None;
        }
        Some(Self { trace, current: 0 })
    }

    #[must_use]
    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trace.steps.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trace.steps.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_step(&self) -> &TraceStep {
        &self.trace.steps[self.current]
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current == self.len() - 1
    }

    /// Advance one step. Returns false (and does nothing) on the last step.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one step. Returns false (and does nothing) on the first step.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// The final output, visible only while on the last step.
    #[must_use]
    pub fn visible_final_output(&self) -> Option<&str> {
        self.is_last().then_some(self.trace.final_output.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::VariableState;

    fn trace(n: usize) -> ExecutionTrace {
        ExecutionTrace {
            input_description: "arr = [3, 1, 2]".into(),
            steps: (1..=n)
                .map(|i| TraceStep {
                    step: i as i64,
                    line_content: format!("line {i}"),
                    variables: vec![VariableState {
                        name: "i".into(),
                        value: i.to_string(),
                    }],
                    explanation: format!("צעד {i}"),
                })
                .collect(),
            final_output: "[1, 2, 3]".into(),
        }
    }

    #[test]
    fn test_empty_trace_rejected() {
        assert!(TraceStepper::new(trace(0)).is_none());
    }

    #[test]
    fn test_three_step_scenario() {
        let mut s = TraceStepper::new(trace(3)).unwrap();
        assert_eq!(s.current_index(), 0);
        assert!(s.is_first());

        s.next();
        s.next();
        assert_eq!(s.current_index(), 2);
        assert!(s.is_last());
        assert_eq!(s.visible_final_output(), Some("[1, 2, 3]"));

        s.previous();
        assert_eq!(s.current_index(), 1);
        assert!(!s.is_last());
        assert!(!s.is_first());
        assert_eq!(s.visible_final_output(), None);

        s.reset();
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn test_bounds_are_no_ops() {
        let mut s = TraceStepper::new(trace(2)).unwrap();
        assert!(!s.previous());
        assert_eq!(s.current_index(), 0);

        assert!(s.next());
        assert!(!s.next());
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn test_single_step_is_first_and_last() {
        let mut s = TraceStepper::new(trace(1)).unwrap();
        assert!(s.is_first());
        assert!(s.is_last());
        assert!(s.visible_final_output().is_some());
        assert!(!s.next());
        assert!(!s.previous());
    }

    #[test]
    fn test_index_stays_in_range_under_any_sequence() {
        let n = 4;
        let mut s = TraceStepper::new(trace(n)).unwrap();
        // Deterministic pseudo-random walk over next/previous/reset
        let mut seed: u32 = 7;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 5 {
                0 | 1 => {
                    s.next();
                }
                2 | 3 => {
                    s.previous();
                }
                _ => s.reset(),
            }
            assert!(s.current_index() < n);
            assert_eq!(s.is_last(), s.current_index() == n - 1);
            assert_eq!(s.visible_final_output().is_some(), s.is_last());
            assert_eq!(
                s.current_step().line_content,
                format!("line {}", s.current_index() + 1)
            );
        }
    }
}
