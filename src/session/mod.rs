//! Per-session UI state.
//!
//! Each concern owns its own container: analysis, trace and refine. The
//! [`Session`] composes them and applies the cross-cutting rules (mutual
//! exclusion of analyze and trace, a new analysis discarding the trace).
//! Every transition is synchronous; the model call happens between a
//! `begin_*` and the matching `finish_*`.

pub mod refine;
pub mod stepper;
pub mod workbench;

pub use refine::{RefineState, RefineTicket};
pub use stepper::TraceStepper;
pub use workbench::Workbench;

use thiserror::Error;
use tracing::info;

use crate::editor::CodeBuffer;
use crate::model::{ModelError, RequestKind};
use crate::review::{AnalysisResult, ExecutionTrace, RefineResponse};

/// Why an action was not dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("there is no code to send")]
    EmptyCode,

    #[error("a {0} request is already in progress")]
    Busy(RequestKind),

    #[error("run an analysis first; there is no corrected code to refine")]
    NothingToRefine,

    #[error("the refine instruction is empty")]
    EmptyInstruction,

    #[error("no trace is open")]
    NoTrace,
}

/// Lifecycle of one request kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success(T),
    /// User-facing, localized message.
    Error(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, RequestState::Idle)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            RequestState::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Settle a pending request.
    pub fn settle(&mut self, kind: RequestKind, outcome: Result<T, ModelError>) {
        *self = match outcome {
            Ok(data) => RequestState::Success(data),
            Err(e) => RequestState::Error(e.user_message(kind)),
        };
    }
}

pub type AnalysisState = RequestState<AnalysisResult>;
pub type TraceState = RequestState<TraceStepper>;

/// Everything one user sees: code buffer plus the three state containers.
#[derive(Debug, Default)]
pub struct Session {
    pub editor: CodeBuffer,
    analysis: AnalysisState,
    trace: TraceState,
    refine: RefineState,
    refine_epoch: u64,
    /// A refine call is on the wire, whichever dialogue it belongs to.
    refine_outstanding: bool,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    #[must_use]
    pub fn trace(&self) -> &TraceState {
        &self.trace
    }

    #[must_use]
    pub fn refine(&self) -> &RefineState {
        &self.refine
    }

    /// Stepper of the open trace, for navigation.
    pub fn stepper_mut(&mut self) -> Result<&mut TraceStepper, Rejected> {
        self.trace.data_mut().ok_or(Rejected::NoTrace)
    }

    /// The error to show, analysis first.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.analysis.error().or_else(|| self.trace.error())
    }

    fn check_dispatchable(&self) -> Result<String, Rejected> {
        if let Some(kind) = self.pending_kind() {
            return Err(Rejected::Busy(kind));
        }
        if self.editor.is_blank() {
            return Err(Rejected::EmptyCode);
        }
        Ok(self.editor.text().to_string())
    }

    fn pending_kind(&self) -> Option<RequestKind> {
        if self.analysis.is_loading() {
            Some(RequestKind::Analyze)
        } else if self.trace.is_loading() {
            Some(RequestKind::Trace)
        } else {
            None
        }
    }

    /// Admit an analyze request. Clears the trace and refine dialogue first.
    /// Returns the code to send.
    pub fn begin_analyze(&mut self) -> Result<String, Rejected> {
        let code = self.check_dispatchable()?;
        self.trace = RequestState::Idle;
        self.refine = RefineState::default();
        self.refine_epoch += 1;
        self.analysis = RequestState::Loading;
        info!("Analysis started ({} bytes)", code.len());
        Ok(code)
    }

    pub fn finish_analyze(&mut self, outcome: Result<AnalysisResult, ModelError>) {
        if let Ok(result) = &outcome {
            self.refine = RefineState::seeded(result.corrected_code.clone());
        }
        self.analysis.settle(RequestKind::Analyze, outcome);
    }

    /// Admit a trace request. Returns the code to send.
    pub fn begin_trace(&mut self) -> Result<String, Rejected> {
        let code = self.check_dispatchable()?;
        self.trace = RequestState::Loading;
        info!("Trace started ({} bytes)", code.len());
        Ok(code)
    }

    pub fn finish_trace(&mut self, outcome: Result<ExecutionTrace, ModelError>) {
        let outcome = outcome.and_then(|trace| {
            TraceStepper::new(trace)
                .ok_or_else(|| ModelError::MalformedResponse("trace has no steps".into()))
        });
        self.trace.settle(RequestKind::Trace, outcome);
    }

    /// Close the trace view.
    pub fn close_trace(&mut self) -> Result<(), Rejected> {
        if self.trace.is_loading() {
            return Err(Rejected::Busy(RequestKind::Trace));
        }
        self.trace = RequestState::Idle;
        Ok(())
    }

    /// Admit a refine request. Only one refine call is in flight at a time,
    /// even across a new analysis.
    pub fn begin_refine(&mut self, instruction: &str) -> Result<RefineTicket, Rejected> {
        if self.refine_outstanding {
            return Err(Rejected::Busy(RequestKind::Refine));
        }
        let mut ticket = self.refine.begin(instruction)?;
        ticket.epoch = self.refine_epoch;
        self.refine_outstanding = true;
        Ok(ticket)
    }

    /// Settle a refine call. Replies for a dialogue that a newer analysis
    /// has replaced are dropped.
    pub fn finish_refine(&mut self, epoch: u64, outcome: Result<RefineResponse, ModelError>) {
        self.refine_outstanding = false;
        if epoch != self.refine_epoch {
            info!("Dropping refinement for a superseded analysis");
            return;
        }
        self.refine.finish(outcome);
    }

    /// Reset code and every result. Refused while a request is pending.
    pub fn clear(&mut self) -> Result<(), Rejected> {
        if let Some(kind) = self.pending_kind() {
            return Err(Rejected::Busy(kind));
        }
        if self.refine_outstanding {
            return Err(Rejected::Busy(RequestKind::Refine));
        }
        // The epoch keeps counting so no earlier ticket can match again
        let epoch = self.refine_epoch;
        *self = Self::default();
        self.refine_epoch = epoch + 1;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::TraceStep;
    use crate::review::RefineResponse;

    fn analysis(code: &str) -> AnalysisResult {
        AnalysisResult {
            summary: "סיכום".into(),
            language: "C".into(),
            bugs: vec![],
            improvements: vec![],
            time_complexity: "O(1)".into(),
            space_complexity: "O(1)".into(),
            corrected_code: code.into(),
        }
    }

    fn trace() -> ExecutionTrace {
        ExecutionTrace {
            input_description: "-".into(),
            steps: vec![TraceStep {
                step: 1,
                line_content: "x = 1".into(),
                variables: vec![],
                explanation: "השמה".into(),
            }],
            final_output: "1".into(),
        }
    }

    fn session_with_code() -> Session {
        let mut s = Session::new();
        s.editor.set_text("x = 1");
        s
    }

    #[test]
    fn test_blank_code_rejected() {
        let mut s = Session::new();
        s.editor.set_text("   ");
        assert_eq!(s.begin_analyze(), Err(Rejected::EmptyCode));
        assert_eq!(s.begin_trace(), Err(Rejected::EmptyCode));
        assert!(s.analysis().is_idle());
    }

    #[test]
    fn test_analyze_clears_existing_trace_before_dispatch() {
        let mut s = session_with_code();
        s.begin_trace().unwrap();
        s.finish_trace(Ok(trace()));
        assert!(s.trace().data().is_some());

        s.begin_analyze().unwrap();
        assert!(s.trace().is_idle());
        assert!(s.analysis().is_loading());
    }

    #[test]
    fn test_trace_keeps_analysis() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("y = 2")));
        s.begin_trace().unwrap();
        assert!(s.analysis().data().is_some());
    }

    #[test]
    fn test_mutual_exclusion() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        assert_eq!(s.begin_trace(), Err(Rejected::Busy(RequestKind::Analyze)));
        assert_eq!(s.begin_analyze(), Err(Rejected::Busy(RequestKind::Analyze)));
        s.finish_analyze(Ok(analysis("y")));

        s.begin_trace().unwrap();
        assert_eq!(s.begin_analyze(), Err(Rejected::Busy(RequestKind::Trace)));
        assert!(s.analysis().data().is_some(), "rejected analyze must not touch state");
    }

    #[test]
    fn test_failed_analysis_has_message_and_no_data() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("y")));

        s.begin_analyze().unwrap();
        assert!(s.analysis().data().is_none(), "stale data cleared on dispatch");
        s.finish_analyze(Err(ModelError::EmptyResponse));

        let msg = s.analysis().error().unwrap();
        assert!(!msg.is_empty());
        assert!(s.analysis().data().is_none());
        assert_eq!(s.error_message(), Some(msg));
    }

    #[test]
    fn test_analysis_seeds_refine() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("fixed()")));
        assert_eq!(s.refine().current_code(), Some("fixed()"));

        let ticket = s.begin_refine("comment it").unwrap();
        s.finish_refine(ticket.epoch, Ok(RefineResponse {
            new_code: "// c\nfixed()".into(),
            explanation: "הוספתי הערה".into(),
        }));
        assert_eq!(s.refine().current_code(), Some("// c\nfixed()"));

        // A new analysis discards the dialogue until it succeeds
        s.begin_analyze().unwrap();
        assert_eq!(s.refine().current_code(), None);
        assert_eq!(s.begin_refine("x"), Err(Rejected::NothingToRefine));
    }

    #[test]
    fn test_refine_reply_after_new_analysis_is_dropped() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("first()")));
        let ticket = s.begin_refine("rename").unwrap();

        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("second()")));
        s.finish_refine(ticket.epoch, Ok(RefineResponse {
            new_code: "stale()".into(),
            explanation: "-".into(),
        }));
        assert_eq!(s.refine().current_code(), Some("second()"));
        assert!(s.refine().explanation().is_none());
    }

    #[test]
    fn test_reply_from_before_clear_is_dropped() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("old_fixed()")));
        let old = s.begin_refine("rename").unwrap();
        s.finish_refine(old.epoch, Ok(RefineResponse {
            new_code: "old_fixed_renamed()".into(),
            explanation: "-".into(),
        }));

        s.clear().unwrap();
        s.editor.set_text("y = 2");
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("new_fixed()")));

        // A duplicate of the old reply must not land in the new dialogue
        s.finish_refine(old.epoch, Ok(RefineResponse {
            new_code: "old_fixed_renamed()".into(),
            explanation: "-".into(),
        }));
        assert_eq!(s.refine().current_code(), Some("new_fixed()"));
    }

    #[test]
    fn test_clear_refused_while_superseded_refine_outstanding() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("old_fixed()")));
        let stale = s.begin_refine("rename").unwrap();

        s.begin_analyze().unwrap();
        s.finish_analyze(Err(ModelError::EmptyResponse));
        assert_eq!(s.clear(), Err(Rejected::Busy(RequestKind::Refine)));

        s.finish_refine(stale.epoch, Ok(RefineResponse {
            new_code: "old_fixed_renamed()".into(),
            explanation: "-".into(),
        }));
        assert_eq!(s.refine().current_code(), None);
        s.clear().unwrap();
    }

    #[test]
    fn test_refine_single_flight_across_new_analysis() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("first()")));
        let first = s.begin_refine("one").unwrap();

        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("second()")));
        assert_eq!(s.begin_refine("two"), Err(Rejected::Busy(RequestKind::Refine)));

        // The superseded reply frees the slot without touching the new dialogue
        s.finish_refine(first.epoch, Err(ModelError::Transport("HTTP 500".into())));
        assert!(s.refine().last_error().is_none());
        assert_eq!(s.refine().current_code(), Some("second()"));
        assert!(s.begin_refine("two").is_ok());
    }

    #[test]
    fn test_refine_independent_of_trace() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        s.finish_analyze(Ok(analysis("fixed()")));
        s.begin_trace().unwrap();
        assert!(s.begin_refine("rename").is_ok());
    }

    #[test]
    fn test_empty_trace_becomes_error() {
        let mut s = session_with_code();
        s.begin_trace().unwrap();
        let mut t = trace();
        t.steps.clear();
        s.finish_trace(Ok(t));
        assert_eq!(s.trace().error(), Some(RequestKind::Trace.failure_message()));
    }

    #[test]
    fn test_close_trace_and_navigation() {
        let mut s = session_with_code();
        assert_eq!(s.stepper_mut().err(), Some(Rejected::NoTrace));
        s.begin_trace().unwrap();
        assert_eq!(s.close_trace(), Err(Rejected::Busy(RequestKind::Trace)));
        s.finish_trace(Ok(trace()));
        assert!(s.stepper_mut().is_ok());
        s.close_trace().unwrap();
        assert!(s.trace().is_idle());
    }

    #[test]
    fn test_clear() {
        let mut s = session_with_code();
        s.begin_analyze().unwrap();
        assert!(s.clear().is_err());
        s.finish_analyze(Err(ModelError::Transport("down".into())));
        s.clear().unwrap();
        assert!(s.editor.is_blank());
        assert!(s.analysis().is_idle());
        assert_eq!(s.error_message(), None);
    }
}
