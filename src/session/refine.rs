/// Conversational refinement of the corrected code.
///
/// Holds one current code value, seeded from the latest analysis. Only the
/// most recent explanation is kept.
use tracing::warn;

use super::Rejected;
use crate::model::{ModelError, RequestKind};
use crate::review::RefineResponse;

/// What a refine call needs once it has been admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineTicket {
    pub code: String,
    pub instruction: String,
    /// Which seeding of the dialogue this call belongs to.
    pub epoch: u64,
}

#[derive(Debug, Default, Clone)]
pub struct RefineState {
    current_code: Option<String>,
    explanation: Option<String>,
    instruction: String,
    pending: bool,
    last_error: Option<String>,
}

impl RefineState {
    /// Start a fresh dialogue over `code`.
    #[must_use]
    pub fn seeded(code: impl Into<String>) -> Self {
        Self {
            current_code: Some(code.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current_code(&self) -> Option<&str> {
        self.current_code.as_deref()
    }

    /// Explanation attached to the latest successful refinement.
    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// The instruction last submitted; kept after a failure for retry.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Diagnostic from the last failed refinement. Not shown to the user.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Admit a refine request, or say why not.
    pub fn begin(&mut self, instruction: &str) -> Result<RefineTicket, Rejected> {
        if self.pending {
            return Err(Rejected::Busy(RequestKind::Refine));
        }
        let Some(code) = self.current_code.clone() else {
            return Err(Rejected::NothingToRefine);
        };
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(Rejected::EmptyInstruction);
        }

        self.pending = true;
        self.instruction = instruction.to_string();
        Ok(RefineTicket {
            code,
            instruction: self.instruction.clone(),
            epoch: 0,
        })
    }

    pub fn finish(&mut self, outcome: Result<RefineResponse, ModelError>) {
        self.pending = false;
        match outcome {
            Ok(resp) => {
                self.current_code = Some(resp.new_code);
                self.explanation = Some(resp.explanation);
                self.instruction.clear();
                self.last_error = None;
            }
            Err(e) => {
                warn!("Refinement failed, keeping previous code: {e}");
                self.last_error = Some(e.to_string());
            }
        }
    }
}
