/// Async driver that runs model calls against a shared [`Session`].
///
/// The session lock is held only for the synchronous `begin_*` / `finish_*`
/// transitions, never across the model call, so a second action issued
/// while one is pending sees the loading state and is rejected.
use tokio::sync::{Mutex as TokioMutex, MutexGuard};

use super::{Rejected, Session};
use crate::review::ReviewService;

pub struct Workbench {
    service: ReviewService,
    session: TokioMutex<Session>,
}

impl Workbench {
    pub fn new(service: ReviewService) -> Self {
        Self::with_session(service, Session::new())
    }

    pub fn with_session(service: ReviewService, session: Session) -> Self {
        Self {
            service,
            session: TokioMutex::new(session),
        }
    }

    /// Lock the session for reading or for a synchronous edit.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Review the code in the buffer.
    pub async fn analyze(&self) -> Result<(), Rejected> {
        let code = self.session.lock().await.begin_analyze()?;
        let outcome = self.service.analyze(&code).await;
        self.session.lock().await.finish_analyze(outcome);
        Ok(())
    }

    /// Simulate execution of the code in the buffer.
    pub async fn trace(&self) -> Result<(), Rejected> {
        let code = self.session.lock().await.begin_trace()?;
        let outcome = self.service.trace(&code).await;
        self.session.lock().await.finish_trace(outcome);
        Ok(())
    }

    /// Ask for a change to the current corrected code.
    pub async fn refine(&self, instruction: &str) -> Result<(), Rejected> {
        let ticket = self.session.lock().await.begin_refine(instruction)?;
        let outcome = self.service.refine(&ticket.code, &ticket.instruction).await;
        self.session
            .lock()
            .await
            .finish_refine(ticket.epoch, outcome);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::GenerationConfig;
    use crate::model::RequestKind;
    use crate::model::mock::MockProvider;

    const ANALYSIS: &str = r#"{"summary": "s", "language": "JavaScript", "bugs": [],
        "improvements": [], "timeComplexity": "O(n)", "spaceComplexity": "O(1)",
        "correctedCode": "const x = 1;"}"#;

    fn workbench(mock: Arc<MockProvider>) -> Arc<Workbench> {
        Arc::new(Workbench::new(ReviewService::new(
            mock,
            GenerationConfig::default(),
        )))
    }

    async fn wait_for_call(mock: &MockProvider, n: usize) {
        while mock.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_trace_rejected_while_analysis_pending() {
        let mock = Arc::new(MockProvider::gated());
        mock.push_text(ANALYSIS);
        let wb = workbench(mock.clone());
        wb.session().await.editor.set_text("let x = 1");

        let bg = wb.clone();
        let handle = tokio::spawn(async move { bg.analyze().await });
        wait_for_call(&mock, 1).await;

        assert_eq!(wb.trace().await, Err(Rejected::Busy(RequestKind::Analyze)));
        assert_eq!(wb.analyze().await, Err(Rejected::Busy(RequestKind::Analyze)));
        assert_eq!(mock.calls(), 1);

        mock.release(1);
        handle.await.unwrap().unwrap();
        assert_eq!(mock.max_in_flight(), 1);
        assert!(wb.session().await.analysis().data().is_some());
    }

    #[tokio::test]
    async fn test_refine_single_flight() {
        let mock = Arc::new(MockProvider::gated());
        mock.push_text(ANALYSIS);
        mock.push_text(r#"{"newCode": "const total = 1;", "explanation": "שינוי שם"}"#);
        let wb = workbench(mock.clone());
        wb.session().await.editor.set_text("let x = 1");

        mock.release(1);
        wb.analyze().await.unwrap();

        let bg = wb.clone();
        let handle = tokio::spawn(async move { bg.refine("rename x").await });
        wait_for_call(&mock, 2).await;

        assert_eq!(
            wb.refine("add comments").await,
            Err(Rejected::Busy(RequestKind::Refine))
        );
        assert_eq!(
            wb.session().await.refine().current_code(),
            Some("const x = 1;")
        );

        mock.release(1);
        handle.await.unwrap().unwrap();
        assert_eq!(
            wb.session().await.refine().current_code(),
            Some("const total = 1;")
        );
        assert_eq!(mock.calls(), 2);
    }
}
