//! Session controller: the application context for one client.
//!
//! Epistemic foundation:
//! - K_i: SessionState has exactly one writer, this controller
//! - K_i: A failed action never touches SessionState
//! - B_i: Requests may overlap → last-submission-wins via tickets
//!
//! State machine:
//! Idle ──submit/reset──▶ AwaitingResponse ──success──▶ Displaying (new state)
//!                                         ──failure──▶ Displaying (prior state)
//! Displaying ──submit/reset──▶ AwaitingResponse

mod reconciler;

pub use reconciler::*;

use crate::client::LearnerTransport;
use crate::models::{
    AutodidactError, Example, LocalValidationError, Result, ServerResponse, SessionState,
    TransportError,
};
use crate::render::{ChartSeries, ChartSurface, Projection, Projector};
use std::sync::Arc;
use tracing::{debug, info};

/// Shown when either input field is blank.
pub const MISSING_INPUT_NOTICE: &str = "Please enter both example and label.";
/// Shown when a submit fails to reach the learner.
pub const SUBMIT_FAILED_NOTICE: &str = "Could not connect to backend.";
/// Shown when a reset fails to reach the learner.
pub const RESET_FAILED_NOTICE: &str = "Reset failed.";
/// Shown when the learner answers with a malformed body.
pub const PROTOCOL_NOTICE: &str = "Learner sent an unexpected response; keeping previous hypothesis.";

/// Where the session is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing sent yet
    Idle,
    /// A request is in flight
    AwaitingResponse,
    /// Showing the latest known state
    Displaying,
}

/// User-triggered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Reset,
}

/// Sequence number of a dispatched request.
///
/// Only the most recently issued ticket may change the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A request that has been validated and ticketed but not yet sent.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: RequestTicket,
    pub action: Action,
    example: Option<Example>,
}

impl PendingRequest {
    /// Perform the single network call for this request.
    pub async fn send<T: LearnerTransport>(
        &self,
        transport: &T,
    ) -> std::result::Result<ServerResponse, TransportError> {
        match (&self.action, &self.example) {
            (Action::Submit, Some(example)) => transport.submit(example).await,
            _ => transport.reset().await,
        }
    }
}

/// Result of applying a completed request.
#[derive(Debug)]
pub enum Outcome {
    /// New state is current and has been projected
    Applied,
    /// The request failed; prior state retained
    Rejected(AutodidactError),
    /// A newer request was issued meanwhile; result discarded
    Superseded,
}

/// The two free-text input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFields {
    pub example: String,
    pub label: String,
}

impl InputFields {
    pub fn clear(&mut self) {
        self.example.clear();
        self.label.clear();
    }
}

/// Builds the chart surface on first projection.
pub type SurfaceFactory<S> = Box<dyn FnMut(&ChartSeries) -> S + Send>;

/// Client session: state, inputs, projector and request sequencing.
pub struct Session<T, S> {
    transport: Arc<T>,
    state: SessionState,
    inputs: InputFields,
    phase: Phase,
    projector: Projector<S, SurfaceFactory<S>>,
    issued: u64,
    notice: Option<String>,
}

impl<T, S> Session<T, S>
where
    T: LearnerTransport,
    S: ChartSurface,
{
    /// Create a session with empty state.
    ///
    /// `make_surface` runs once, on the first successful response.
    pub fn new(
        transport: Arc<T>,
        make_surface: impl FnMut(&ChartSeries) -> S + Send + 'static,
    ) -> Self {
        Self {
            transport,
            state: SessionState::empty(),
            inputs: InputFields::default(),
            phase: Phase::Idle,
            projector: Projector::new(Box::new(make_surface) as SurfaceFactory<S>),
            issued: 0,
            notice: None,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn inputs(&self) -> &InputFields {
        &self.inputs
    }

    pub fn set_example(&mut self, example: impl Into<String>) {
        self.inputs.example = example.into();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.inputs.label = label.into();
    }

    /// Latest projection, if any response has been applied.
    pub fn projection(&self) -> Option<&Projection> {
        self.projector.last()
    }

    pub fn surface(&self) -> Option<&S> {
        self.projector.surface()
    }

    pub fn projector(&self) -> &Projector<S, SurfaceFactory<S>> {
        &self.projector
    }

    /// Most recent user notification; cleared by the next action.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Latest issued ticket.
    pub fn latest_ticket(&self) -> Option<RequestTicket> {
        (self.issued > 0).then_some(RequestTicket(self.issued))
    }

    /// Validate inputs and issue a ticket for `action`.
    ///
    /// A blank field fails here and no request is issued; state and phase
    /// are left untouched.
    pub fn begin(&mut self, action: Action) -> std::result::Result<PendingRequest, LocalValidationError> {
        let example = match action {
            Action::Submit => match Example::new(&self.inputs.example, &self.inputs.label) {
                Ok(example) => Some(example),
                Err(e) => {
                    info!(error = %e, "Rejected submit before sending");
                    self.notice = Some(MISSING_INPUT_NOTICE.to_string());
                    return Err(e);
                }
            },
            Action::Reset => None,
        };

        self.issued += 1;
        let ticket = RequestTicket(self.issued);
        if self.phase == Phase::AwaitingResponse {
            debug!(ticket = ticket.value(), "Superseding in-flight request");
        }
        self.phase = Phase::AwaitingResponse;
        self.notice = None;

        debug!(ticket = ticket.value(), action = ?action, "Request issued");
        Ok(PendingRequest {
            ticket,
            action,
            example,
        })
    }

    /// Apply the result of a request.
    ///
    /// Results for anything but the latest ticket are discarded. On
    /// success the state is replaced as a whole and re-projected; on any
    /// failure the prior state stays current.
    pub fn complete(
        &mut self,
        request: &PendingRequest,
        result: std::result::Result<ServerResponse, TransportError>,
    ) -> Outcome {
        if Some(request.ticket) != self.latest_ticket() {
            debug!(
                ticket = request.ticket.value(),
                latest = self.issued,
                "Discarding superseded response"
            );
            return Outcome::Superseded;
        }

        self.phase = Phase::Displaying;

        let next = result
            .map_err(AutodidactError::from)
            .and_then(|payload| reconcile(&payload).map_err(AutodidactError::from));

        match next {
            Ok(state) => {
                self.state = state;
                let projection = self.projector.apply(&self.state);
                if request.action == Action::Reset {
                    self.inputs.clear();
                }
                debug!(
                    ticket = request.ticket.value(),
                    hypothesis = %projection.summary.hypothesis,
                    log_entries = projection.summary.log.len(),
                    "Applied learner response"
                );
                Outcome::Applied
            }
            Err(e) => {
                info!(ticket = request.ticket.value(), error = %e, "Learner request failed");
                self.notice = Some(notice_for(request.action, &e).to_string());
                Outcome::Rejected(e)
            }
        }
    }

    /// Run one action to completion: validate, send, reconcile, project.
    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        let request = self.begin(action)?;
        let result = request.send(self.transport.as_ref()).await;

        match self.complete(&request, result) {
            Outcome::Applied => Ok(()),
            Outcome::Rejected(e) => Err(e),
            Outcome::Superseded => Err(AutodidactError::Internal(
                "sequential dispatch was superseded".to_string(),
            )),
        }
    }

    /// Set both fields and submit them.
    pub async fn submit(&mut self, example: &str, label: &str) -> Result<()> {
        self.set_example(example);
        self.set_label(label);
        self.dispatch(Action::Submit).await
    }

    pub async fn reset(&mut self) -> Result<()> {
        self.dispatch(Action::Reset).await
    }
}

/// User-facing message for a failed action.
pub fn notice_for(action: Action, error: &AutodidactError) -> &'static str {
    match (action, error) {
        (_, AutodidactError::Validation(_)) => MISSING_INPUT_NOTICE,
        (_, AutodidactError::Protocol(_)) => PROTOCOL_NOTICE,
        (Action::Submit, _) => SUBMIT_FAILED_NOTICE,
        (Action::Reset, _) => RESET_FAILED_NOTICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Literal;
    use crate::render::TerminalChart;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted reply for the fake transport.
    enum Reply {
        Body(Value),
        Status(u16),
    }

    #[derive(Default)]
    struct FakeTransport {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn with(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self) -> std::result::Result<ServerResponse, TransportError> {
            match self.replies.lock().unwrap().pop_front() {
                Some(Reply::Body(v)) => Ok(ServerResponse::from(v)),
                Some(Reply::Status(status)) => Err(TransportError::Status {
                    status,
                    body: String::new(),
                }),
                None => Err(TransportError::Decode("no scripted reply".to_string())),
            }
        }
    }

    impl LearnerTransport for FakeTransport {
        async fn submit(
            &self,
            example: &Example,
        ) -> std::result::Result<ServerResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("submit {} {}", example.example, example.label));
            self.next()
        }

        async fn reset(&self) -> std::result::Result<ServerResponse, TransportError> {
            self.calls.lock().unwrap().push("reset".to_string());
            self.next()
        }
    }

    fn session(transport: Arc<FakeTransport>) -> Session<FakeTransport, TerminalChart> {
        Session::new(transport, |series: &ChartSeries| TerminalChart::new(series, 2, false))
    }

    fn learned() -> Value {
        json!({
            "current_hypothesis": ["x1", "x3", "x5"],
            "log": ["added x1", "added x3", "added x5"]
        })
    }

    #[tokio::test]
    async fn test_submit_scenario() {
        let transport = FakeTransport::with(vec![Reply::Body(learned())]);
        let mut session = session(Arc::clone(&transport));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.surface().is_none());

        session.submit("1,0,1,0,1", "+").await.unwrap();

        assert_eq!(transport.calls(), vec!["submit 1,0,1,0,1 +"]);
        assert_eq!(session.phase(), Phase::Displaying);
        let projection = session.projection().unwrap();
        assert_eq!(projection.summary.hypothesis, "x1, x3, x5");
        assert_eq!(projection.chart.values(), [1, 0, 0, 0, 1, 0, 0, 0, 1, 0]);
        assert_eq!(session.surface().unwrap().data(), &[1, 0, 0, 0, 1, 0, 0, 0, 1, 0]);
        // Inputs survive a submit
        assert_eq!(session.inputs().label, "+");
    }

    #[tokio::test]
    async fn test_reset_scenario_clears_inputs() {
        let transport = FakeTransport::with(vec![
            Reply::Body(learned()),
            Reply::Body(json!({"status": "reset", "current_hypothesis": [], "log": []})),
        ]);
        let mut session = session(Arc::clone(&transport));

        session.submit("1,0,1,0,1", "+").await.unwrap();
        session.reset().await.unwrap();

        let projection = session.projection().unwrap();
        assert_eq!(projection.summary.hypothesis, "[Empty hypothesis]");
        assert_eq!(projection.chart.values(), [0; 10]);
        assert_eq!(session.inputs(), &InputFields::default());
        assert_eq!(session.projector().surfaces_created(), 1);
        assert_eq!(session.surface().unwrap().revision(), 1);
    }

    #[tokio::test]
    async fn test_empty_label_makes_no_call() {
        let transport = FakeTransport::with(vec![Reply::Body(learned())]);
        let mut session = session(Arc::clone(&transport));

        let err = session.submit("1,0,1,0,1", "   ").await.unwrap_err();

        assert!(matches!(
            err,
            AutodidactError::Validation(LocalValidationError::MissingLabel)
        ));
        assert!(transport.calls().is_empty());
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.notice(), Some(MISSING_INPUT_NOTICE));
        assert_eq!(session.latest_ticket(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_state() {
        let transport = FakeTransport::with(vec![Reply::Body(learned()), Reply::Status(503)]);
        let mut session = session(Arc::clone(&transport));

        session.submit("1,0,1,0,1", "+").await.unwrap();
        let before = session.state().clone();
        let projection_before = session.projection().cloned();

        let err = session.submit("0,0,0,0,0", "+").await.unwrap_err();

        assert!(matches!(err, AutodidactError::Transport(_)));
        assert_eq!(session.state(), &before);
        assert_eq!(session.projection().cloned(), projection_before);
        assert_eq!(session.phase(), Phase::Displaying);
        assert_eq!(session.notice(), Some(SUBMIT_FAILED_NOTICE));
    }

    #[tokio::test]
    async fn test_protocol_failure_keeps_state() {
        let transport = FakeTransport::with(vec![
            Reply::Body(learned()),
            Reply::Body(json!({"current_hypothesis": ["x1", "y2"], "log": []})),
            Reply::Body(json!({"log": []})),
        ]);
        let mut session = session(Arc::clone(&transport));

        session.submit("1,0,1,0,1", "+").await.unwrap();
        let before = session.state().clone();

        let err = session.submit("1,1,1,1,1", "+").await.unwrap_err();
        assert!(matches!(err, AutodidactError::Protocol(_)));
        assert_eq!(session.state(), &before);

        let err = session.reset().await.unwrap_err();
        assert!(matches!(err, AutodidactError::Protocol(_)));
        assert_eq!(session.state(), &before);
        assert_eq!(session.notice(), Some(PROTOCOL_NOTICE));
        // Failed reset leaves the fields alone
        assert_eq!(session.inputs().example, "1,1,1,1,1");
    }

    #[tokio::test]
    async fn test_reset_failure_notice() {
        let transport = FakeTransport::with(vec![Reply::Status(500)]);
        let mut session = session(transport);

        assert!(session.reset().await.is_err());
        assert_eq!(session.notice(), Some(RESET_FAILED_NOTICE));
        assert_eq!(session.state(), &SessionState::empty());
        assert!(session.surface().is_none());
    }

    #[tokio::test]
    async fn test_last_submission_wins() {
        let transport = FakeTransport::default();
        let mut session = session(Arc::new(transport));
        session.set_example("1,0,1,0,1");
        session.set_label("+");

        let first = session.begin(Action::Submit).unwrap();
        let second = session.begin(Action::Reset).unwrap();
        assert!(second.ticket > first.ticket);

        // Newer response lands first
        let outcome = session.complete(
            &second,
            Ok(ServerResponse::from(json!({"current_hypothesis": ["¬x2"], "log": ["r"]}))),
        );
        assert!(matches!(outcome, Outcome::Applied));

        // Stale response arrives later and must not overwrite
        let outcome = session.complete(&first, Ok(ServerResponse::from(learned())));
        assert!(matches!(outcome, Outcome::Superseded));

        assert_eq!(session.state().hypothesis(), &[Literal::NotX2]);
        assert_eq!(session.state().log(), &["r"]);
        assert_eq!(session.phase(), Phase::Displaying);
    }

    #[tokio::test]
    async fn test_stale_response_while_awaiting_is_ignored() {
        let mut session = session(Arc::new(FakeTransport::default()));

        let first = session.begin(Action::Reset).unwrap();
        let _second = session.begin(Action::Reset).unwrap();

        let outcome = session.complete(&first, Ok(ServerResponse::from(learned())));
        assert!(matches!(outcome, Outcome::Superseded));
        assert_eq!(session.phase(), Phase::AwaitingResponse);
        assert_eq!(session.state(), &SessionState::empty());
    }

    #[test]
    fn test_notice_mapping() {
        let transport = AutodidactError::from(TransportError::Decode("x".into()));
        assert_eq!(notice_for(Action::Submit, &transport), SUBMIT_FAILED_NOTICE);
        assert_eq!(notice_for(Action::Reset, &transport), RESET_FAILED_NOTICE);
        let validation = AutodidactError::from(LocalValidationError::MissingBoth);
        assert_eq!(notice_for(Action::Submit, &validation), MISSING_INPUT_NOTICE);
    }
}
