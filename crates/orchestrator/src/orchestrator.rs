//! The audit-remediate loop.

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use redraft_checks::{CheckRegistry, SignalCollector};
use redraft_core::{
    AuditConfig, AuditMode, ConfigError, FinalOutcome, RemediationAttempt, RewriteTier, SessionId,
    SessionInput, SessionResult, Time, Verdict,
};
use redraft_gateway::{non_empty, with_timeout, GenerationGateway};
use redraft_policy::{RemediationEscalator, SeverityAggregator};
use redraft_storage::AuditSink;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::state::SessionState;

/// Top-level controller.
///
/// Holds only read-only collaborators, so one orchestrator can serve any
/// number of concurrent sessions.
pub struct Orchestrator {
    collector: SignalCollector,
    aggregator: SeverityAggregator,
    escalator: RemediationEscalator,
    gateway: Arc<dyn GenerationGateway>,
    sinks: Vec<Arc<dyn AuditSink>>,
    sink_tasks: TaskTracker,
    mode: AuditMode,
    refusal: String,
    generation_timeout: Duration,
    max_retries: u32,
}

impl Orchestrator {
    /// Create an orchestrator. Fails on an invalid config.
    pub fn new(
        config: &AuditConfig,
        collector: SignalCollector,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            aggregator: SeverityAggregator::from_config(config)?,
            escalator: RemediationEscalator::from_config(config)?,
            collector,
            gateway,
            sinks: Vec::new(),
            sink_tasks: TaskTracker::new(),
            mode: config.mode,
            refusal: config.refusal_message.clone(),
            generation_timeout: config.generation_timeout(),
            max_retries: config.max_retries,
        })
    }

    /// Create an orchestrator whose collector runs the registry's checks.
    pub fn from_registry(
        config: &AuditConfig,
        registry: &CheckRegistry,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Result<Self, ConfigError> {
        let collector = SignalCollector::from_config(config, registry)?;
        Self::new(config, collector, gateway)
    }

    /// Add a sink for finished sessions.
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add several sinks.
    pub fn with_sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn AuditSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Configured retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// One evaluation step: run every check and aggregate.
    ///
    /// Empty or whitespace-only text is rejected without running any check.
    pub async fn audit(&self, text: &str, context: &str) -> Verdict {
        if text.trim().is_empty() {
            debug!("Empty candidate, skipping checks");
            return Verdict::empty_input();
        }
        let findings = self.collector.evaluate(text, context).await;
        self.aggregator.aggregate(&findings)
    }

    /// Run one session to completion.
    ///
    /// Never fails: collaborator errors end the session in FALLBACK and
    /// cancellation reports the last completed verdict.
    pub async fn run(
        &self,
        input: SessionInput,
        max_retries: u32,
        cancel: &CancellationToken,
    ) -> SessionResult {
        let id = SessionId::new();
        let result = self
            .run_session(id, input, max_retries, cancel)
            .instrument(info_span!("audit_session", id = %id))
            .await;
        self.dispatch(&result);
        result
    }

    async fn run_session(
        &self,
        id: SessionId,
        input: SessionInput,
        max_retries: u32,
        cancel: &CancellationToken,
    ) -> SessionResult {
        let mut session = Session::new(id, self.mode, input.user_prompt().map(str::to_string));
        info!("Session started ({} mode, max {} retries)", self.mode, max_retries);

        let (draft, context) = match input {
            SessionInput::Candidate { prompt, text } => (text, prompt.unwrap_or_default()),
            SessionInput::Prompt { prompt } if self.mode == AuditMode::Input => (prompt, String::new()),
            SessionInput::Prompt { prompt } => {
                debug!("Generating initial draft");
                let generated = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return self.cancelled(session),
                    r = with_timeout(self.generation_timeout, self.gateway.generate(&prompt)) => {
                        r.and_then(non_empty)
                    }
                };
                match generated {
                    Ok(text) => (text, prompt),
                    Err(e) => {
                        warn!("Initial generation failed: {}", e);
                        session.advance(SessionState::Fallback);
                        return session.finish(
                            FinalOutcome::Fallback,
                            self.refusal.clone(),
                            Verdict::generation_failed(),
                            false,
                        );
                    }
                }
            }
        };

        session.advance(SessionState::Evaluating);
        let Some(mut verdict) = self.evaluate(&draft, &context, cancel).await else {
            return self.cancelled(session);
        };
        session.record(0, None, draft.clone(), verdict.clone());
        let mut candidate = draft;

        if candidate.trim().is_empty() || self.mode == AuditMode::Input {
            return if verdict.is_pass() {
                session.advance(SessionState::Passed);
                session.finish(FinalOutcome::Pass, candidate, verdict, false)
            } else {
                session.advance(SessionState::Rejected);
                let outcome = FinalOutcome::from(verdict.outcome);
                session.finish(outcome, self.refusal.clone(), verdict, false)
            };
        }

        loop {
            if verdict.is_pass() {
                session.advance(SessionState::Passed);
                return session.finish(FinalOutcome::Pass, candidate, verdict, false);
            }
            if session.attempts_used >= max_retries {
                info!("Retry budget of {} exhausted", max_retries);
                session.advance(SessionState::Fallback);
                return session.finish(FinalOutcome::Fallback, self.refusal.clone(), verdict, false);
            }

            session.advance(SessionState::Escalating);
            session.attempts_used += 1;
            let level = session.attempts_used;
            let tier = self.escalator.tier(level);
            let instructions =
                self.escalator
                    .build_instructions(&verdict, level, session.original_prompt.as_deref());

            debug!("Requesting tier {} ({}) rewrite at level {}", tier.number(), tier, level);
            let rewritten = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(session),
                r = with_timeout(
                    self.generation_timeout,
                    self.gateway.rewrite(&instructions, &candidate),
                ) => r.and_then(non_empty),
            };
            let next = match rewritten {
                Ok(text) => text,
                Err(e) => {
                    warn!("Rewrite at level {} failed: {}", level, e);
                    session.advance(SessionState::Fallback);
                    return session.finish(FinalOutcome::Fallback, self.refusal.clone(), verdict, false);
                }
            };

            session.advance(SessionState::Evaluating);
            let Some(next_verdict) = self.evaluate(&next, &context, cancel).await else {
                return self.cancelled(session);
            };
            debug!("Level {} verdict: {} (risk {})", level, next_verdict.outcome, next_verdict.risk_score);
            session.record(level, Some(tier), next.clone(), next_verdict.clone());
            candidate = next;
            verdict = next_verdict;
        }
    }

    async fn evaluate(&self, text: &str, context: &str, cancel: &CancellationToken) -> Option<Verdict> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            verdict = self.audit(text, context) => Some(verdict),
        }
    }

    fn cancelled(&self, session: Session) -> SessionResult {
        info!("Session cancelled after {} completed attempt(s)", session.trail.len());
        match session.trail.last().cloned() {
            Some(last) if last.verdict.is_pass() => {
                session.finish(FinalOutcome::Pass, last.candidate_text, last.verdict, true)
            }
            Some(last) => {
                let outcome = FinalOutcome::from(last.verdict.outcome);
                session.finish(outcome, self.refusal.clone(), last.verdict, true)
            }
            None => session.finish(
                FinalOutcome::Fail,
                self.refusal.clone(),
                Verdict::cancelled(),
                true,
            ),
        }
    }

    /// Wait for sink deliveries that are still in flight.
    ///
    /// Sessions never wait on sinks; call this before shutting down.
    pub async fn drain_sinks(&self) {
        self.sink_tasks.close();
        self.sink_tasks.wait().await;
        self.sink_tasks.reopen();
    }

    /// Hand the record to every sink without waiting for them.
    fn dispatch(&self, result: &SessionResult) {
        if self.sinks.is_empty() {
            return;
        }
        let record = Arc::new(result.to_record());
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let record = Arc::clone(&record);
            self.sink_tasks.spawn(async move {
                if let Err(e) = sink.record(&record).await {
                    warn!("Sink {} failed for session {}: {}", sink.name(), record.id, e);
                }
            });
        }
    }
}

/// Bookkeeping for one session. Owned by a single `run` call.
struct Session {
    id: SessionId,
    mode: AuditMode,
    original_prompt: Option<String>,
    state: SessionState,
    trail: Vec<RemediationAttempt>,
    attempts_used: u32,
    started_at: Time,
}

impl Session {
    fn new(id: SessionId, mode: AuditMode, original_prompt: Option<String>) -> Self {
        Self {
            id,
            mode,
            original_prompt,
            state: SessionState::Initial,
            trail: Vec::new(),
            attempts_used: 0,
            started_at: Utc::now(),
        }
    }

    fn advance(&mut self, to: SessionState) {
        match self.state.transition(to) {
            Ok(next) => {
                debug!("Session state {} -> {}", self.state, next);
                self.state = next;
            }
            Err(e) => {
                error!("{}", e);
                debug_assert!(false, "{}", e);
            }
        }
    }

    fn record(&mut self, level: u32, tier: Option<RewriteTier>, candidate_text: String, verdict: Verdict) {
        self.trail.push(RemediationAttempt {
            level,
            tier,
            candidate_text,
            verdict,
        });
    }

    fn finish(
        self,
        final_outcome: FinalOutcome,
        final_text: String,
        final_verdict: Verdict,
        cancelled: bool,
    ) -> SessionResult {
        info!(
            "Session finished: {} after {} rewrite(s), risk {} ({})",
            final_outcome,
            self.attempts_used,
            final_verdict.risk_score,
            final_verdict.risk_tier()
        );
        SessionResult {
            id: self.id,
            mode: self.mode,
            original_prompt: self.original_prompt,
            final_text,
            final_outcome,
            final_verdict,
            trail: self.trail,
            attempts_used: self.attempts_used,
            cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}
