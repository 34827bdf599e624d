//! Notification dispatcher: turns lifecycle events into bridge callbacks.
//!
//! The dispatcher remembers the step of the most recent classified task-start
//! and attributes later ok / failed / unreachable events to it, since those
//! events cannot be classified reliably on their own. Every delivery problem
//! ends in a log line; nothing propagates back to the workflow engine.

use crate::callback::{
    CallbackPayload, CallbackStatus, CallbackTransport, HttpTransport,
};
use crate::config::{parse_deployment_id, BridgeConfig};
use crate::error::Result;
use crate::events::{LifecycleHooks, Playbook, PlaybookStats, Task, TaskResult};
use crate::step::{classify, StepId};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// How a single callback attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Rejected { status: u16 },
    TransportFailed,
    SkippedNoDeploymentId,
    SkippedInvalidDeploymentId,
}

/// Counters over every callback attempt of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub rejected: usize,
    pub transport_failed: usize,
    pub skipped: usize,
}

impl DispatchSummary {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Rejected { .. } => self.rejected += 1,
            DeliveryOutcome::TransportFailed => self.transport_failed += 1,
            DeliveryOutcome::SkippedNoDeploymentId
            | DeliveryOutcome::SkippedInvalidDeploymentId => self.skipped += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.rejected + self.transport_failed
    }
}

/// Per-run dispatcher state.
///
/// Handlers take `&mut self`: one dispatcher serves one sequential event
/// stream. Hosts executing concurrently need their own instance or external
/// serialization.
pub struct Dispatcher<T: CallbackTransport = HttpTransport> {
    config: BridgeConfig,
    callback_url: String,
    /// Step of the last classified task-start. Only `on_task_start` writes it,
    /// and it is never cleared: an unclassified task-start or the end of a
    /// playbook leaves the previous step in place.
    current_step: Option<StepId>,
    transport: T,
    summary: DispatchSummary,
}

impl Dispatcher<HttpTransport> {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: CallbackTransport> Dispatcher<T> {
    pub fn with_transport(config: BridgeConfig, transport: T) -> Self {
        let callback_url = config.callback_url();
        Self {
            config,
            callback_url,
            current_step: None,
            transport,
            summary: DispatchSummary::default(),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.current_step
    }

    pub fn summary(&self) -> DispatchSummary {
        self.summary
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build and deliver one callback. Never fails; the outcome is logged and
    /// counted.
    pub fn send_callback(
        &mut self,
        step: StepId,
        status: CallbackStatus,
        message: impl Into<String>,
    ) -> DeliveryOutcome {
        let outcome = self.try_send(step, status, message.into());
        self.summary.record(&outcome);
        outcome
    }

    fn try_send(&self, step: StepId, status: CallbackStatus, message: String) -> DeliveryOutcome {
        let Some(raw_id) = self.config.deployment_id.as_deref() else {
            warn!(step = %step, status = %status, "DEPLOYMENT_ID is not set; skipping callback");
            return DeliveryOutcome::SkippedNoDeploymentId;
        };

        let deployment_id = match parse_deployment_id(raw_id) {
            Ok(id) => id,
            Err(err) => {
                error!(
                    step = %step,
                    status = %status,
                    deployment_id = raw_id,
                    "Cannot send callback: {}",
                    err.details["problem"].as_str().unwrap_or(&err.message)
                );
                return DeliveryOutcome::SkippedInvalidDeploymentId;
            }
        };

        let payload = CallbackPayload {
            deployment_id,
            step_name: step,
            status,
            message,
        };

        match self.transport.post(&self.callback_url, &payload) {
            Ok(response) if response.is_accepted() => {
                info!(step = %step, status = %status, deployment_id, "Callback delivered");
                DeliveryOutcome::Delivered
            }
            Ok(response) => {
                error!(
                    step = %step,
                    status = %status,
                    deployment_id,
                    "Callback rejected: {} - {}",
                    response.status,
                    response.body
                );
                DeliveryOutcome::Rejected {
                    status: response.status,
                }
            }
            Err(err) => {
                error!(
                    step = %step,
                    status = %status,
                    deployment_id,
                    "Callback delivery failed: {}",
                    err
                );
                DeliveryOutcome::TransportFailed
            }
        }
    }
}

impl<T: CallbackTransport> LifecycleHooks for Dispatcher<T> {
    fn on_playbook_start(&mut self, playbook: &Playbook) {
        info!(playbook = %playbook.file_name, "Playbook started");
    }

    fn on_task_start(&mut self, task: &Task, _is_conditional: bool) {
        let Some(step) = classify(&task.name) else {
            debug!(task = %task.name, "Task does not map to a deployment step");
            return;
        };

        self.current_step = Some(step);
        self.send_callback(
            step,
            CallbackStatus::Running,
            format!("task started: {}", task.name),
        );
        info!(task = %task.name, step = %step, "Task started");
    }

    fn on_task_ok(&mut self, result: &TaskResult) {
        let Some(step) = self.current_step else {
            debug!(task = %result.task_name, "Task succeeded outside a tracked step");
            return;
        };

        self.send_callback(
            step,
            CallbackStatus::Completed,
            format!("task completed: {}", result.task_name),
        );
        info!(task = %result.task_name, host = ?result.host, "Task succeeded");
    }

    fn on_task_failed(&mut self, result: &TaskResult, ignore_errors: bool) {
        let Some(step) = self.current_step else {
            debug!(task = %result.task_name, "Task failed outside a tracked step");
            return;
        };

        let error_msg = result.error_message();
        self.send_callback(
            step,
            CallbackStatus::Failed,
            format!("task failed: {} - {}", result.task_name, error_msg),
        );
        error!(
            task = %result.task_name,
            host = ?result.host,
            ignore_errors,
            "Task failed: {}",
            error_msg
        );
    }

    fn on_host_unreachable(&mut self, result: &TaskResult) {
        let Some(step) = self.current_step else {
            debug!(task = %result.task_name, "Host unreachable outside a tracked step");
            return;
        };

        self.send_callback(
            step,
            CallbackStatus::Failed,
            format!("host unreachable: {}", result.task_name),
        );
        error!(task = %result.task_name, host = ?result.host, "Host unreachable");
    }

    fn on_playbook_stats(&mut self, stats: &PlaybookStats) {
        info!("Playbook run finished");

        for (host, summary) in stats.processed() {
            if summary.is_success() {
                info!(
                    host,
                    ok = summary.ok,
                    changed = summary.changed,
                    skipped = summary.skipped,
                    "Host finished successfully"
                );
            } else {
                error!(
                    host,
                    ok = summary.ok,
                    failures = summary.failures,
                    unreachable = summary.unreachable,
                    "Host finished with failures"
                );
            }
        }
    }
}
