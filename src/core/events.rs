//! Workflow lifecycle events and the hook contract that consumes them.
//!
//! The workflow engine drives a `LifecycleHooks` implementation one event at
//! a time. `LifecycleEvent` is the serialized form of the same vocabulary, used
//! when events arrive as JSON lines instead of direct calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Placeholder used when a failed task reports no message.
pub const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
}

/// Outcome of one task on one host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Raw module result as reported by the engine.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl TaskResult {
    pub fn new(task_name: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// The `msg` field of the module result, if any. Non-string messages are
    /// rendered as JSON.
    pub fn message(&self) -> Option<String> {
        match self.details.get("msg")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn error_message(&self) -> String {
        self.message().unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }
}

/// Per-host counters from the end-of-run recap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSummary {
    pub ok: u32,
    pub changed: u32,
    pub unreachable: u32,
    pub failures: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl HostSummary {
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.unreachable == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybookStats {
    #[serde(default)]
    pub hosts: BTreeMap<String, HostSummary>,
}

impl PlaybookStats {
    pub fn processed(&self) -> impl Iterator<Item = (&str, &HostSummary)> {
        self.hosts.iter().map(|(host, summary)| (host.as_str(), summary))
    }
}

/// One method per lifecycle event. Handlers never fail: anything that goes
/// wrong while reacting to an event is the implementor's to log.
pub trait LifecycleHooks {
    fn on_playbook_start(&mut self, playbook: &Playbook);
    fn on_task_start(&mut self, task: &Task, is_conditional: bool);
    fn on_task_ok(&mut self, result: &TaskResult);
    fn on_task_failed(&mut self, result: &TaskResult, ignore_errors: bool);
    fn on_host_unreachable(&mut self, result: &TaskResult);
    fn on_playbook_stats(&mut self, stats: &PlaybookStats);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    PlaybookStart {
        playbook: String,
    },
    TaskStart {
        task: String,
        #[serde(default)]
        is_conditional: bool,
    },
    TaskOk {
        result: TaskResult,
    },
    TaskFailed {
        result: TaskResult,
        #[serde(default)]
        ignore_errors: bool,
    },
    HostUnreachable {
        result: TaskResult,
    },
    PlaybookStats {
        #[serde(default)]
        hosts: BTreeMap<String, HostSummary>,
    },
}

impl LifecycleEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlaybookStart { .. } => "playbook_start",
            Self::TaskStart { .. } => "task_start",
            Self::TaskOk { .. } => "task_ok",
            Self::TaskFailed { .. } => "task_failed",
            Self::HostUnreachable { .. } => "host_unreachable",
            Self::PlaybookStats { .. } => "playbook_stats",
        }
    }

    /// Invoke the matching hook.
    pub fn dispatch<H: LifecycleHooks + ?Sized>(&self, hooks: &mut H) {
        match self {
            Self::PlaybookStart { playbook } => hooks.on_playbook_start(&Playbook {
                file_name: playbook.clone(),
            }),
            Self::TaskStart {
                task,
                is_conditional,
            } => hooks.on_task_start(&Task { name: task.clone() }, *is_conditional),
            Self::TaskOk { result } => hooks.on_task_ok(result),
            Self::TaskFailed {
                result,
                ignore_errors,
            } => hooks.on_task_failed(result, *ignore_errors),
            Self::HostUnreachable { result } => hooks.on_host_unreachable(result),
            Self::PlaybookStats { hosts } => hooks.on_playbook_stats(&PlaybookStats {
                hosts: hosts.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl LifecycleHooks for Recorder {
        fn on_playbook_start(&mut self, playbook: &Playbook) {
            self.calls.push(format!("start:{}", playbook.file_name));
        }
        fn on_task_start(&mut self, task: &Task, is_conditional: bool) {
            self.calls.push(format!("task:{}:{}", task.name, is_conditional));
        }
        fn on_task_ok(&mut self, result: &TaskResult) {
            self.calls.push(format!("ok:{}", result.task_name));
        }
        fn on_task_failed(&mut self, result: &TaskResult, ignore_errors: bool) {
            self.calls
                .push(format!("failed:{}:{}", result.task_name, ignore_errors));
        }
        fn on_host_unreachable(&mut self, result: &TaskResult) {
            self.calls.push(format!("unreachable:{}", result.task_name));
        }
        fn on_playbook_stats(&mut self, stats: &PlaybookStats) {
            self.calls.push(format!("stats:{}", stats.hosts.len()));
        }
    }

    #[test]
    fn message_reads_msg_field() {
        let result = TaskResult::new("x").with_detail("msg", json!("boom"));
        assert_eq!(result.error_message(), "boom");
    }

    #[test]
    fn message_falls_back_to_placeholder() {
        assert_eq!(TaskResult::new("x").error_message(), UNKNOWN_ERROR);
        let null_msg = TaskResult::new("x").with_detail("msg", Value::Null);
        assert_eq!(null_msg.error_message(), UNKNOWN_ERROR);
    }

    #[test]
    fn non_string_message_is_rendered_as_json() {
        let result = TaskResult::new("x").with_detail("msg", json!(["a", "b"]));
        assert_eq!(result.error_message(), "[\"a\",\"b\"]");
    }

    #[test]
    fn host_summary_success_requires_no_failures_or_unreachable() {
        assert!(HostSummary { ok: 3, ..Default::default() }.is_success());
        assert!(!HostSummary { failures: 1, ..Default::default() }.is_success());
        assert!(!HostSummary { unreachable: 1, ..Default::default() }.is_success());
    }

    #[test]
    fn events_parse_from_tagged_json() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "event": "task_failed",
            "result": { "task_name": "Create ALB", "details": { "msg": "quota" } }
        }))
        .unwrap();

        match event {
            LifecycleEvent::TaskFailed {
                result,
                ignore_errors,
            } => {
                assert_eq!(result.task_name, "Create ALB");
                assert_eq!(result.message().as_deref(), Some("quota"));
                assert!(!ignore_errors);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn stats_default_missing_counters_to_zero() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "event": "playbook_stats",
            "hosts": { "web1": { "ok": 2, "failures": 1 } }
        }))
        .unwrap();

        let LifecycleEvent::PlaybookStats { hosts } = event else {
            panic!("expected stats");
        };
        assert_eq!(
            hosts["web1"],
            HostSummary { ok: 2, failures: 1, ..Default::default() }
        );
    }

    #[test]
    fn dispatch_routes_each_event_to_its_hook() {
        let events = vec![
            LifecycleEvent::PlaybookStart { playbook: "deploy.yml".into() },
            LifecycleEvent::TaskStart { task: "Create ALB".into(), is_conditional: true },
            LifecycleEvent::TaskOk { result: TaskResult::new("Create ALB") },
            LifecycleEvent::TaskFailed { result: TaskResult::new("Create ALB"), ignore_errors: true },
            LifecycleEvent::HostUnreachable { result: TaskResult::new("Create ALB") },
            LifecycleEvent::PlaybookStats { hosts: BTreeMap::new() },
        ];

        let mut recorder = Recorder::default();
        for event in &events {
            event.dispatch(&mut recorder);
        }

        assert_eq!(
            recorder.calls,
            vec![
                "start:deploy.yml",
                "task:Create ALB:true",
                "ok:Create ALB",
                "failed:Create ALB:true",
                "unreachable:Create ALB",
                "stats:0",
            ]
        );
    }
}
