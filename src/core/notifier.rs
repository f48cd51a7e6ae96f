//! User-visible notifications.
//!
//! Notices are collected while a job's transaction is open and handed to
//! the notifier only after it committed. A failing notifier is logged and
//! never undoes the state change it reports.

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::action_kind::ActionKind;
use crate::ui::messages;
use chrono::{DateTime, Local, Utc};

/// Sink for user-facing notifications.
pub trait Notifier: Send {
    fn notify(&self, title: &str, body: &str) -> AppResult<()>;
}

/// Prints notifications on stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, body: &str) -> AppResult<()> {
        messages::notify(title, body);
        Ok(())
    }
}

/// Drops every notification (config `notifications: false`).
pub struct MutedNotifier;

impl Notifier for MutedNotifier {
    fn notify(&self, title: &str, body: &str) -> AppResult<()> {
        tracing::debug!(title, body, "notification muted");
        Ok(())
    }
}

pub fn from_config(cfg: &Config) -> Box<dyn Notifier> {
    if cfg.notifications {
        Box::new(ConsoleNotifier)
    } else {
        Box::new(MutedNotifier)
    }
}

/// Something the user should hear about once it is durable.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Scheduled {
        job_name: String,
        kind: ActionKind,
        delay_minutes: u32,
        target_time: DateTime<Utc>,
    },
    Started {
        job_name: String,
    },
    Stopped {
        job_name: String,
        hours: f64,
    },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Scheduled { kind: ActionKind::Start, .. } => "Timer will start",
            Notice::Scheduled { kind: ActionKind::Stop, .. } => "Timer will stop",
            Notice::Started { .. } => "Timer started",
            Notice::Stopped { .. } => "Timer stopped",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notice::Scheduled {
                job_name,
                kind,
                delay_minutes,
                target_time,
            } => format!(
                "Timer will {} in {} minute{} for \"{}\" (at {})",
                kind,
                delay_minutes,
                if *delay_minutes == 1 { "" } else { "s" },
                job_name,
                target_time.with_timezone(&Local).format("%H:%M")
            ),
            Notice::Started { job_name } => {
                format!("Automatic timer started for \"{job_name}\"")
            }
            Notice::Stopped { job_name, hours } => {
                format!("Automatic timer stopped for \"{job_name}\": {hours:.2}h recorded")
            }
        }
    }
}

/// Deliver notices in order. Failures are logged and swallowed.
pub fn dispatch(notifier: &dyn Notifier, notices: &[Notice]) {
    for notice in notices {
        if let Err(e) = notifier.notify(notice.title(), &notice.body()) {
            tracing::warn!(title = notice.title(), error = %e, "notification not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::{Arc, Mutex};

    struct Flaky {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Notifier for Flaky {
        fn notify(&self, title: &str, _body: &str) -> AppResult<()> {
            self.seen.lock().unwrap().push(title.to_string());
            if title == "Timer started" {
                return Err(AppError::Notify("boom".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn dispatch_continues_after_a_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let n = Flaky { seen: seen.clone() };
        dispatch(
            &n,
            &[
                Notice::Started { job_name: "A".into() },
                Notice::Stopped { job_name: "A".into(), hours: 1.5 },
            ],
        );
        assert_eq!(*seen.lock().unwrap(), vec!["Timer started", "Timer stopped"]);
    }

    #[test]
    fn stopped_body_shows_two_decimals() {
        let n = Notice::Stopped { job_name: "Office".into(), hours: 1.5 };
        assert_eq!(n.body(), "Automatic timer stopped for \"Office\": 1.50h recorded");
    }

    #[test]
    fn scheduled_body_mentions_delay() {
        let n = Notice::Scheduled {
            job_name: "Office".into(),
            kind: ActionKind::Start,
            delay_minutes: 10,
            target_time: Utc::now(),
        };
        assert!(n.body().starts_with("Timer will start in 10 minutes for \"Office\""));
    }
}
