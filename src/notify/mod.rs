use crate::util::now_ms;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

pub(crate) const DEFAULT_NOTICE_MS: i32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Severity {
    Success,
    Error,
    Info,
}

/// Transient feedback message. Never persisted; lost on reload by design.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Notice {
    /// Push timestamp, nudged monotonic so it doubles as a uniqueness key.
    pub id: i64,
    pub message: String,
    pub severity: Severity,
    pub expires_at_ms: i64,
}

/// Timestamp-based id; bumped past `last_id` so two pushes within the same
/// millisecond stay distinguishable.
pub(crate) fn next_notice_id(now_ms: i64, last_id: i64) -> i64 {
    now_ms.max(last_id.saturating_add(1))
}

/// Drop every notice whose lifetime has elapsed. Timers call this with the
/// real clock; tests with a fake one.
pub(crate) fn prune_expired(items: Vec<Notice>, now_ms: i64) -> Vec<Notice> {
    items
        .into_iter()
        .filter(|n| n.expires_at_ms > now_ms)
        .collect()
}

pub(crate) fn remove_notice(items: Vec<Notice>, id: i64) -> Vec<Notice> {
    items.into_iter().filter(|n| n.id != id).collect()
}

/// In-memory queue of stacked notices. Each push schedules its own removal;
/// timers are independent, so overlapping notices expire on their own
/// schedules without coalescing.
#[derive(Clone, Copy)]
pub(crate) struct Notifier {
    pub items: RwSignal<Vec<Notice>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(vec![]),
        }
    }

    pub fn push(&self, message: impl Into<String>, severity: Severity, duration_ms: i32) -> i64 {
        let now = now_ms();
        let last_id = self
            .items
            .with_untracked(|v| v.last().map(|n| n.id).unwrap_or(0));
        let id = next_notice_id(now, last_id);

        let notice = Notice {
            id,
            message: message.into(),
            severity,
            expires_at_ms: now + duration_ms.max(0) as i64,
        };
        self.items.update(|v| v.push(notice));

        self.schedule_expiry(duration_ms.max(0));
        id
    }

    pub fn success(&self, message: impl Into<String>) -> i64 {
        self.push(message, Severity::Success, DEFAULT_NOTICE_MS)
    }

    pub fn error(&self, message: impl Into<String>) -> i64 {
        self.push(message, Severity::Error, DEFAULT_NOTICE_MS)
    }

    pub fn info(&self, message: impl Into<String>) -> i64 {
        self.push(message, Severity::Info, DEFAULT_NOTICE_MS)
    }

    pub fn dismiss(&self, id: i64) {
        self.items.update(|v| *v = remove_notice(std::mem::take(v), id));
    }

    fn schedule_expiry(&self, after_ms: i32) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let items = self.items;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            items.update(|v| *v = prune_expired(std::mem::take(v), now_ms()));
        });

        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            after_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(id: i64, expires_at_ms: i64) -> Notice {
        Notice {
            id,
            message: format!("n{id}"),
            severity: Severity::Info,
            expires_at_ms,
        }
    }

    #[test]
    fn notice_survives_half_its_duration_and_not_past_it() {
        let pushed_at = 1_000;
        let duration = 4_000i64;
        let items = vec![notice(pushed_at, pushed_at + duration)];

        let at_half = prune_expired(items.clone(), pushed_at + duration / 2);
        assert_eq!(at_half.len(), 1);

        let past = prune_expired(items, pushed_at + duration + 1);
        assert!(past.is_empty());
    }

    #[test]
    fn timers_are_independent_per_notice() {
        let items = vec![notice(1, 5_000), notice(2, 9_000)];
        let after_first = prune_expired(items, 6_000);
        assert_eq!(after_first, vec![notice(2, 9_000)]);
    }

    #[test]
    fn duplicates_stack_without_coalescing() {
        // Same message, same severity: both stay queued.
        let a = Notice {
            id: 1,
            message: "Saved".to_string(),
            severity: Severity::Success,
            expires_at_ms: 5_000,
        };
        let b = Notice { id: 2, ..a.clone() };
        let items = prune_expired(vec![a, b], 1_000);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn dismiss_removes_only_the_target() {
        let items = vec![notice(1, 5_000), notice(2, 5_000)];
        let left = remove_notice(items, 1);
        assert_eq!(left, vec![notice(2, 5_000)]);
    }

    #[test]
    fn ids_are_monotonic_within_a_millisecond() {
        let first = next_notice_id(1_000, 0);
        let second = next_notice_id(1_000, first);
        assert_eq!(first, 1_000);
        assert_eq!(second, 1_001);
        // Clock moving forward takes over again.
        assert_eq!(next_notice_id(2_000, second), 2_000);
    }
}
