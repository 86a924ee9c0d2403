//! Hooks the create workflow calls on the surrounding action

/// Generic action lifecycle. The workflow only decides when these run.
#[cfg_attr(test, mockall::automock)]
pub trait ActionLifecycle: Send {
    /// Run the configured after-action hooks
    fn call_after(&mut self);

    fn send_success_notification(&mut self, title: &str);

    /// Terminal success: notify, then run after-action hooks
    fn success(&mut self, title: &str) {
        self.send_success_notification(title);
        self.call_after();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    After,
    Notified(String),
}

/// Lifecycle that logs each hook and keeps a history of them
#[derive(Debug, Default)]
pub struct RecordingLifecycle {
    events: Vec<LifecycleEvent>,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    pub fn last_notification(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            LifecycleEvent::Notified(title) => Some(title.as_str()),
            LifecycleEvent::After => None,
        })
    }
}

impl ActionLifecycle for RecordingLifecycle {
    fn call_after(&mut self) {
        tracing::debug!("running after-action hooks");
        self.events.push(LifecycleEvent::After);
    }

    fn send_success_notification(&mut self, title: &str) {
        tracing::info!(title, "success notification");
        self.events.push(LifecycleEvent::Notified(title.to_string()));
    }
}
