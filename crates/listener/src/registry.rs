//! Listener registration and event fan-out.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use teardown::{ItemEvent, ItemListener};
use tracing::{debug, error};

/// What happened when one event was delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Listeners that returned normally.
    pub delivered: usize,
    /// Names of listeners that panicked.
    pub panicked: Vec<String>,
}

/// The set of listeners the host notifies about item events.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn ItemListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Listeners are notified in registration order.
    pub fn register(&mut self, listener: Arc<dyn ItemListener>) {
        debug!(listener = listener.name(), "Registered item listener");
        self.listeners.push(listener);
    }

    /// Delivers `event` to every registered listener.
    ///
    /// A panicking listener is logged and counted; delivery continues with the
    /// next one.
    pub fn deliver(&self, event: &ItemEvent) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for listener in &self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    error!(
                        listener = listener.name(),
                        item = %event.item.name(),
                        panic = panic_message(payload.as_ref()),
                        "Item listener panicked"
                    );
                    report.panicked.push(listener.name().to_string());
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("ListenerRegistry")
            .field("listeners", &names)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
