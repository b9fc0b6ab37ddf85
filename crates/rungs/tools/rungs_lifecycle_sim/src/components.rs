//! Sample components: a UI-side presenter and an IO-side gateway.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rungs::{Component, Params};
use tracing::info;

pub const ENDPOINT_PARAM: &str = "endpoint";

/// Counts how often it was shown to the user.
#[derive(Debug, Default)]
pub struct Presenter {
    shown: AtomicUsize,
}

impl Presenter {
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }
}

impl Component for Presenter {
    fn logs_lifecycle(&self) -> bool {
        true
    }

    fn did_become_active(&self) {
        let shown = self.shown.fetch_add(1, Ordering::SeqCst) + 1;
        info!(shown, "presenter visible");
    }

    fn did_become_inactive(&self) {
        info!("presenter hidden");
    }
}

/// Holds a connection to `endpoint` while in the foreground.
#[derive(Debug, Default)]
pub struct Gateway {
    endpoint: Mutex<Option<String>>,
    connected: Mutex<bool>,
    polls: AtomicUsize,
}

impl Gateway {
    pub fn endpoint(&self) -> Option<String> {
        self.endpoint.lock().ok().and_then(|endpoint| endpoint.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.lock().map(|c| *c).unwrap_or(false)
    }

    /// One unit of gateway work. Callers gate it on activity.
    pub fn poll(&self) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    fn set_connected(&self, connected: bool) {
        if let Ok(mut current) = self.connected.lock() {
            *current = connected;
        }
    }
}

impl Component for Gateway {
    fn on_set_up(&self, params: &Params) {
        let endpoint = params.get::<String>(ENDPOINT_PARAM).cloned();
        if let Ok(mut current) = self.endpoint.lock() {
            *current = endpoint;
        }
    }

    fn on_enter_foreground(&self) {
        self.set_connected(true);
        info!(endpoint = ?self.endpoint(), "gateway connected");
    }

    fn on_enter_background(&self) {
        self.set_connected(false);
        info!("gateway disconnected");
    }
}
