//! Per-connection session bookkeeping.

/// State the protocol accumulates across frames: the host the service
/// reports for itself, the outbound request counter, and the registered
/// update-notification callback.
pub(crate) struct SessionState {
    pub(crate) real_host: Option<String>,
    next_request_id: u64,
    update_callback: Option<Box<dyn FnMut()>>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        SessionState {
            real_host: None,
            next_request_id: 0,
            update_callback: None,
        }
    }

    /// Pre-incremented allocation: the first id handed out is 1, so an id
    /// is assigned before any reply could reference it.
    pub(crate) fn allocate_request_id(&mut self) -> u64 {
        self.next_request_id += 1;
        self.next_request_id
    }

    /// Replaces any previously registered callback; at most one is active.
    pub(crate) fn set_update_callback(&mut self, callback: Box<dyn FnMut()>) {
        self.update_callback = Some(callback);
    }

    pub(crate) fn notify_update(&mut self) {
        if let Some(callback) = &mut self.update_callback {
            callback();
        }
    }
}
