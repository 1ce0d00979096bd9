use kitemcp_core::Session;
use std::sync::Arc;

/// Shared state accessible by the callback route handlers.
#[derive(Clone)]
pub struct CallbackState {
    pub session: Arc<Session>,
}

impl CallbackState {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}
