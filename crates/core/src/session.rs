use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    authenticated: bool,
    pending_auth_code: Option<String>,
}

/// Process-wide broker session shared by the callback listener (writer) and
/// the authentication handshake (reader).
///
/// Created empty at startup, populated once by the handshake and never
/// persisted. All access goes through the internal lock so the callback's
/// write is visible to the next poll.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an authorization code delivered by the broker redirect and mark
    /// the session authenticated. Last write wins.
    pub fn record_callback(&self, auth_code: impl Into<String>) {
        let mut state = self.lock();
        state.pending_auth_code = Some(auth_code.into());
        state.authenticated = true;
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().authenticated
    }

    pub fn pending_auth_code(&self) -> Option<String> {
        self.lock().pending_auth_code.clone()
    }

    /// Consume the pending authorization code.
    pub fn take_auth_code(&self) -> Option<String> {
        self.lock().pending_auth_code.take()
    }

    /// Clear the authenticated flag ahead of a fresh handshake.
    pub fn begin_handshake(&self) {
        let mut state = self.lock();
        state.authenticated = false;
        state.pending_auth_code = None;
    }

    pub fn set_access_token(&self, access_token: impl Into<String>) {
        self.lock().access_token = Some(access_token.into());
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock().access_token.clone()
    }
}
