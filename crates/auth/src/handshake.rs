use crate::browser::Browser;
use kitemcp_core::{Authenticator, BrokerError, Session};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Timing of the login wait loop.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeConfig {
    /// How often the session is checked for a delivered code.
    pub poll_interval: Duration,
    /// Give up once this much time has passed without a redirect.
    pub deadline: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            deadline: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("no login redirect received within {0:?}")]
    Timeout(Duration),
    #[error("token exchange failed: {0}")]
    Exchange(#[from] BrokerError),
    #[error("login cancelled")]
    Cancelled,
}

/// Drive the login to completion.
///
/// Resets the session, opens the login page, then polls the session until the
/// callback listener records a code. The code is exchanged exactly once and the
/// resulting access token is bound to both the client and the session.
pub async fn run_handshake(
    auth: &dyn Authenticator,
    session: &Session,
    browser: &dyn Browser,
    api_secret: &str,
    config: HandshakeConfig,
    cancel: &CancellationToken,
) -> Result<(), HandshakeError> {
    session.begin_handshake();

    let login_url = auth.login_url();
    tracing::info!(url = %login_url, "Opening Kite login page");
    if let Err(e) = browser.open(&login_url) {
        tracing::warn!(error = %e, url = %login_url, "Could not open a browser, visit the URL manually");
    }

    let started = Instant::now();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(HandshakeError::Cancelled),
            _ = tokio::time::sleep(config.poll_interval) => {}
        }

        if session.is_authenticated() {
            break;
        }

        if started.elapsed() >= config.deadline {
            return Err(HandshakeError::Timeout(config.deadline));
        }

        tracing::warn!(url = %login_url, "Waiting for login, complete it at this URL");
    }

    // The flag and the code are written together, so a missing code here
    // means another reader consumed it.
    let request_token = session.take_auth_code().ok_or_else(|| {
        BrokerError::Configuration("login redirect carried no request token".to_string())
    })?;

    let user_session = auth.exchange_token(&request_token, api_secret).await?;
    auth.set_access_token(&user_session.access_token)?;
    session.set_access_token(user_session.access_token);

    tracing::info!(user_id = %user_session.user_id, "Kite session established");
    Ok(())
}
