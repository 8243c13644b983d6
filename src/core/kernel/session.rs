use crate::core::errors::PanelError;
use async_trait::async_trait;

/// An authentication artifact for one remote panel.
///
/// Bound to one `(base URL, username, password)` tuple. The remote panels
/// never communicate an expiry, so a session is acquired at the start of a
/// connector operation, used for that operation's HTTP call sequence, and
/// dropped. Nothing caches sessions across gateway calls.
#[derive(Debug, Clone)]
pub enum Session {
    /// 3x-ui: the values of the login response's `Set-Cookie` headers.
    Cookies(Vec<String>),
    /// Marzban: a bearer access token.
    Bearer(String),
}

impl Session {
    /// The header this session contributes to each outbound request.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::Cookies(cookies) => {
                // Set-Cookie values carry attributes (Path, HttpOnly, ...);
                // only the leading name=value pair goes back to the server.
                let pairs: Vec<&str> = cookies
                    .iter()
                    .filter_map(|c| c.split(';').next())
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect();
                ("Cookie", pairs.join("; "))
            }
            Self::Bearer(token) => ("Authorization", format!("Bearer {}", token)),
        }
    }
}

/// Per-backend login protocol, masked behind one acquisition call.
///
/// Implementations perform the backend's login handshake and translate its
/// failures: timeout is `Unreachable`, refused is `Offline`, a rejected
/// login is `InvalidCredentials`. No retry happens here; retry policy
/// belongs to the caller.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn acquire(&self) -> Result<Session, PanelError>;
}
