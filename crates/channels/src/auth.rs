use async_trait::async_trait;

use crate::Result;

/// Decides whether a user may run admin commands in a server.
#[async_trait]
pub trait AdminAuthorizer: Send + Sync {
    /// True if any of the user's roles in `server_id` grants administrator
    /// capability. Checked on every invocation, never cached by callers.
    async fn is_admin(&self, server_id: &str, user_id: &str) -> Result<bool>;
}
