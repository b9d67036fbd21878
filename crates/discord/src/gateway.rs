//! Outbound Discord operations.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::http::Http,
    tracing::debug,
};

use autodelete_channels::{ChannelGateway, DeleteError, Error, Result};

use crate::ids;

/// [`ChannelGateway`] over serenity's REST client.
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Map a serenity error to the retention core's delete outcome.
pub fn classify_delete_error(err: &serenity::Error) -> DeleteError {
    let status = match err {
        serenity::Error::Http(http_err) => http_err.status_code().map(|s| s.as_u16()),
        _ => None,
    };
    match status {
        Some(status) => delete_error_for_status(status, err),
        None => DeleteError::Transient(err.to_string()),
    }
}

fn delete_error_for_status(status: u16, err: &impl std::fmt::Display) -> DeleteError {
    match status {
        404 => DeleteError::NotFound,
        403 => DeleteError::PermissionDenied,
        _ => DeleteError::Transient(format!("HTTP {status}: {err}")),
    }
}

#[async_trait]
impl ChannelGateway for DiscordGateway {
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> std::result::Result<(), DeleteError> {
        // An id that cannot be a snowflake names no message.
        let (Ok(channel), Ok(message)) = (ids::channel_id(channel_id), ids::message_id(message_id))
        else {
            return Err(DeleteError::NotFound);
        };

        channel
            .delete_message(&self.http, message)
            .await
            .map_err(|e| classify_delete_error(&e))?;
        debug!(channel_id, message_id, "discord message deleted");
        Ok(())
    }

    async fn send_notice(&self, channel_id: &str, text: &str) -> Result<()> {
        let channel = ids::channel_id(channel_id)?;
        channel
            .say(&self.http, text)
            .await
            .map_err(|e| Error::external("send discord message", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(delete_error_for_status(404, &"Unknown Message"), DeleteError::NotFound);
        assert_eq!(
            delete_error_for_status(403, &"Missing Permissions"),
            DeleteError::PermissionDenied
        );
        assert!(matches!(
            delete_error_for_status(429, &"rate limited"),
            DeleteError::Transient(ref m) if m.starts_with("HTTP 429")
        ));
        assert!(matches!(
            delete_error_for_status(500, &"boom"),
            DeleteError::Transient(_)
        ));
    }

    #[test]
    fn non_http_errors_are_transient() {
        let err = serenity::Error::Other("socket closed");
        assert!(matches!(classify_delete_error(&err), DeleteError::Transient(_)));
    }
}
