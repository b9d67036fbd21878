//! In-process collaborator implementations for tests and dry runs.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use {async_trait::async_trait, tokio::time::Instant};

use crate::{AdminAuthorizer, ChannelGateway, DeleteError, Error, Result};

/// A delete request observed by [`RecordingGateway`].
#[derive(Debug, Clone)]
pub struct DeleteAttempt {
    pub channel_id: String,
    pub message_id: String,
    pub at: Instant,
    pub outcome: std::result::Result<(), DeleteError>,
}

/// Gateway that records every call instead of talking to a platform.
#[derive(Default)]
pub struct RecordingGateway {
    attempts: Mutex<Vec<DeleteAttempt>>,
    notices: Mutex<Vec<(String, String)>>,
    failures: Mutex<HashMap<String, DeleteError>>,
    notices_fail: Mutex<bool>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deletes of `message_id` fail with `error`.
    pub fn fail_delete(&self, message_id: impl Into<String>, error: DeleteError) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.insert(message_id.into(), error);
    }

    /// Make every `send_notice` call fail.
    pub fn fail_notices(&self) {
        *self.notices_fail.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    pub fn attempts(&self) -> Vec<DeleteAttempt> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Message ids whose delete succeeded, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.attempts()
            .into_iter()
            .filter(|a| a.outcome.is_ok())
            .map(|a| a.message_id)
            .collect()
    }

    /// `(channel_id, text)` pairs, in call order.
    pub fn notices(&self) -> Vec<(String, String)> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChannelGateway for RecordingGateway {
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> std::result::Result<(), DeleteError> {
        let outcome = {
            let failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
            match failures.get(message_id) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        };
        let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        attempts.push(DeleteAttempt {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            at: Instant::now(),
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn send_notice(&self, channel_id: &str, text: &str) -> Result<()> {
        if *self.notices_fail.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(Error::unavailable("notices disabled"));
        }
        let mut notices = self.notices.lock().unwrap_or_else(|e| e.into_inner());
        notices.push((channel_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Authorizer backed by a fixed set of `(server_id, user_id)` admin pairs.
#[derive(Default)]
pub struct StaticAuthorizer {
    admins: Mutex<HashSet<(String, String)>>,
    unavailable: Mutex<bool>,
}

impl StaticAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, server_id: impl Into<String>, user_id: impl Into<String>) {
        let mut admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        admins.insert((server_id.into(), user_id.into()));
    }

    /// Make every lookup fail, as if the platform could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap_or_else(|e| e.into_inner()) = unavailable;
    }
}

#[async_trait]
impl AdminAuthorizer for StaticAuthorizer {
    async fn is_admin(&self, server_id: &str, user_id: &str) -> Result<bool> {
        if *self.unavailable.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(Error::unavailable("member lookup failed"));
        }
        let admins = self.admins.lock().unwrap_or_else(|e| e.into_inner());
        Ok(admins.contains(&(server_id.to_string(), user_id.to_string())))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_successful_and_failed_deletes() {
        let gw = RecordingGateway::new();
        gw.fail_delete("m2", DeleteError::NotFound);

        gw.delete_message("c1", "m1").await.unwrap();
        assert_eq!(
            gw.delete_message("c1", "m2").await.unwrap_err(),
            DeleteError::NotFound
        );

        assert_eq!(gw.attempts().len(), 2);
        assert_eq!(gw.deleted(), vec!["m1".to_string()]);
    }

    #[tokio::test]
    async fn notices_can_be_made_to_fail() {
        let gw = RecordingGateway::new();
        gw.send_notice("c1", "hello").await.unwrap();
        gw.fail_notices();
        assert!(gw.send_notice("c1", "again").await.is_err());
        assert_eq!(gw.notices(), vec![("c1".to_string(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn authorizer_is_scoped_per_server() {
        let auth = StaticAuthorizer::new();
        auth.grant("g1", "u1");
        assert!(auth.is_admin("g1", "u1").await.unwrap());
        assert!(!auth.is_admin("g2", "u1").await.unwrap());
        assert!(!auth.is_admin("g1", "u2").await.unwrap());

        auth.set_unavailable(true);
        assert!(auth.is_admin("g1", "u1").await.is_err());
    }
}
