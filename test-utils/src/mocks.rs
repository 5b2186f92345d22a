//! Mock implementations for testing.
//!
//! [`MockSecretsApi`] replays scripted responses per operation and records
//! every call it receives.

use async_trait::async_trait;
use secrets_manager::{
    InstanceLocation, Secret, SecretIdentity, SecretsApi, SecretsManagerError,
    SecretsManagerResult,
    prototype::{SecretMetadataPatch, SecretPrototype},
};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// A scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Success; for create and get the value is decoded as the secret
    Secret(Value),
    /// Success without a body
    Ok,
    /// Failure with an HTTP status and body
    Status(u16, String),
}

impl MockResponse {
    /// A 404 response.
    #[must_use]
    pub fn not_found() -> Self {
        Self::Status(404, "secret not found".to_string())
    }
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    /// `create_secret`
    Create {
        /// Target instance
        location: InstanceLocation,
        /// Serialized prototype
        body: Value,
    },
    /// `get_secret`
    Get(SecretIdentity),
    /// `update_secret_metadata`
    UpdateMetadata {
        /// Target secret
        identity: SecretIdentity,
        /// Serialized patch
        body: Value,
    },
    /// `delete_secret`
    Delete(SecretIdentity),
}

/// Scripted in-memory secrets API.
///
/// Each operation has its own response queue. Responses are consumed in
/// order and the last one repeats forever. An empty queue answers create
/// and get with a 500, and update and delete with success.
#[derive(Debug, Default)]
pub struct MockSecretsApi {
    create: RwLock<VecDeque<MockResponse>>,
    get: RwLock<VecDeque<MockResponse>>,
    update: RwLock<VecDeque<MockResponse>>,
    delete: RwLock<VecDeque<MockResponse>>,
    calls: RwLock<Vec<ApiCall>>,
}

impl MockSecretsApi {
    /// Create a mock with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `create_secret`.
    #[must_use]
    pub fn on_create(mut self, response: MockResponse) -> Self {
        self.create.get_mut().push_back(response);
        self
    }

    /// Queue a response for `get_secret`.
    #[must_use]
    pub fn on_get(mut self, response: MockResponse) -> Self {
        self.get.get_mut().push_back(response);
        self
    }

    /// Queue several responses for `get_secret`.
    #[must_use]
    pub fn on_get_sequence(mut self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        self.get.get_mut().extend(responses);
        self
    }

    /// Queue a response for `update_secret_metadata`.
    #[must_use]
    pub fn on_update(mut self, response: MockResponse) -> Self {
        self.update.get_mut().push_back(response);
        self
    }

    /// Queue a response for `delete_secret`.
    #[must_use]
    pub fn on_delete(mut self, response: MockResponse) -> Self {
        self.delete.get_mut().push_back(response);
        self
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<ApiCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Number of `get_secret` calls received so far.
    pub async fn get_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| matches!(call, ApiCall::Get(_)))
            .count()
    }

    async fn record(&self, call: ApiCall) {
        self.calls.write().await.push(call);
    }

    async fn next(queue: &RwLock<VecDeque<MockResponse>>) -> Option<MockResponse> {
        let mut queue = queue.write().await;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn into_secret(operation: &'static str, response: Option<MockResponse>) -> SecretsManagerResult<Secret> {
        match response {
            Some(MockResponse::Secret(value)) => Ok(serde_json::from_value(value)?),
            Some(MockResponse::Ok) => Err(SecretsManagerError::from_status(operation, 200, "empty body")),
            Some(MockResponse::Status(status, body)) => {
                Err(SecretsManagerError::from_status(operation, status, body))
            }
            None => Err(SecretsManagerError::from_status(operation, 500, "no scripted response")),
        }
    }

    fn into_unit(operation: &'static str, response: Option<MockResponse>) -> SecretsManagerResult<()> {
        match response {
            Some(MockResponse::Status(status, body)) => {
                Err(SecretsManagerError::from_status(operation, status, body))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SecretsApi for MockSecretsApi {
    async fn create_secret(
        &self,
        location: &InstanceLocation,
        prototype: &SecretPrototype,
    ) -> SecretsManagerResult<Secret> {
        self.record(ApiCall::Create {
            location: location.clone(),
            body: serde_json::to_value(prototype)?,
        })
        .await;
        Self::into_secret("create_secret", Self::next(&self.create).await)
    }

    async fn get_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<Secret> {
        self.record(ApiCall::Get(identity.clone())).await;
        Self::into_secret("get_secret", Self::next(&self.get).await)
    }

    async fn update_secret_metadata(
        &self,
        identity: &SecretIdentity,
        patch: &SecretMetadataPatch,
    ) -> SecretsManagerResult<()> {
        self.record(ApiCall::UpdateMetadata {
            identity: identity.clone(),
            body: serde_json::to_value(patch)?,
        })
        .await;
        Self::into_unit("update_secret_metadata", Self::next(&self.update).await)
    }

    async fn delete_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<()> {
        self.record(ApiCall::Delete(identity.clone())).await;
        Self::into_unit("delete_secret", Self::next(&self.delete).await)
    }
}
