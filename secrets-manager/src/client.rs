//! Secrets manager HTTP client.

use crate::{
    api::SecretsApi,
    config::SecretsManagerConfig,
    error::{SecretsManagerError, SecretsManagerResult},
    identity::{InstanceLocation, SecretIdentity},
    prototype::{SecretMetadataPatch, SecretPrototype},
    secrets::Secret,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sm_common::{EndpointType, build_http_client, instance_endpoint};
use tracing::{debug, instrument};
use url::Url;

const MERGE_PATCH: &str = "application/merge-patch+json";

/// HTTP client for the secrets manager v2 API.
///
/// One client serves every instance: the base URL is resolved per request
/// from the identity being addressed.
pub struct SecretsManagerClient {
    http: Client,
    endpoint_type: EndpointType,
    endpoint_url: Option<Url>,
    access_token: SecretString,
}

impl SecretsManagerClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SecretsManagerConfig) -> SecretsManagerResult<Self> {
        let http = build_http_client(&config.http)?;

        Ok(Self {
            http,
            endpoint_type: config.endpoint_type,
            endpoint_url: config.endpoint_url.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn base_url(&self, location: &InstanceLocation) -> SecretsManagerResult<Url> {
        match &self.endpoint_url {
            Some(url) => Ok(url.clone()),
            None => Ok(instance_endpoint(
                &location.instance_id,
                &location.region,
                self.endpoint_type,
            )?),
        }
    }

    fn secrets_url(
        &self,
        location: &InstanceLocation,
        tail: &[&str],
    ) -> SecretsManagerResult<Url> {
        let mut url = self.base_url(location)?;
        url.path_segments_mut()
            .map_err(|()| SecretsManagerError::config("endpoint URL cannot be a base URL"))?
            .pop_if_empty()
            .extend(["api", "v2", "secrets"])
            .extend(tail);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.access_token.expose_secret())
            .header(header::ACCEPT, "application/json")
    }

    async fn send(
        operation: &'static str,
        request: RequestBuilder,
    ) -> SecretsManagerResult<Response> {
        let response = request.send().await.inspect_err(|e| {
            debug!(operation, error = %e, "Request failed to send");
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(operation, status = status.as_u16(), "Request rejected");
        Err(SecretsManagerError::from_status(
            operation,
            status.as_u16(),
            body,
        ))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> SecretsManagerResult<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SecretsApi for SecretsManagerClient {
    #[instrument(skip_all, fields(location = %location))]
    async fn create_secret(
        &self,
        location: &InstanceLocation,
        prototype: &SecretPrototype,
    ) -> SecretsManagerResult<Secret> {
        let url = self.secrets_url(location, &[])?;
        debug!(%url, "Creating secret");

        let response =
            Self::send("create_secret", self.request(Method::POST, url).json(prototype)).await?;
        Self::decode(response).await
    }

    #[instrument(skip_all, fields(identity = %identity))]
    async fn get_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<Secret> {
        let url = self.secrets_url(identity.location(), &[identity.secret_id()])?;
        debug!("Getting secret");

        let response = Self::send("get_secret", self.request(Method::GET, url)).await?;
        Self::decode(response).await
    }

    #[instrument(skip_all, fields(identity = %identity))]
    async fn update_secret_metadata(
        &self,
        identity: &SecretIdentity,
        patch: &SecretMetadataPatch,
    ) -> SecretsManagerResult<()> {
        let url = self.secrets_url(identity.location(), &[identity.secret_id(), "metadata"])?;
        let body = serde_json::to_vec(patch)?;
        debug!("Updating secret metadata");

        Self::send(
            "update_secret_metadata",
            self.request(Method::PATCH, url)
                .header(header::CONTENT_TYPE, MERGE_PATCH)
                .body(body),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(identity = %identity))]
    async fn delete_secret(&self, identity: &SecretIdentity) -> SecretsManagerResult<()> {
        let url = self.secrets_url(identity.location(), &[identity.secret_id()])?;
        debug!("Deleting secret");

        Self::send("delete_secret", self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
