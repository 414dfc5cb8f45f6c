//! HTTP implementation of the auth gateway using reqwest.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    AuthGateway, AuthPayload, ProfileUpdate,
    errors::GatewayError,
    wire::{AuthBody, CredentialsBody, ErrorBody, UserBody},
};
use crate::{Result, store::CredentialStore, user::User};

/// Per-request timeout; bounds the session manager's `Checking` state.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Production gateway speaking to the catalog service over HTTP.
///
/// The credential store is read (never written) before each request: token
/// deployments get an `Authorization: Bearer` header, ambient deployments
/// rely on the client's cookie jar, which this gateway keeps enabled.
pub struct HttpGateway {
    base: Url,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpGateway {
    /// Create a gateway for the service at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. `http://localhost:5000`; a subpath
    ///   (`http://host/catalog`) is kept in every endpoint URL
    /// * `credentials` - The deployment's credential store, shared with the
    ///   session manager
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| GatewayError::InvalidBaseUrl {
            reason: e.to_string(),
        })?;
        // Endpoint paths join as relative references, which only lands them
        // under a base subpath when the base path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| GatewayError::Initialization {
                reason: e.to_string(),
            })?;

        Ok(Self {
            base,
            client,
            credentials,
        })
    }

    /// The service root this gateway talks to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join a service path (no leading slash) under the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| {
                GatewayError::InvalidBaseUrl {
                    reason: format!("{path}: {e}"),
                }
                .into()
            })
    }

    /// Attach the stored bearer token, if the deployment holds one.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self.credentials.load().await? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }

    async fn send(&self, request: RequestBuilder, endpoint: &Url) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_failure(response).await.into())
        }
    }

    async fn parse<T: DeserializeOwned>(&self, response: Response, endpoint: &Url) -> Result<T> {
        response.json().await.map_err(|e| {
            GatewayError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn auth_call(&self, path: &str, username: &str, password: &str) -> Result<AuthPayload> {
        let endpoint = self.endpoint(path)?;
        let request = self
            .client
            .post(endpoint.clone())
            .json(&CredentialsBody { username, password });
        let response = self.send(request, &endpoint).await?;
        let body: AuthBody = self.parse(response, &endpoint).await?;

        Ok(AuthPayload {
            user: body.user.into_user(),
            token: body.token,
        })
    }
}

// Manual impl: `dyn CredentialStore` carries no `Debug` bound.
impl fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base", &self.base)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

/// Turn a non-success response into the matching gateway error, pulling the
/// server's `message` out of the body when there is one.
async fn classify_failure(response: Response) -> GatewayError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    if status == StatusCode::UNAUTHORIZED {
        GatewayError::Unauthorized { message }
    } else if status.is_server_error() {
        GatewayError::Server {
            status: status.as_u16(),
            message,
        }
    } else {
        GatewayError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn register(&self, username: &str, password: &str) -> Result<AuthPayload> {
        self.auth_call("api/auth/register", username, password).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        self.auth_call("api/auth/login", username, password).await
    }

    async fn logout(&self) -> Result<()> {
        let endpoint = self.endpoint("api/auth/logout")?;
        let request = self.authorize(self.client.post(endpoint.clone())).await?;
        self.send(request, &endpoint).await?;
        Ok(())
    }

    async fn me(&self) -> Result<User> {
        let endpoint = self.endpoint("api/auth/me")?;
        let request = self.authorize(self.client.get(endpoint.clone())).await?;
        let response = self.send(request, &endpoint).await?;
        let body: UserBody = self.parse(response, &endpoint).await?;
        Ok(body.user.into_user())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let endpoint = self.endpoint("api/users/profile")?;

        let mut form = multipart::Form::new().text("username", update.username);
        if let Some(avatar) = update.avatar {
            let part = multipart::Part::bytes(avatar.bytes)
                .file_name(avatar.filename)
                .mime_str(&avatar.content_type)
                .map_err(|e| GatewayError::InvalidPayload {
                    reason: format!("avatar content type: {e}"),
                })?;
            form = form.part("avatar", part);
        }

        let request = self
            .authorize(self.client.put(endpoint.clone()).multipart(form))
            .await?;
        let response = self.send(request, &endpoint).await?;
        let body: UserBody = self.parse(response, &endpoint).await?;
        Ok(body.user.into_user())
    }
}
