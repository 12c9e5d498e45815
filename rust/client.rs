use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{PortalError, PortalResult};
use crate::router::Navigator;
use crate::session::SessionStore;
use crate::transport::{ApiRequest, ApiResponse, Transport};

const UNAUTHORIZED: u16 = 401;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Sends without a bearer token and without the session-expiry hook.
    /// Only the login call uses this.
    pub(crate) async fn execute_public(&self, request: ApiRequest) -> PortalResult<ApiResponse> {
        let method = request.method;
        let path = request.path.clone();
        let resp = self.transport.send(request).await?;
        tracing::debug!(method = method.as_str(), path = %path, status = resp.status, "API response");
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(api_error(&resp))
        }
    }

    /// The only place an unauthorized response is seen: the stored session is
    /// cleared and the navigator sent to login, whichever view made the call.
    pub async fn execute(&self, mut request: ApiRequest) -> PortalResult<ApiResponse> {
        request.bearer = self.session.token()?;
        let method = request.method;
        let path = request.path.clone();

        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(method = method.as_str(), path = %path, error = %err, "API request failed");
                return Err(err);
            }
        };
        tracing::debug!(method = method.as_str(), path = %path, status = resp.status, "API response");

        if resp.status == UNAUTHORIZED {
            self.expire_session();
            return Err(PortalError::SessionExpired);
        }
        if !resp.is_success() {
            return Err(api_error(&resp));
        }
        Ok(resp)
    }

    fn expire_session(&self) {
        tracing::warn!("Session expired, redirecting to login");
        if let Err(err) = self.session.clear() {
            tracing::error!(error = %err, "Failed to clear expired session");
        }
        self.navigator.redirect_to_login();
    }

    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> PortalResult<T> {
        let resp = self.execute(request).await?;
        decode(&resp)
    }

    /// For mutations whose response body is irrelevant.
    pub async fn perform(&self, request: ApiRequest) -> PortalResult<()> {
        self.execute(request).await.map(|_| ())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(resp: &ApiResponse) -> PortalResult<T> {
    // some endpoints answer 204 / empty body for an empty collection
    let body = if resp.body.trim().is_empty() {
        "null"
    } else {
        resp.body.as_str()
    };
    serde_json::from_str(body).map_err(|err| PortalError::Decode(err.to_string()))
}

fn api_error(resp: &ApiResponse) -> PortalError {
    let message = serde_json::from_str::<ErrorBody>(&resp.body)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .unwrap_or_else(|| {
            let text = resp.body.trim();
            if text.is_empty() {
                "request failed".to_string()
            } else {
                text.chars().take(200).collect()
            }
        });
    PortalError::Api {
        status: resp.status,
        message,
    }
}
