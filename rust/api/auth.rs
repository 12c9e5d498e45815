use crate::client::{decode, ApiClient};
use crate::error::{PortalError, PortalResult};
use crate::models::{LoginRequest, LoginResponse, Role, Session};
use crate::router::Navigation;
use crate::transport::ApiRequest;
use crate::workflow::require;

/// Logs in, stores the session and lands on the role's home view.
pub async fn login(
    client: &ApiClient,
    user_id: &str,
    password: &str,
    role: Role,
) -> PortalResult<Navigation> {
    require(user_id, "userId")?;
    require(password, "password")?;

    let body = LoginRequest {
        user_id: user_id.trim().to_string(),
        password: password.to_string(),
        role,
    };
    let payload =
        serde_json::to_value(&body).map_err(|err| PortalError::Decode(err.to_string()))?;
    let request = ApiRequest::post("auth/login").json(payload);

    let resp = match client.execute_public(request).await {
        Ok(resp) => resp,
        Err(PortalError::Api { status, .. }) if (400..500).contains(&status) => {
            tracing::info!(status, "Login rejected");
            return Err(PortalError::Api {
                status,
                message: "Invalid credentials".to_string(),
            });
        }
        Err(err) => return Err(err),
    };
    let granted: LoginResponse = decode(&resp)?;

    let student_id = match granted.role {
        Role::Student => Some(body.user_id.clone()),
        Role::Admin => None,
    };
    client.session().save(&Session {
        role: granted.role,
        token: granted.token,
        student_id,
    })?;
    tracing::info!(role = %granted.role, "Login successful");

    Ok(client.navigator().navigate(granted.role.home_path()))
}

pub fn logout(client: &ApiClient) -> PortalResult<Navigation> {
    client.session().clear()?;
    tracing::info!("Logged out");
    Ok(client.navigator().navigate("/login"))
}
