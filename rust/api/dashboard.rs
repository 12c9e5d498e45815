use crate::client::ApiClient;
use crate::error::PortalResult;
use crate::models::Role;
use crate::transport::ApiRequest;

/// Aggregate metrics for the role's dashboard, passed through untouched.
pub async fn fetch(client: &ApiClient, role: Role) -> PortalResult<serde_json::Value> {
    let path = match role {
        Role::Admin => "dashboard/admin",
        Role::Student => "dashboard/student",
    };
    client.fetch(ApiRequest::get(path)).await
}
