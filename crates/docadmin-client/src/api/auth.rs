//! Signed-in principal endpoints.

use serde_json::{Map, Value};

use docadmin_core::result::AppResult;
use docadmin_entity::user::CurrentUser;

use crate::http::{ApiClient, ApiRequest};

/// Fetcher for `/auth/*`.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Create a fetcher on top of the shared adapter.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The principal the current credential belongs to.
    pub async fn me(&self) -> AppResult<CurrentUser> {
        self.client.json(ApiRequest::get("/auth/me")).await
    }

    /// The stored profile of the signed-in user.
    pub async fn profile(&self) -> AppResult<Map<String, Value>> {
        self.client.json(ApiRequest::get("/auth/profile")).await
    }
}
