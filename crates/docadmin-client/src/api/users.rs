//! User administration endpoints.

use serde_json::Value;
use tracing::info;

use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_entity::user::{ChangePassword, User, UserForm};

use crate::http::request::encode_segment;
use crate::http::{ApiClient, ApiRequest};

const USERS_PATH: &str = "/admin/users";

/// Fetcher for `/admin/users`.
#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    /// Create a fetcher on top of the shared adapter.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List every user.
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.client.json(ApiRequest::get(USERS_PATH)).await
    }

    /// Create a user. The form is validated before anything is sent.
    pub async fn create(&self, form: &UserForm) -> AppResult<Value> {
        form.validate_for_create()?;
        let response = self.client.json(ApiRequest::post(USERS_PATH).json(form)?).await?;
        info!(email = %form.email, role = %form.role, "User created");
        Ok(response)
    }

    /// Update a user. Any password on the form is not sent.
    pub async fn update(&self, id: &str, form: &UserForm) -> AppResult<Value> {
        form.validate_for_update()?;
        let body = UserForm {
            password: None,
            ..form.clone()
        };
        let path = format!("{USERS_PATH}/{}", encode_segment(id));
        let response = self.client.json(ApiRequest::put(path).json(&body)?).await?;
        info!(id, "User updated");
        Ok(response)
    }

    /// Delete a user.
    pub async fn delete(&self, id: &str) -> AppResult<Value> {
        let path = format!("{USERS_PATH}/{}", encode_segment(id));
        let response = self.client.json(ApiRequest::delete(path)).await?;
        info!(id, "User deleted");
        Ok(response)
    }

    /// Set a new password for the account with the given email.
    pub async fn change_password(&self, request: &ChangePassword) -> AppResult<Value> {
        if request.email.trim().is_empty() || request.new_password.is_empty() {
            return Err(AppError::validation("Email and new password are required"));
        }
        let response = self
            .client
            .json(ApiRequest::post(format!("{USERS_PATH}/change-password")).json(request)?)
            .await?;
        info!(email = %request.email, "User password changed");
        Ok(response)
    }
}
