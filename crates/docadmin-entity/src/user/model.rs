//! User models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use docadmin_core::AppError;

use super::role::UserRole;
use super::status::UserStatus;

/// A console user as returned by `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Record identifier used in `/admin/users/{id}`.
    pub id: String,
    /// Identity provider account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Human-readable display name.
    #[serde(default)]
    pub display_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Assigned role.
    #[serde(default)]
    pub role: UserRole,
    /// Account status.
    #[serde(default)]
    pub status: UserStatus,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the account is active.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Create/edit form for a user (`POST /admin/users`, `PUT /admin/users/{id}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserForm {
    /// Display name.
    #[validate(length(min = 1, message = "Name and email are required"))]
    pub display_name: String,
    /// Email address.
    #[validate(
        length(min = 1, message = "Name and email are required"),
        email(message = "Invalid email")
    )]
    pub email: String,
    /// Assigned role.
    #[validate(custom(function = "validate_role"))]
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// Initial password; required when creating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserForm {
    /// Prefill an edit form from an existing record.
    pub fn from_user(user: &User) -> Self {
        Self {
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status,
            password: None,
        }
    }

    /// Validate for account creation.
    pub fn validate_for_create(&self) -> Result<(), AppError> {
        self.validate_for_update()?;
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => Ok(()),
            _ => Err(AppError::validation(
                "A password is required when creating a user",
            )),
        }
    }

    /// Validate for editing an existing account.
    pub fn validate_for_update(&self) -> Result<(), AppError> {
        self.validate().map_err(|errors| {
            let message = first_message(&errors).unwrap_or_else(|| errors.to_string());
            AppError::validation(message)
        })
    }
}

/// Body of `POST /admin/users/change-password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePassword {
    /// Account email.
    pub email: String,
    /// Replacement password.
    pub new_password: String,
}

/// The signed-in principal as reported by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Identity provider account id.
    pub uid: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Assigned role.
    #[serde(default)]
    pub role: Option<UserRole>,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn validate_role(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_assignable() {
        Ok(())
    } else {
        Err(ValidationError::new("role").with_message("Select a valid role".into()))
    }
}

fn first_message(errors: &validator::ValidationErrors) -> Option<String> {
    // Field order is not stable in the error map; report in form order.
    ["display_name", "email", "role"]
        .iter()
        .filter_map(|field| errors.field_errors().get(*field).cloned())
        .flat_map(|errs| errs.into_iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> UserForm {
        UserForm {
            display_name: "Ana Pérez".to_string(),
            email: "ana@example.org".to_string(),
            role: UserRole::Supervisor,
            status: UserStatus::Active,
            password: Some("s3cret!!".to_string()),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(form().validate_for_create().is_ok());
    }

    #[test]
    fn test_name_and_email_required() {
        let mut f = form();
        f.display_name.clear();
        let err = f.validate_for_create().unwrap_err();
        assert_eq!(err.message, "Name and email are required");
    }

    #[test]
    fn test_password_required_only_on_create() {
        let mut f = form();
        f.password = None;
        assert!(f.validate_for_create().is_err());
        assert!(f.validate_for_update().is_ok());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut f = form();
        f.role = UserRole::Other("auditor".to_string());
        let err = f.validate_for_update().unwrap_err();
        assert_eq!(err.message, "Select a valid role");
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "display_name": "Ana",
            "email": "ana@example.org",
            "role": "admin",
            "status": "inactive",
            "department": "legal"
        }))
        .unwrap();
        assert!(user.is_admin());
        assert!(!user.is_active());
        assert_eq!(user.extra["department"], "legal");
    }
}
