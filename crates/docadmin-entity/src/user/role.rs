//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles assignable from the console.
///
/// Records fetched from the API may carry a role the console does not know;
/// it is kept verbatim in [`UserRole::Other`] so the record survives a
/// round-trip, but it can never be assigned through a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Secretariat staff.
    #[default]
    Secretaria,
    /// Supervisor.
    Supervisor,
    /// A role not known to this console.
    Other(String),
}

impl UserRole {
    /// Roles a form may assign.
    pub const ASSIGNABLE: [Self; 3] = [Self::Admin, Self::Secretaria, Self::Supervisor];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role belongs to the assignable set.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Secretaria => "secretaria",
            Self::Supervisor => "supervisor",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for UserRole {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "secretaria" => Self::Secretaria,
            "supervisor" => Self::Supervisor,
            _ => Self::Other(raw),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = docadmin_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.to_string()) {
            Self::Other(_) => Err(docadmin_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, secretaria, supervisor"
            ))),
            role => Ok(role),
        }
    }
}
