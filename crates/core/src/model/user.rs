use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("full name cannot be empty")]
    EmptyFullName,

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Access level attached to every account. The backend enforces it; the
/// client only uses it for route gating and admin-view filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Learner,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Learner => "learner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "learner" => Ok(Role::Learner),
            other => Err(UserError::UnknownRole(other.to_string())),
        }
    }
}

/// An account as reported by the backend.
///
/// `created_at` is optional because accounts seeded before the signup
/// timestamp column existed report no value.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    email: String,
    full_name: String,
    role: Role,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a user record.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyEmail` or `UserError::EmptyFullName` if either
    /// field is empty or whitespace-only.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        full_name: impl Into<String>,
        role: Role,
        is_active: bool,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, UserError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserError::EmptyEmail);
        }
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(UserError::EmptyFullName);
        }

        Ok(Self {
            id,
            email: email.trim().to_owned(),
            full_name: full_name.trim().to_owned(),
            role,
            is_active,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn user_new_trims_fields() {
        let user = User::new(
            UserId::random(),
            "  ada@example.com ",
            "  Ada Lovelace ",
            Role::Learner,
            true,
            Some(fixed_now()),
        )
        .unwrap();

        assert_eq!(user.email(), "ada@example.com");
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert!(!user.is_admin());
    }

    #[test]
    fn user_new_rejects_blank_email() {
        let err = User::new(UserId::random(), "  ", "Ada", Role::Learner, true, None).unwrap_err();
        assert_eq!(err, UserError::EmptyEmail);
    }

    #[test]
    fn role_parses_lowercase_names() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("learner".parse::<Role>().unwrap(), Role::Learner);
        assert!(matches!(
            "moderator".parse::<Role>().unwrap_err(),
            UserError::UnknownRole(_)
        ));
    }
}
