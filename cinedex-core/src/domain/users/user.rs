//! User accounts and the requests that create or change them.
//!
//! Credentials are not part of [`User`]: the Argon2id hash lives in the
//! store's credential table and is only reachable through
//! [`UsersRepository`](crate::database::ports::UsersRepository), so a user
//! record can be serialized to clients as-is.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::validation::ValidationError,
    schema::{FieldKind, FieldSpec, Resource},
};

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Lowercase, 3-30 chars, alphanumeric + underscore
    pub username: String,
    /// Lowercase
    pub email: String,
    pub display_name: String,
    pub role: Role,
    /// Inactive accounts cannot log in and their tokens stop working
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Uuid),
        FieldSpec::new("username", FieldKind::Text),
        FieldSpec::new("email", FieldKind::Text),
        FieldSpec::new("display_name", FieldKind::Text),
        FieldSpec::new("role", FieldKind::Text),
        FieldSpec::new("is_active", FieldKind::Boolean),
        FieldSpec::new("last_login", FieldKind::Timestamp),
        FieldSpec::new("created_at", FieldKind::Timestamp),
        FieldSpec::new("updated_at", FieldKind::Timestamp),
    ];

    const SEARCH_FIELDS: &'static [&'static str] =
        &["username", "email", "display_name"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("email", self.email.clone()),
        ]
    }
}

impl User {
    /// Build the account described by a validated registration.
    pub fn register(request: &RegisterRequest, role: Role) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        let username = normalize_username(&request.username);
        let display_name = request
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| username.clone(), str::to_string);

        Self {
            id: Uuid::now_v7(),
            email: normalize_email(&request.email),
            username,
            display_name,
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().trunc_subsecs(6);
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&normalize_username(&self.username))?;
        validate_email(&normalize_email(&self.email))?;
        validate_password(&self.password)?;
        if let Some(name) = &self.display_name {
            // Blank display names fall back to the username.
            if !name.trim().is_empty() {
                validate_display_name(name)?;
            }
        }
        Ok(())
    }
}

/// Body of `POST /auth/login`. `username` may also be the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn is_email(&self) -> bool {
        self.username.contains('@')
    }

    pub fn identifier(&self) -> String {
        if self.is_email() {
            normalize_email(&self.username)
        } else {
            normalize_username(&self.username)
        }
    }
}

/// Body of `PATCH /users/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.display_name.is_none()
            && self.email.is_none()
            && self.new_password.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.display_name {
            validate_display_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(&normalize_email(email))?;
        }
        if let Some(password) = &self.new_password {
            validate_password(password)?;
            if self.current_password.is_none() {
                return Err(ValidationError::CurrentPasswordRequired);
            }
        }
        Ok(())
    }

    /// Apply the profile fields (not the password) to `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.display_name {
            user.display_name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            user.email = normalize_email(email);
        }
        user.touch();
    }
}

/// Body of `PATCH /users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl AdminUpdateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.display_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
        {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(name) = &self.display_name {
            validate_display_name(name)?;
        }
        Ok(())
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.display_name {
            user.display_name = name.trim().to_string();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
        user.touch();
    }
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

/// Response of register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until `access_token` expires
    pub expires_in: u64,
    pub user: User,
}

pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if !(3..=30).contains(&len)
        || !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, a non-empty local part and a dot inside the
/// domain.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let valid = email.len() <= 254
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.split_once('.').is_some_and(|(host, tld)| {
                        !host.is_empty()
                            && !tld.is_empty()
                            && !tld.ends_with('.')
                    })
            }
            None => false,
        };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(ValidationError::InvalidPassword);
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if !(1..=100).contains(&len) {
        return Err(ValidationError::InvalidDisplayName);
    }
    Ok(())
}
