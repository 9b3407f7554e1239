//! User accounts, roles and authentication primitives.

pub mod auth;
pub mod user;

pub use user::{
    AdminUpdateUserRequest, AuthToken, Claims, LoginRequest, RegisterRequest,
    Role, UpdateProfileRequest, User,
};
