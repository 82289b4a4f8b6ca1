use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::error::{UserError, UserResult};
use crate::password::hash_password;

/// Point-of-sale staff roles.
///
/// Parsing is exact and case-sensitive: `"admin"`, `"manager"`, `"cashier"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "cashier")]
    Cashier,
}

/// A stored user as returned by the API.
///
/// `Password` is the hex SHA-256 digest, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(rename = "UserID")]
    pub id: i32,
    #[serde(rename = "NamaUser")]
    pub nama_user: String,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

/// Request body for create and update, as JSON or form fields.
///
/// Missing fields decode as empty strings so they fail validation rather
/// than parsing. Unknown fields (e.g. a legacy `UserId`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(length(min = 1))]
    pub nama_user: String,
    #[validate(length(min = 1))]
    #[schema(example = "cashier")]
    pub role: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    #[schema(format = Password)]
    pub password: String,
}

/// A validated payload with the password already hashed; what repositories store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub nama_user: String,
    pub role: Role,
    pub username: String,
    pub password_hash: String,
}

impl NewUser {
    /// Empty fields first, then the role, then hashing.
    pub fn from_payload(payload: UserPayload) -> UserResult<Self> {
        payload.validate().map_err(empty_fields)?;

        let role = payload
            .role
            .parse::<Role>()
            .map_err(|_| UserError::InvalidRole)?;

        Ok(Self {
            nama_user: payload.nama_user,
            role,
            username: payload.username,
            password_hash: hash_password(&payload.password),
        })
    }
}

fn empty_fields(errors: ValidationErrors) -> UserError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|f| f.to_string())
        .collect();
    fields.sort();
    UserError::Validation(format!("Bad request: empty field(s): {}", fields.join(", ")))
}
