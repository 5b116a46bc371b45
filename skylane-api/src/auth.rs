use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skylane_core::identity::{Actor, Role};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Decode a bearer token issued by the identity layer into the acting
/// principal. The identity layer itself is outside this service.
pub fn authenticate(secret: &str, token: &str) -> Result<Actor, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    let claims = token_data.claims;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthenticationError("invalid subject claim".to_string()))?;
    let role = Role::parse(&claims.role)
        .ok_or_else(|| AppError::AuthenticationError("unknown role claim".to_string()))?;

    Ok(Actor { user_id, role })
}
