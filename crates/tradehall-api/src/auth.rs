use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use tradehall_types::api::Claims;

/// Issue an HS256 service token for an internal caller of the signing API.
pub fn create_token(secret: &str, service: &str, ttl: chrono::Duration) -> anyhow::Result<String> {
    let claims = Claims {
        sub: Uuid::new_v4(),
        service: service.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
