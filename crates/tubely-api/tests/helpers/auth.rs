use super::TEST_JWT_SECRET;
use jsonwebtoken::{encode, EncodingKey, Header};
use tubely_api::auth::AccessClaims;
use tubely_api::constants::TOKEN_ISSUER;
use uuid::Uuid;

/// Mint an access token for `user_id`, valid for an hour.
pub fn token_for(user_id: Uuid) -> String {
    sign(user_id, 3600)
}

pub fn expired_token_for(user_id: Uuid) -> String {
    sign(user_id, -3600)
}

fn sign(user_id: Uuid, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + ttl_secs,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}
