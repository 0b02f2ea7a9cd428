use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

/// Reads the token payload without checking the signature. The result is
/// only fit for display (expiry countdown), never for authorization.
pub fn read_claims(token: &str) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token payload not decodable: {}", e);
            None
        }
    }
}

/// Expiry embedded in the token, if any.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = read_claims(token)?.exp?;
    Utc.timestamp_opt(exp, 0).single()
}
