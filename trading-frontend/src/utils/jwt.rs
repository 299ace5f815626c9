use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

/// Decode JWT claims without validation.
///
/// Access tokens reach us straight from the identity provider over the
/// authenticated exchange that minted them, so the signature is the
/// provider's problem; we only need the subject and email for the session.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_subject_and_email() {
        // Payload: {"sub":"user_123","email":"test@example.com","exp":9999999999}
        let payload = general_purpose::URL_SAFE_NO_PAD
            .encode(r#"{"sub":"user_123","email":"test@example.com","exp":9999999999}"#);
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{}.signature", payload);

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(decode_jwt_claims("not-a-jwt").is_err());
        assert!(decode_jwt_claims("a.b").is_err());
    }
}
