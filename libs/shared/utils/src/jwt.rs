use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{AuthUser, JwtClaims};

type HmacSha256 = Hmac<Sha256>;

/// Issue a signed session token bound to a user id. HMAC-SHA256 over the
/// usual `header.claims` base64url pair.
pub fn issue_token(
    user_id: &str,
    email: Option<&str>,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now();
    let exp = now + chrono::Duration::hours(ttl_hours);

    let header = serde_json::json!({
        "alg": "HS256",
        "typ": "JWT"
    });
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: Some(exp.timestamp() as u64),
        email: email.map(|e| e.to_string()),
        role: Some("patient".to_string()),
        iat: Some(now.timestamp() as u64),
    };
    let claims_json =
        serde_json::to_string(&claims).map_err(|e| format!("Failed to encode claims: {}", e))?;

    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json);
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", signing_input, signature_b64))
}

/// Verify a session token and resolve the identity it carries.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };
    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims
        .iat
        .map(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        created_at: created_at.flatten(),
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn issued_token_round_trips() {
        let token = issue_token("user-123", Some("a@b.com"), SECRET, 24).unwrap();
        let user = validate_token(&token, SECRET).unwrap();

        assert_eq!(user.id, "user-123");
        assert_eq!(user.email, Some("a@b.com".to_string()));
        assert_eq!(user.role, Some("patient".to_string()));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("user-123", None, SECRET, -1).unwrap();
        let err = validate_token(&token, SECRET).unwrap_err();
        assert_eq!(err, "Token expired");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("user-123", None, SECRET, 24).unwrap();
        let err = validate_token(&token, "another-secret").unwrap_err();
        assert_eq!(err, "Invalid token signature");
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let token = issue_token("user-123", None, SECRET, 24).unwrap();
        let mut parts: Vec<String> = token.split('.').map(|s| s.to_string()).collect();
        parts[1] = URL_SAFE_NO_PAD.encode(r#"{"sub":"someone-else"}"#);
        let forged = parts.join(".");

        assert!(validate_token(&forged, SECRET).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(validate_token("not-a-token", SECRET).is_err());
        assert!(validate_token("a.b", SECRET).is_err());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(issue_token("user-123", None, "", 24).is_err());
        assert!(validate_token("a.b.c", "").is_err());
    }
}
