use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::credentials::CredentialLoader;
use crate::error::AppError;
use crate::models::AuthPayload;

/// Secret used when none is configured. Anyone who knows it can mint tokens.
pub const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// Who is making a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    Authenticated(String),
}

impl Identity {
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(username) => Some(username),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub username: String,
}

/// Issues and checks bearer tokens for the teachers listed in the credential file.
#[derive(Clone)]
pub struct Authenticator {
    credentials: CredentialLoader,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    pub fn new(credentials: CredentialLoader, secret: &[u8]) -> Self {
        // Issued tokens carry no exp and stay valid until the secret changes;
        // exp and nbf are still honoured when a token does carry them.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;

        Self {
            credentials,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = AuthPayload {
            username: username.to_owned(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Username carried by `token`, or `None` if it is malformed or mis-signed
    pub fn verify_token(&self, token: &str) -> Option<String> {
        match decode::<AuthPayload>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.username),
            Err(e) => {
                debug!("rejected bearer token: {e}");
                None
            }
        }
    }

    /// Resolve the caller. Absent, invalid, or stale tokens all yield `Anonymous`.
    pub fn resolve_current_user(&self, token: Option<&str>) -> Result<Identity, AppError> {
        let Some(username) = token.and_then(|t| self.verify_token(t)) else {
            return Ok(Identity::Anonymous);
        };

        let teachers = self.credentials.load_teachers()?;
        if !teachers.contains_key(&username) {
            warn!(username = %username, "token for unknown teacher");
            return Ok(Identity::Anonymous);
        }
        Ok(Identity::Authenticated(username))
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let teachers = self.credentials.load_teachers()?;

        match teachers.get(username) {
            Some(stored) if verify_password(stored, password) => {}
            _ => {
                warn!(username = %username, "login rejected");
                return Err(AppError::InvalidCredentials);
            }
        }

        let access_token = self.issue_token(username)?;
        info!(username = %username, "teacher logged in");
        Ok(LoginResponse {
            access_token,
            token_type: "bearer",
            username: username.to_owned(),
        })
    }
}

/// Plaintext, case-sensitive comparison
pub fn verify_password(stored: &str, provided: &str) -> bool {
    stored == provided
}

/// Gate for roster mutations
pub fn require_auth(identity: &Identity) -> Result<&str, AppError> {
    identity.username().ok_or(AppError::Unauthenticated)
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::write_temp_credentials;
    use serde_json::json;
    use std::fs;

    const TEACHERS: &str = r#"{"teachers": {"daniel": "Chess4Ever", "ms.rivera": "paint"}}"#;

    fn authenticator(name: &str) -> (Authenticator, std::path::PathBuf) {
        let path = write_temp_credentials(name, TEACHERS);
        (Authenticator::new(CredentialLoader::new(&path), b"test-secret"), path)
    }

    #[test]
    fn test_issue_and_verify_token() {
        let (auth, path) = authenticator("auth_roundtrip");
        let token = auth.issue_token("daniel").unwrap();
        assert_eq!(auth.verify_token(&token).as_deref(), Some("daniel"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_tampered_and_foreign_tokens_are_invalid() {
        let (auth, path) = authenticator("auth_tampered");
        let token = auth.issue_token("daniel").unwrap();

        // Swap the payload for one claiming another user; signature no longer matches
        let other = auth.issue_token("ms.rivera").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        assert_eq!(auth.verify_token(&parts.join(".")), None);

        let foreign = Authenticator::new(CredentialLoader::new(&path), b"another-secret");
        assert_eq!(auth.verify_token(&foreign.issue_token("daniel").unwrap()), None);

        assert_eq!(auth.verify_token("not-a-token"), None);
        assert_eq!(auth.verify_token(""), None);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let (auth, path) = authenticator("auth_expired");
        let key = EncodingKey::from_secret(b"test-secret");

        let expired = encode(
            &Header::default(),
            &json!({ "username": "daniel", "exp": 1 }),
            &key,
        )
        .unwrap();
        assert_eq!(auth.verify_token(&expired), None);
        assert_eq!(auth.resolve_current_user(Some(&expired)).unwrap(), Identity::Anonymous);

        let not_yet_valid = encode(
            &Header::default(),
            &json!({ "username": "daniel", "nbf": 4_102_444_800u64 }),
            &key,
        )
        .unwrap();
        assert_eq!(auth.verify_token(&not_yet_valid), None);
        assert_eq!(auth.resolve_current_user(Some(&not_yet_valid)).unwrap(), Identity::Anonymous);

        // A far-future exp is still accepted
        let long_lived = encode(
            &Header::default(),
            &json!({ "username": "daniel", "exp": 4_102_444_800u64 }),
            &key,
        )
        .unwrap();
        assert_eq!(auth.verify_token(&long_lived).as_deref(), Some("daniel"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_resolve_current_user() {
        let (auth, path) = authenticator("auth_resolve");
        let token = auth.issue_token("daniel").unwrap();

        assert_eq!(auth.resolve_current_user(None).unwrap(), Identity::Anonymous);
        assert_eq!(auth.resolve_current_user(Some("garbage")).unwrap(), Identity::Anonymous);
        assert_eq!(
            auth.resolve_current_user(Some(&token)).unwrap(),
            Identity::Authenticated("daniel".to_string())
        );

        // Valid signature, but the teacher is no longer listed
        let ghost = auth.issue_token("mr.gone").unwrap();
        assert_eq!(auth.resolve_current_user(Some(&ghost)).unwrap(), Identity::Anonymous);

        fs::write(&path, r#"{"teachers": {"ms.rivera": "paint"}}"#).unwrap();
        assert_eq!(auth.resolve_current_user(Some(&token)).unwrap(), Identity::Anonymous);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_login() {
        let (auth, path) = authenticator("auth_login");

        let response = auth.login("daniel", "Chess4Ever").expect("valid login");
        assert_eq!(response.username, "daniel");
        assert_eq!(response.token_type, "bearer");
        assert_eq!(auth.verify_token(&response.access_token).as_deref(), Some("daniel"));

        assert!(matches!(auth.login("daniel", "chess4ever"), Err(AppError::InvalidCredentials)));
        assert!(matches!(auth.login("Daniel", "Chess4Ever"), Err(AppError::InvalidCredentials)));
        assert!(matches!(auth.login("nobody", "Chess4Ever"), Err(AppError::InvalidCredentials)));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_login_with_missing_credential_file() {
        let auth = Authenticator::new(
            CredentialLoader::new(std::env::temp_dir().join("mergington_missing_teachers.json")),
            b"test-secret",
        );
        assert!(matches!(auth.login("daniel", "x"), Err(AppError::ConfigLoad(_))));
    }

    #[test]
    fn test_require_auth() {
        assert!(matches!(require_auth(&Identity::Anonymous), Err(AppError::Unauthenticated)));
        let identity = Identity::Authenticated("daniel".to_string());
        assert_eq!(require_auth(&identity).unwrap(), "daniel");
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
