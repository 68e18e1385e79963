use async_trait::async_trait;
use serde::Deserialize;
use solar_core::{AdminIdentity, AdminSession, AuthService, LoginCredentials, ServiceError};
use tracing::debug;

use crate::backend::{
    Backend, map_status_error, map_transport_error, session_cookie, with_session,
};

const LOGIN_PATH: &str = "admin/auth/login";
const LOGOUT_PATH: &str = "admin/auth/logout";

/// [`AuthService`] over the backend's `/admin/auth` routes.
pub struct HttpAuthService {
    backend: Backend,
}

impl HttpAuthService {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    user: Option<AdminIdentity>,
}

fn parse_login(body: &[u8]) -> Result<AdminIdentity, ServiceError> {
    let decoded: LoginResponse = serde_json::from_slice(body)
        .map_err(|e| ServiceError::Decode(format!("invalid login response: {e}")))?;
    decoded
        .user
        .ok_or_else(|| ServiceError::Decode("login response has no user".to_string()))
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AdminSession, ServiceError> {
        let response = self
            .backend
            .post(LOGIN_PATH)
            .json(credentials)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let credential = session_cookie(response.headers());
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }

        let identity = parse_login(&body)?;
        debug!(
            email = %identity.email,
            has_cookie = credential.is_some(),
            "login accepted"
        );
        Ok(AdminSession::new(identity, credential))
    }

    async fn logout(&self, session: &AdminSession) -> Result<(), ServiceError> {
        let response = with_session(self.backend.post(LOGOUT_PATH), session)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(status, &body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_user_from_login_response() {
        let body = br#"{"success":true,"message":"Login successful","user":{"_id":"66a1","email":"admin@sunrise.test","name":"Admin"}}"#;

        let identity = parse_login(body).expect("login body should decode");

        assert_eq!(identity.id.as_deref(), Some("66a1"));
        assert_eq!(identity.email, "admin@sunrise.test");
    }

    #[test]
    fn missing_user_is_decode_error() {
        let error = parse_login(br#"{"success":true}"#).expect_err("no user must fail");

        assert!(matches!(error, ServiceError::Decode(_)));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let error = parse_login(b"<html>").expect_err("html must fail");

        assert!(matches!(error, ServiceError::Decode(_)));
    }
}
