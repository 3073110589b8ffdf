use serde::Serialize;

/// Credential store failures.
///
/// The display strings are the messages shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("User already exists. Please sign in.")]
    AlreadyExists,
    #[error("No account found. Please register.")]
    NotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] notes_storage::StorageError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Success flag plus optional message, the shape handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<AuthResult<T>> for AuthResponse {
    fn from(result: AuthResult<T>) -> Self {
        match result {
            Ok(_) => Self {
                ok: true,
                error: None,
            },
            Err(e) => Self {
                ok: false,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_from_ok() {
        let response = AuthResponse::from(AuthResult::Ok(()));
        assert!(response.ok);
        assert_eq!(response.error, None);
        assert_eq!(serde_json::to_string(&response).unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn test_auth_response_from_err() {
        let response = AuthResponse::from(AuthResult::<()>::Err(AuthError::AlreadyExists));
        assert!(!response.ok);
        assert_eq!(
            response.error.as_deref(),
            Some("User already exists. Please sign in.")
        );
    }

    #[test]
    fn test_core_error_wraps_auth_transparently() {
        let err = CoreError::from(AuthError::NotFound);
        assert_eq!(err.to_string(), "No account found. Please register.");
    }
}
