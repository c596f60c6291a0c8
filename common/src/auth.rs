//! Login, signup, verification and password-reset payloads.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::SessionUser;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const OTP_LEN: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

/// Generic `{ message }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

// ── client-side validation ───────────────────────────────────────────────

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let ok = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Invalid("Enter a valid email address.".into()))
    }
}

pub fn validate_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if password != confirm {
        return Err(Error::Invalid("Passwords do not match.".into()));
    }
    Ok(())
}

pub fn validate_otp(otp: &str) -> Result<()> {
    let otp = otp.trim();
    if otp.len() == OTP_LEN && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::Invalid(format!("The code must be {OTP_LEN} digits.")))
    }
}

impl SignupRequest {
    pub fn validated(username: &str, email: &str, password: &str, confirm: &str) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(Error::Invalid("Username is required.".into()));
        }
        validate_email(email)?;
        validate_password(password, confirm)?;
        Ok(Self {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }
}

/// Link to the verification page with `email` prefilled, query-encoded so
/// addresses like `a+b@x.org` survive the round trip.
pub fn verify_path(email: &str) -> Result<String> {
    let mut url = reqwest::Url::parse("http://localhost/verify")
        .map_err(|e| Error::Invalid(format!("verify link: {e}")))?;
    url.query_pairs_mut().append_pair("email", email.trim());
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email(" ana@example.com ").is_ok());
        assert!(validate_email("ana@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ana.example.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("longenough", "longenough").is_ok());
        assert!(validate_password("short", "short").is_err());
        assert!(validate_password("longenough", "different1").is_err());
    }

    #[test]
    fn test_otp_rules() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12a456").is_err());
    }

    #[test]
    fn test_signup_trims() {
        let s = SignupRequest::validated(" lea ", "lea@example.com ", "password1", "password1")
            .unwrap();
        assert_eq!(s.username, "lea");
        assert_eq!(s.email, "lea@example.com");
        assert!(SignupRequest::validated("", "lea@example.com", "password1", "password1").is_err());
    }

    #[test]
    fn test_reset_request_is_camel_case() {
        let r = ResetPasswordRequest {
            email: "a@b.co".into(),
            otp: "123456".into(),
            new_password: "password1".into(),
        };
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["newPassword"], "password1");
    }

    #[test]
    fn test_verify_path_encodes_email() {
        assert_eq!(verify_path("a+b@x.org").unwrap(), "/verify?email=a%2Bb%40x.org");
        assert_eq!(verify_path(" kai@example.com ").unwrap(), "/verify?email=kai%40example.com");
    }
}
