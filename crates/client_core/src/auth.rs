//! Client-side checks run before the auth endpoints are called.

use shared::{
    domain::format_birth_date,
    protocol::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest},
};

use crate::error::ClientError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agreed_to_terms: bool,
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
}

impl RegistrationForm {
    pub fn into_request(self) -> Result<RegisterRequest, ClientError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ClientError::validation("Name is required"));
        }
        let email = self.email.trim().to_string();
        let Some((local_part, _)) = email.split_once('@') else {
            return Err(ClientError::validation("Enter valid email"));
        };
        check_new_password(&self.password, &self.confirm_password)?;
        if !self.agreed_to_terms {
            return Err(ClientError::validation("You must agree to continue"));
        }
        let birth_date = format_birth_date(self.birth_year, self.birth_month, self.birth_day)
            .ok_or_else(|| ClientError::validation("Enter a valid birth date"))?;

        Ok(RegisterRequest {
            username: local_part.to_string(),
            full_name: name.clone(),
            name,
            password: self.password,
            birth_date,
            email,
        })
    }
}

pub fn login_request(email: &str, password: &str) -> Result<LoginRequest, ClientError> {
    let email = email.trim();
    if !email.contains('@') {
        return Err(ClientError::validation("Enter valid email"));
    }
    if password.is_empty() {
        return Err(ClientError::validation("Password is required"));
    }
    Ok(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

pub fn forgot_password_request(email: &str) -> Result<ForgotPasswordRequest, ClientError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::validation("Please enter your email address."));
    }
    Ok(ForgotPasswordRequest {
        email: email.to_string(),
    })
}

pub fn reset_password_request(
    user_id: &str,
    token: &str,
    password: &str,
    confirm_password: &str,
) -> Result<ResetPasswordRequest, ClientError> {
    if user_id.is_empty() || token.is_empty() {
        return Err(ClientError::validation("Reset link is missing user or token"));
    }
    check_new_password(password, confirm_password)?;
    Ok(ResetPasswordRequest {
        user_id: user_id.to_string(),
        token: token.to_string(),
        new_password: password.to_string(),
    })
}

fn check_new_password(password: &str, confirm_password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm_password {
        return Err(ClientError::validation("Passwords do not match"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: " Ana Anic ".into(),
            email: "ana.anic@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            agreed_to_terms: true,
            birth_year: 1999,
            birth_month: 7,
            birth_day: 3,
        }
    }

    #[test]
    fn registration_derives_username_and_birth_date() {
        let request = form().into_request().expect("valid form");
        assert_eq!(request.username, "ana.anic");
        assert_eq!(request.name, "Ana Anic");
        assert_eq!(request.full_name, "Ana Anic");
        assert_eq!(request.birth_date, "1999-07-03");
    }

    #[test]
    fn registration_rejects_bad_input() {
        let mut bad_email = form();
        bad_email.email = "ana.example.com".into();
        let mut short = form();
        short.password = "abc".into();
        short.confirm_password = "abc".into();
        let mut mismatch = form();
        mismatch.confirm_password = "secret2".into();
        let mut no_terms = form();
        no_terms.agreed_to_terms = false;
        let mut bad_date = form();
        bad_date.birth_month = 13;

        for bad in [bad_email, short, mismatch, no_terms, bad_date] {
            assert!(matches!(bad.into_request(), Err(ClientError::Validation(_))));
        }
    }

    #[test]
    fn reset_requires_matching_long_password() {
        assert!(reset_password_request("u1", "t", "secret1", "secret1").is_ok());
        assert!(reset_password_request("u1", "t", "short", "short").is_err());
        assert!(reset_password_request("u1", "t", "secret1", "secret2").is_err());
        assert!(reset_password_request("", "t", "secret1", "secret1").is_err());
    }

    #[test]
    fn forgot_password_needs_email() {
        assert!(forgot_password_request("  ").is_err());
        assert_eq!(
            forgot_password_request(" ana@example.com ")
                .expect("request")
                .email,
            "ana@example.com"
        );
    }
}
