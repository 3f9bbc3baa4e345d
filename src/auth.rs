use crate::api::{LoginRequest, SignupRequest};
use crate::session::User;
use crate::{Error, Result};
use reqwest::Url;

const AVATAR_SERVICE: &str = "https://ui-avatars.com/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Validated credentials ready to be sent.
#[derive(Debug, Clone)]
pub enum AuthRequest {
    Login(LoginRequest),
    Signup(SignupRequest),
}

#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AuthForm {
    /// Check required fields and build the request body.
    ///
    /// Runs before any network call; a blank field is a validation error.
    pub fn validate(&self, mode: AuthMode) -> Result<AuthRequest> {
        let mut required = Vec::with_capacity(3);
        if mode == AuthMode::SignUp {
            required.push(("Name", self.name.as_str()));
        }
        required.push(("Email", self.email.as_str()));
        required.push(("Password", self.password.as_str()));

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::validation(
                "Please fill in all required fields",
                format!("{} is required", field),
            ));
        }

        Ok(match mode {
            AuthMode::SignIn => AuthRequest::Login(LoginRequest {
                username: self.email.trim().to_string(),
                password: self.password.clone(),
            }),
            AuthMode::SignUp => AuthRequest::Signup(SignupRequest {
                username: self.name.trim().to_string(),
                password: self.password.clone(),
                email: self.email.trim().to_string(),
            }),
        })
    }

    /// User record shown after a successful sign in or sign up.
    pub fn user_for(&self, mode: AuthMode) -> User {
        let email = self.email.trim().to_string();
        let name = match mode {
            AuthMode::SignIn => email.split('@').next().unwrap_or_default().to_string(),
            AuthMode::SignUp => self.name.trim().to_string(),
        };
        User {
            avatar: avatar_url(&name),
            name,
            email,
        }
    }

    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

fn avatar_url(name: &str) -> Option<String> {
    Url::parse_with_params(
        AVATAR_SERVICE,
        &[("name", name), ("background", "6246EA"), ("color", "fff")],
    )
    .ok()
    .map(String::from)
}
