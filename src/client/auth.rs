//! Login, registration, refresh and logout

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::config::{MAX_NAME_LEN, MIN_PASSWORD_LEN};
use crate::credentials::{Credentials, TokenStore};
use crate::error::Error;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// What the server replies to a successful login, registration or refresh
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
}

impl From<AuthResponse> for Credentials {
    fn from(resp: AuthResponse) -> Self {
        Credentials { access_token: resp.token, refresh_token: resp.refresh_token }
    }
}


/// Check login fields before sending them
pub fn validate_login(email: &str, password: &str) -> Result<(), Error> {
    let email = email.trim();
    if email.is_empty() || email.contains('@') == false {
        return Err(Error::Validation("a valid email is required".to_string()));
    }
    if password.is_empty() {
        return Err(Error::Validation("a password is required".to_string()));
    }
    Ok(())
}

/// Check registration fields before sending them
pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("a name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!("a name cannot exceed {} characters", MAX_NAME_LEN)));
    }
    validate_login(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!("a password needs at least {} characters", MIN_PASSWORD_LEN)));
    }
    Ok(())
}


impl<S: TokenStore> Client<S> {
    /// Log in, and store the tokens the server hands out
    pub async fn login(&self, email: &str, password: &str) -> Result<(), Error> {
        validate_login(email, password)?;

        let request = self.request(Method::POST, &["auth", "login"])
            .with_json(&LoginRequest { email: email.trim(), password })?;
        let resp: AuthResponse = self.send_json(request).await?;
        self.store(resp);
        log::info!("Logged in");
        Ok(())
    }

    /// Create an account, and store the tokens the server hands out
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), Error> {
        validate_registration(name, email, password)?;

        let request = self.request(Method::POST, &["auth", "register"])
            .with_json(&RegisterRequest { name: name.trim(), email: email.trim(), password })?;
        let resp: AuthResponse = self.send_json(request).await?;
        self.store(resp);
        log::info!("Registered a new account");
        Ok(())
    }

    /// Trade the stored refresh token for new tokens, and store them.
    ///
    /// This does not clear anything on failure, see the module documentation for the automatic refresh.
    /// This call is sent once, outside of the retry pipeline.
    pub async fn refresh(&self) -> Result<Credentials, Error> {
        let refresh_token = match self.tokens.refresh_token() {
            None => return Err(Error::Unauthorized { message: Some("no refresh token".to_string()) }),
            Some(t) => t,
        };

        let request = self.request(Method::POST, &["auth", "refresh"])
            .with_json(&RefreshRequest { refresh_token: &refresh_token })?;
        let response = self.dispatch(&request, None).await?;
        let resp: AuthResponse = super::decode(response).await?;
        let creds = Credentials::from(resp);
        self.tokens.set_tokens(&creds.access_token, &creds.refresh_token);
        log::debug!("Session refreshed");
        Ok(creds)
    }

    /// Revoke the refresh token on the server, and forget the stored tokens.
    ///
    /// Tokens are forgotten even if the server call fails
    pub async fn logout(&self) -> Result<(), Error> {
        let result = match self.tokens.refresh_token() {
            None => Ok(()),
            Some(refresh_token) => {
                let request = self.request(Method::POST, &["auth", "logout"])
                    .with_json(&RefreshRequest { refresh_token: &refresh_token })?;
                self.send(request).await.map(|_| ())
            }
        };

        self.tokens.clear();
        if let Err(err) = &result {
            log::warn!("Server-side logout failed: {}", err);
        }
        log::info!("Logged out");
        result
    }

    fn store(&self, resp: AuthResponse) {
        self.tokens.set_tokens(&resp.token, &resp.refresh_token);
    }
}
