//! Credential verification and bearer token issuance
//!
//! Passwords are stored as bcrypt hashes. Tokens are HS256 JWTs carrying the user
//! id and an expiry; nothing about a token is persisted.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::Config,
    db::UserRepository,
    error::{AppError, AppResult},
    models::{AuthResponse, LoginRequest, NewUser, RegisterRequest},
};

/// Returned for every login failure so callers cannot probe which emails exist
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::days(config.jwt_expires_in_days),
        )
    }

    /// Issues a token for `user_id` expiring after the configured window
    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Resolves a token to the user id it was issued for
    ///
    /// Fails if the signature does not match, the token has expired, or it is malformed.
    pub fn verify(&self, token: &str) -> AppResult<Uuid> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims.id)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                AppError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

/// bcrypt hashing, run on the blocking pool
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Returns false for a mismatch or an unreadable stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        match result {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            }
        }
    }
}

/// Trims a request field, treating blank values as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Registers users and exchanges credentials for tokens
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer, hasher: PasswordHasher) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let (Some(name), Some(email), Some(password)) = (
            non_empty(request.name),
            non_empty(request.email),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::InvalidInput(
                "Please provide name, email, and password".to_string(),
            ));
        };

        let password_hash = self.hasher.hash(&password).await?;
        let user = self
            .users
            .create_user(NewUser {
                name,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        let token = self.tokens.issue(user.id)?;
        Ok(AuthResponse::new(&user, token))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

        let (Some(email), Some(password)) = (non_empty(request.email), request.password) else {
            return Err(invalid());
        };

        let Some(user) = self.users.find_user_by_email(&email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(invalid());
        };

        if !self.hasher.verify(&password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(invalid());
        }

        tracing::info!(user_id = %user.id, "User logged in");

        let token = self.tokens.issue(user.id)?;
        Ok(AuthResponse::new(&user, token))
    }

    pub fn verify(&self, token: &str) -> AppResult<Uuid> {
        self.tokens.verify(token)
    }
}
