//! Issues and verifies the bearer tokens that identify a logged in user.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

use crate::{Error, User, UserID};

/// The default duration for which tokens are valid.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The contents of a JSON Web Token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub user_id: UserID,
    /// The username of the user the token was issued to.
    pub user: String,
    /// When the token was issued, as a Unix timestamp.
    pub iat: i64,
    /// When the token expires, as a Unix timestamp.
    pub exp: i64,
}

/// The body sent to a client after registering or logging in.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    /// The bearer token for the `Authorization` header.
    pub token: String,
}

/// The keys for signing and verifying tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenKeys {
    /// Create the signing keys from a `secret` string.
    ///
    /// The secret is hashed so that secrets of any length give a full length key.
    pub fn new(secret: &str) -> Self {
        let hash = Sha512::digest(secret);

        Self {
            encoding_key: EncodingKey::from_secret(&hash),
            decoding_key: DecodingKey::from_secret(&hash),
        }
    }

    /// Create a token for `user` that expires `duration` from now.
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue_token(&self, user: &User, duration: Duration) -> Result<String, Error> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            user_id: user.id,
            user: user.username.clone(),
            iat: now.unix_timestamp(),
            exp: (now + duration).unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Get the ID of the user that `token` was issued to.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidToken] if the token is malformed, was not signed
    /// with these keys, or has expired.
    pub fn resolve_user_id(&self, token: &str) -> Result<UserID, Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims.user_id)
            .map_err(|error| {
                tracing::debug!("Rejected token: {error}");
                Error::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}
