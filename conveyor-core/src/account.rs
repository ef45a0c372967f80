//! Shared credentials for stages.
//!
//! An account is configured separately from any stage, then attached to
//! the stages that need it. Its variables become an expression scope, so
//! a stage property can reference `account.user_id` without the stage
//! knowing how the account is configured.

use crate::error::Result;
use crate::property::{PropertyBuilder, PropertyValues};
use crate::value::Body;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::{Digest, Md5};

/// A configured credential source.
pub trait Account {
    /// Declare the account's configuration properties.
    fn define_properties(&self, builder: &mut PropertyBuilder) {
        let _ = builder;
    }

    /// Consume configured property values. Called once before connect.
    fn configure(&mut self, values: &PropertyValues) -> Result<()>;

    /// Establish the credential, returning an opaque token for the
    /// stage to present downstream.
    fn connect(&mut self) -> Result<String>;

    /// Release the credential.
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    /// Variables this account exposes to stage expressions, under the
    /// `account` scope.
    fn variables(&self) -> Body {
        Body::new()
    }
}

/// Derive an expiring token from a user id and passphrase.
///
/// The token is the base64 encoding of `user:expiration:digest`, where
/// the digest is the MD5 of `user:expiration:passphrase` decoded as
/// UTF-8 with invalid sequences replaced. The replacement step is part
/// of the format: peers verifying tokens apply the same decoding, so the
/// digest bytes must go through it rather than being encoded raw.
pub fn hash_token(user_id: &str, expiration_millis: i64, passphrase: &str) -> String {
    let digest = Md5::digest(format!("{user_id}:{expiration_millis}:{passphrase}"));
    let digest_text = String::from_utf8_lossy(&digest);
    STANDARD.encode(format!("{user_id}:{expiration_millis}:{digest_text}"))
}

/// The default token lifetime: 24 hours from now, in epoch milliseconds.
pub fn default_expiration() -> i64 {
    (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp_millis()
}
