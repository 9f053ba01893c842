use k256::{ecdsa::SigningKey, SecretKey};
use sha3::{Digest, Keccak256};

use super::errors::app_error::AppError;

/// The account that owns every entity this process writes.
#[derive(Clone, Debug)]
pub struct OwnerIdentity {
    /// Lower-case `0x` address.
    pub address: String,
}

impl OwnerIdentity {
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, AppError> {
        let key_hex = private_key_hex.trim().trim_start_matches("0x");
        let key_bytes = hex::decode(key_hex)
            .map_err(|e| AppError::InvalidCredential(format!("PRIVATE_KEY is not hex: {}", e)))?;
        let secret_key = SecretKey::from_slice(&key_bytes)
            .map_err(|_| AppError::InvalidCredential("PRIVATE_KEY is not a valid key".into()))?;
        let signing_key = SigningKey::from(secret_key);

        Ok(Self {
            address: derive_address(&signing_key),
        })
    }

    /// Loads the identity from an optional environment value, failing with
    /// [`AppError::MissingCredential`] when it is absent.
    pub fn from_env_value(private_key: Option<&str>) -> Result<Self, AppError> {
        match private_key {
            Some(key) if !key.trim().is_empty() => Self::from_private_key(key),
            _ => Err(AppError::MissingCredential("PRIVATE_KEY".into())),
        }
    }
}

fn derive_address(signing_key: &SigningKey) -> String {
    let encoded = signing_key.verifying_key().to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix.
    let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}
