//! Encryption key declaration for vault storage

use serde::{Deserialize, Serialize};

/// What happens to the key when its stack is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Delete the key with the stack
    Destroy,
    /// Keep the key after the stack is gone
    Retain,
}

/// Declaration of the symmetric key encrypting a vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionKeySpec {
    /// Logical id of the key
    pub id: String,
    /// Human-readable purpose
    pub description: String,
    /// Whether the key rotates automatically
    pub enable_key_rotation: bool,
    /// Teardown behavior
    pub removal_policy: RemovalPolicy,
    /// Role refs granted encrypt/decrypt on the key
    pub encrypt_decrypt_grants: Vec<String>,
}

impl EncryptionKeySpec {
    /// The standard vault key: symmetric, rotation enabled, destroyed with
    /// its stack.
    pub fn vault_default(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: "Symmetric key for member account backup vault encryption".to_string(),
            enable_key_rotation: true,
            removal_policy: RemovalPolicy::Destroy,
            encrypt_decrypt_grants: Vec::new(),
        }
    }

    /// Grant a role encrypt and decrypt on the key
    pub fn grant_encrypt_decrypt(mut self, role_ref: impl Into<String>) -> Self {
        self.encrypt_decrypt_grants.push(role_ref.into());
        self
    }
}
