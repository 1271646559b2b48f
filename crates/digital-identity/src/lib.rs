//! Digital Identity Ledger
//!
//! Issues tourist IDs of the form `BC-XXXXXXXXXXXX`, where the suffix is the
//! first 12 hex digits of `SHA-256(user_data || timestamp_ms)`, and records
//! every issued ID in an append-only ledger so it can be verified later.
//!
//! The ledger is an in-memory record of issued IDs. It is not a distributed
//! chain and carries no consensus.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

/// Prefix for every issued ID
pub const ID_PREFIX: &str = "BC-";

/// Hex digits of the digest kept in the ID
pub const ID_HASH_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    #[error("User data is empty")]
    EmptyUserData,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

/// One issued identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityBlock {
    pub id: String,
    pub user_data: String,
    pub timestamp: DateTime<Utc>,
    pub verified: bool,
}

/// Identity payload for a tourist: `name-email-phone`
pub fn user_data(name: &str, email: &str, phone: &str) -> String {
    format!("{}-{}-{}", name, email, phone)
}

/// Derive the ID for `user_data` issued at `timestamp_ms`
pub fn derive_id(user_data: &str, timestamp_ms: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_data.as_bytes());
    hasher.update(timestamp_ms.to_string().as_bytes());
    let digest = hex::encode_upper(hasher.finalize());
    format!("{}{}", ID_PREFIX, &digest[..ID_HASH_LEN])
}

#[derive(Debug, Clone, Default)]
pub struct IdentityLedger {
    chain: Vec<IdentityBlock>,
}

impl IdentityLedger {
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Issue an ID stamped with the current time
    pub fn issue(&mut self, user_data: &str) -> Result<&IdentityBlock> {
        self.issue_at(user_data, Utc::now().timestamp_millis())
    }

    /// Issue an ID for an explicit millisecond timestamp
    pub fn issue_at(&mut self, user_data: &str, timestamp_ms: i64) -> Result<&IdentityBlock> {
        if user_data.is_empty() {
            return Err(IdentityError::EmptyUserData);
        }
        let timestamp = Utc
            .timestamp_millis_opt(timestamp_ms)
            .single()
            .ok_or(IdentityError::InvalidTimestamp(timestamp_ms))?;

        let block = IdentityBlock {
            id: derive_id(user_data, timestamp_ms),
            user_data: user_data.to_string(),
            timestamp,
            verified: true,
        };

        info!("Issued digital ID {}", block.id);
        self.chain.push(block);
        Ok(&self.chain[self.chain.len() - 1])
    }

    pub fn verify(&self, id: &str) -> bool {
        self.chain.iter().any(|block| block.id == id)
    }

    pub fn blocks(&self) -> &[IdentityBlock] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
