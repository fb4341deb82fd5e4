//! Naming authority interface
//!
//! The authority owns the name → root-CID mapping and its access control.
//! In production this is a client for an on-chain naming contract; the
//! in-memory implementation here backs tests and standalone deployments
//! and enforces the same ownership rules.

use async_trait::async_trait;
use cidgate_core::error::{CidGateError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::info;

/// A 20-byte account address. The zero address means "nobody": a name
/// owned by it is unregistered.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse from a hex string, with or without a `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CidGateError::Naming(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(CidGateError::Naming(format!(
                "invalid address length: expected 20 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Transaction authorization: the caller's signing identity plus the chain
/// it signs for. Nonce management lives with the concrete authority.
#[derive(Debug, Clone)]
pub struct TxnAuth {
    /// Address the authority attributes writes to
    pub address: Address,

    /// Chain identifier the transactions are bound to
    pub chain_id: u64,
}

impl TxnAuth {
    /// Create a new authorization
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self { address, chain_id }
    }
}

/// External authority over the name → CID mapping
#[async_trait]
pub trait NamingAuthority: Send + Sync {
    /// Resolve a name to its current CID string; empty means unbound
    async fn resolve_name(&self, name: &str) -> Result<String>;

    /// Register a new name bound to `cid` and owned by the caller
    async fn register_name(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()>;

    /// Update the CID of an existing name; gated on ownership
    async fn update_cid(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()>;

    /// Current owner of a name; [`Address::ZERO`] when unregistered
    async fn get_owner(&self, name: &str) -> Result<Address>;

    /// Hand a name over to a new owner; gated on ownership
    async fn transfer_ownership(&self, auth: &TxnAuth, name: &str, new_owner: Address)
        -> Result<()>;
}

struct NameRecord {
    owner: Address,
    cid: String,
}

/// In-process naming authority
pub struct InMemoryAuthority {
    records: RwLock<HashMap<String, NameRecord>>,
}

impl InMemoryAuthority {
    /// Create an empty authority
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn check_owner(record: &NameRecord, auth: &TxnAuth, name: &str) -> Result<()> {
        if record.owner != auth.address {
            return Err(CidGateError::Unauthorized(name.to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NamingAuthority for InMemoryAuthority {
    async fn resolve_name(&self, name: &str) -> Result<String> {
        let records = self.records.read();
        Ok(records.get(name).map(|r| r.cid.clone()).unwrap_or_default())
    }

    async fn register_name(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(name) {
            return Err(CidGateError::Naming(format!(
                "name '{}' is already registered",
                name
            )));
        }
        records.insert(
            name.to_string(),
            NameRecord {
                owner: auth.address,
                cid: cid.to_string(),
            },
        );
        info!(name, owner = %auth.address, "Registered name");
        Ok(())
    }

    async fn update_cid(&self, auth: &TxnAuth, name: &str, cid: &str) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(name)
            .ok_or_else(|| CidGateError::NotRegistered(name.to_string()))?;
        Self::check_owner(record, auth, name)?;
        record.cid = cid.to_string();
        Ok(())
    }

    async fn get_owner(&self, name: &str) -> Result<Address> {
        let records = self.records.read();
        Ok(records.get(name).map(|r| r.owner).unwrap_or(Address::ZERO))
    }

    async fn transfer_ownership(
        &self,
        auth: &TxnAuth,
        name: &str,
        new_owner: Address,
    ) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(name)
            .ok_or_else(|| CidGateError::NotRegistered(name.to_string()))?;
        Self::check_owner(record, auth, name)?;
        record.owner = new_owner;
        info!(name, new_owner = %new_owner, "Transferred name ownership");
        Ok(())
    }
}
