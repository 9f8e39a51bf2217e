//! Agent configuration files.
//!
//! The community table is a flat `key=value` file:
//!
//! ```text
//! # source address = read-only,read-write,trap community
//! 0.0.0.0=public,private,public
//! 192.168.1.20=monitor,admin,traps
//! ```
//!
//! Requests from an address with its own line use that line; all others use
//! `0.0.0.0`. Every address except `0.0.0.0` is also a trap destination.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use bytes::Bytes;

use crate::engine::{Authenticator, Communities};
use crate::error::{Error, Result};
use crate::pdu::PduType;
use crate::transport::TRAP_PORT;

/// Key of the fallback line.
pub const DEFAULT_KEY: &str = "0.0.0.0";

/// Ordered `key=value` pairs.
///
/// Lines are trimmed. A line whose first character is not alphanumeric is a
/// comment, as is a line without `=`. A repeated key replaces the earlier
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues {
    pairs: Vec<(String, String)>,
}

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse file text.
    ///
    /// ```
    /// use usnmp::config::KeyValues;
    ///
    /// let kv = KeyValues::parse("# comment\n a = 1 \nb=2\na=3\n");
    /// assert_eq!(kv.get("a"), Some("3"));
    /// assert_eq!(kv.get("b"), Some("2"));
    /// assert_eq!(kv.len(), 2);
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut kv = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if !line.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            kv.insert(key.trim(), value.trim());
        }
        kv
    }

    /// Read and parse a file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Ok(Self::parse(&text))
    }

    /// Set `key`, replacing any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Communities configured for one source address.
#[derive(Debug, Clone)]
pub struct CommunityEntry {
    pub access: Communities,
    /// Community put on traps sent to this address.
    pub trap: Bytes,
}

impl CommunityEntry {
    /// Parse `ro,rw,trap`. Missing fields are empty.
    pub fn parse(value: &str) -> Self {
        let mut fields = value.splitn(3, ',').map(|f| f.trim().to_owned());
        let ro = fields.next().unwrap_or_default();
        let rw = fields.next().unwrap_or_default();
        let trap = fields.next().unwrap_or_default();
        Self {
            access: Communities::new(ro, rw),
            trap: Bytes::from(trap),
        }
    }
}

/// Source address to community mapping.
#[derive(Debug, Clone, Default)]
pub struct CommunityTable {
    entries: Vec<(String, CommunityEntry)>,
}

impl CommunityTable {
    pub fn from_key_values(kv: &KeyValues) -> Self {
        Self {
            entries: kv
                .iter()
                .map(|(k, v)| (k.to_owned(), CommunityEntry::parse(v)))
                .collect(),
        }
    }

    pub fn parse(text: &str) -> Self {
        Self::from_key_values(&KeyValues::parse(text))
    }

    /// Accept `public`/`private` from anywhere and send no traps.
    pub fn with_defaults() -> Self {
        Self {
            entries: vec![(DEFAULT_KEY.to_owned(), CommunityEntry::default())],
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let table = Self::from_key_values(&KeyValues::load(path).await?);
        tracing::debug!(target: "usnmp::config", { entries = table.len() }, "community table loaded");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &str) -> Option<&CommunityEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// Entry for `peer`, falling back to `0.0.0.0`.
    pub fn lookup(&self, peer: IpAddr) -> Option<&CommunityEntry> {
        let peer = match peer {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
            v4 => v4,
        };
        self.entry(&peer.to_string())
            .or_else(|| self.entry(DEFAULT_KEY))
    }

    /// Whether `peer` may send a `pdu_type` request carrying `community`.
    pub fn authorize(&self, peer: IpAddr, community: &[u8], pdu_type: PduType) -> bool {
        self.lookup(peer)
            .is_some_and(|entry| entry.access.authorize(community, pdu_type))
    }

    /// Trap destinations with their trap communities.
    ///
    /// Keys that are not IP addresses are skipped.
    pub fn trap_destinations(&self) -> Vec<(SocketAddr, Bytes)> {
        self.entries
            .iter()
            .filter(|(k, _)| k != DEFAULT_KEY)
            .filter_map(|(k, e)| match k.parse::<IpAddr>() {
                Ok(ip) => Some((SocketAddr::new(ip, TRAP_PORT), e.trap.clone())),
                Err(_) => {
                    tracing::warn!(target: "usnmp::config", { key = %k }, "trap destination is not an IP address");
                    None
                }
            })
            .collect()
    }
}

impl Default for CommunityEntry {
    fn default() -> Self {
        Self {
            access: Communities::default(),
            trap: Bytes::from_static(b"public"),
        }
    }
}
