//! Community authorization.

use bytes::Bytes;
use subtle::ConstantTimeEq;

use crate::pdu::PduType;

/// Decides whether a community may perform a request.
pub trait Authenticator: Send + Sync {
    /// Return `true` to accept a `pdu_type` request carrying `community`.
    fn authorize(&self, community: &[u8], pdu_type: PduType) -> bool;
}

impl<F> Authenticator for F
where
    F: Fn(&[u8], PduType) -> bool + Send + Sync,
{
    fn authorize(&self, community: &[u8], pdu_type: PduType) -> bool {
        self(community, pdu_type)
    }
}

/// Accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authorize(&self, _community: &[u8], _pdu_type: PduType) -> bool {
        true
    }
}

/// Static read-only and read-write community strings.
///
/// The read-write community grants every request type. The read-only
/// community grants everything except SET.
///
/// ```
/// use usnmp::engine::{Authenticator, Communities};
/// use usnmp::pdu::PduType;
///
/// let auth = Communities::new("public", "private");
/// assert!(auth.authorize(b"public", PduType::GetRequest));
/// assert!(!auth.authorize(b"public", PduType::SetRequest));
/// assert!(auth.authorize(b"private", PduType::SetRequest));
/// assert!(!auth.authorize(b"guess", PduType::GetRequest));
/// ```
#[derive(Debug, Clone)]
pub struct Communities {
    read_only: Bytes,
    read_write: Bytes,
}

impl Communities {
    pub fn new(read_only: impl Into<Bytes>, read_write: impl Into<Bytes>) -> Self {
        Self {
            read_only: read_only.into(),
            read_write: read_write.into(),
        }
    }

    pub fn read_only(&self) -> &[u8] {
        &self.read_only
    }

    pub fn read_write(&self) -> &[u8] {
        &self.read_write
    }
}

impl Default for Communities {
    /// `public` / `private`.
    fn default() -> Self {
        Self::new("public", "private")
    }
}

/// Constant-time comparison; both strings are always compared.
fn matches(configured: &[u8], community: &[u8]) -> bool {
    configured.len() == community.len() && bool::from(configured.ct_eq(community))
}

impl Authenticator for Communities {
    fn authorize(&self, community: &[u8], pdu_type: PduType) -> bool {
        let rw = matches(&self.read_write, community);
        let ro = matches(&self.read_only, community);
        rw || (ro && pdu_type != PduType::SetRequest)
    }
}
