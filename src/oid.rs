//! Object Identifier (OID) type.
//!
//! An [`Oid`] lives under one of three well-known roots:
//!
//! | Letter | Root | Numeric prefix |
//! |---|---|---|
//! | `B` | [`Root::Mgmt`] | `1.3.6.1.2.1` (mib-2) |
//! | `E` | [`Root::Experimental`] | `1.3.6.1.3` |
//! | `P` | [`Root::Private`] | `1.3.6.1.4.1` (enterprises) |
//!
//! The text form is the root letter followed by the remaining arcs, e.g.
//! `B.1.3.0` for sysUpTime.0. On the wire the common `1.3.6.1` prefix is the
//! fixed bytes `2B 06 01`, followed by one or two fixed bytes selecting the
//! root, followed by each arc in base-128.
//!
//! Arcs are stored as `SmallVec<[u32; 15]>` so an OID never touches the heap.

use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of elements in an OID, counting the root marker.
pub const MAX_OID_LEN: usize = 16;

/// Maximum number of arcs after the root.
pub const MAX_ARCS: usize = MAX_OID_LEN - 1;

/// The three subtrees an OID can live under.
///
/// Variants are ordered the same way their numeric prefixes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Root {
    /// `1.3.6.1.2.1`
    Mgmt,
    /// `1.3.6.1.3`
    Experimental,
    /// `1.3.6.1.4.1`
    Private,
}

impl Root {
    /// Letter alias for [`Root::Mgmt`].
    pub const B: Root = Root::Mgmt;
    /// Letter alias for [`Root::Experimental`].
    pub const E: Root = Root::Experimental;
    /// Letter alias for [`Root::Private`].
    pub const P: Root = Root::Private;

    pub fn letter(self) -> char {
        match self {
            Root::Mgmt => 'B',
            Root::Experimental => 'E',
            Root::Private => 'P',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'B' => Some(Root::Mgmt),
            'E' => Some(Root::Experimental),
            'P' => Some(Root::Private),
            _ => None,
        }
    }

    /// Numeric arcs this root stands for.
    pub fn prefix(self) -> &'static [u32] {
        match self {
            Root::Mgmt => &[1, 3, 6, 1, 2, 1],
            Root::Experimental => &[1, 3, 6, 1, 3],
            Root::Private => &[1, 3, 6, 1, 4, 1],
        }
    }

    /// Fixed BER bytes this root encodes to.
    pub fn ber_prefix(self) -> &'static [u8] {
        match self {
            Root::Mgmt => &[0x2B, 0x06, 0x01, 0x02, 0x01],
            Root::Experimental => &[0x2B, 0x06, 0x01, 0x03],
            Root::Private => &[0x2B, 0x06, 0x01, 0x04, 0x01],
        }
    }

    const ALL: [Root; 3] = [Root::Mgmt, Root::Experimental, Root::Private];

    /// First root whose whole subtree sorts after the OID with BER contents
    /// `ber`, for names that cannot be represented as an [`Oid`].
    ///
    /// `None` when `ber` lies inside a subtree or after all of them.
    ///
    /// ```
    /// use usnmp::Root;
    ///
    /// assert_eq!(Root::following(&[0x2B, 0x06, 0x01]), Some(Root::Mgmt));
    /// assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x04]), Some(Root::Private));
    /// assert_eq!(Root::following(&[0x2B, 0x07]), None);
    /// ```
    pub fn following(ber: &[u8]) -> Option<Root> {
        if Root::ALL
            .iter()
            .any(|root| ber.starts_with(root.ber_prefix()))
        {
            return None;
        }
        Root::ALL.into_iter().find(|root| ber < root.ber_prefix())
    }
}

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    root: Root,
    arcs: SmallVec<[u32; MAX_ARCS]>,
}

impl Oid {
    /// Create an OID, checking the element limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use usnmp::oid::{Oid, Root};
    ///
    /// let oid = Oid::new(Root::Mgmt, [1, 3, 0]).unwrap();
    /// assert_eq!(oid.to_string(), "B.1.3.0");
    ///
    /// assert!(Oid::new(Root::Mgmt, 0..20).is_err());
    /// ```
    pub fn new(root: Root, arcs: impl IntoIterator<Item = u32>) -> Result<Self> {
        let oid = Self {
            root,
            arcs: arcs.into_iter().collect(),
        };
        oid.validate_length()?;
        Ok(oid)
    }

    /// Create an OID from a slice of arcs.
    ///
    /// The element limit is not checked here; [`Oid::to_ber`] rejects an OID
    /// that exceeds it.
    pub fn from_slice(root: Root, arcs: &[u32]) -> Self {
        Self {
            root,
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from text.
    ///
    /// Accepts the letter form (`B.1.3.0`), a bare root letter (`P`), and the
    /// numeric dotted form when it begins with a supported root
    /// (`1.3.6.1.2.1.1.3.0`). Leading spaces are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use usnmp::oid::{Oid, Root};
    ///
    /// let a = Oid::parse("B.1.3.0").unwrap();
    /// let b = Oid::parse("1.3.6.1.2.1.1.3.0").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.root(), Root::Mgmt);
    ///
    /// assert!(Oid::parse("X.1.2").is_err());
    /// assert!(Oid::parse("1.3.6.1.6.3").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim_start_matches(' ').trim_end();
        let invalid = |kind| Error::invalid_oid_with_input(kind, s);

        let mut chars = text.chars();
        let oid = match chars.next().and_then(Root::from_letter) {
            Some(root) => {
                let rest = chars.as_str();
                let arcs = if rest.is_empty() {
                    SmallVec::new()
                } else if let Some(rest) = rest.strip_prefix('.') {
                    parse_arcs(rest).ok_or_else(|| invalid(OidErrorKind::InvalidArc))?
                } else {
                    return Err(invalid(OidErrorKind::UnknownRoot));
                };
                Self { root, arcs }
            }
            None => {
                let numeric = text.strip_prefix('.').unwrap_or(text);
                let all = parse_arcs(numeric).ok_or_else(|| invalid(OidErrorKind::UnknownRoot))?;
                let root = Root::ALL
                    .into_iter()
                    .find(|r| all.starts_with(r.prefix()))
                    .ok_or_else(|| invalid(OidErrorKind::UnknownRoot))?;
                Self {
                    root,
                    arcs: SmallVec::from_slice(&all[root.prefix().len()..]),
                }
            }
        };

        if oid.arcs.len() > MAX_ARCS {
            return Err(invalid(OidErrorKind::TooManyArcs {
                count: oid.arcs.len() + 1,
                max: MAX_OID_LEN,
            }));
        }
        Ok(oid)
    }

    pub fn root(&self) -> Root {
        self.root
    }

    /// Arcs after the root.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs after the root.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// True when the OID is just a root.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.root == other.root && self.arcs.starts_with(&other.arcs)
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid {
            root: self.root,
            arcs,
        }
    }

    /// Check the element limit.
    pub fn validate_length(&self) -> Result<()> {
        if self.arcs.len() > MAX_ARCS {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len() + 1,
                max: MAX_OID_LEN,
            }));
        }
        Ok(())
    }

    /// Full numeric dotted form, e.g. `1.3.6.1.2.1.1.3.0`.
    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (i, arc) in self.root.prefix().iter().chain(self.arcs.iter()).enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&arc.to_string());
        }
        out
    }

    /// Encode to BER content bytes (without tag and length).
    ///
    /// # Examples
    ///
    /// ```
    /// use usnmp::oid;
    ///
    /// let ber = oid!(B, 1, 3, 0).to_ber().unwrap();
    /// assert_eq!(&ber[..], &[0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x03, 0x00]);
    /// ```
    pub fn to_ber(&self) -> Result<SmallVec<[u8; 64]>> {
        self.validate_length()?;
        let mut bytes = SmallVec::new();
        bytes.extend_from_slice(self.root.ber_prefix());
        for &arc in &self.arcs {
            encode_subidentifier(&mut bytes, arc);
        }
        Ok(bytes)
    }

    /// Decode from BER content bytes.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        let root = Root::ALL
            .into_iter()
            .find(|r| data.starts_with(r.ber_prefix()))
            .ok_or_else(|| Error::invalid_oid(OidErrorKind::UnknownRoot))?;

        let mut arcs = SmallVec::new();
        let mut rest = &data[root.ber_prefix().len()..];
        while !rest.is_empty() {
            let (arc, consumed) = decode_subidentifier(rest)?;
            arcs.push(arc);
            rest = &rest[consumed..];
        }

        let oid = Self { root, arcs };
        oid.validate_length()?;
        Ok(oid)
    }
}

fn parse_arcs(s: &str) -> Option<SmallVec<[u32; MAX_ARCS]>> {
    s.split('.').map(|part| part.parse::<u32>().ok()).collect()
}

/// Encode a subidentifier in base-128, most significant group first.
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = ((32 - value.leading_zeros()) as usize).div_ceil(7).max(1);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode a subidentifier, returning (value, bytes_consumed).
fn decode_subidentifier(data: &[u8]) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(Error::invalid_oid(OidErrorKind::SubidentifierOverflow));
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::invalid_oid(OidErrorKind::TruncatedSubidentifier))
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.letter())?;
        for arc in &self.arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic order: root first, then arcs; a proper prefix sorts first.
impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.root
            .cmp(&other.root)
            .then_with(|| self.arcs.as_slice().cmp(other.arcs.as_slice()))
    }
}

/// Build an [`Oid`] from a root letter and arcs.
///
/// ```
/// use usnmp::oid;
///
/// let sys_uptime = oid!(B, 1, 3, 0);
/// assert_eq!(sys_uptime.to_string(), "B.1.3.0");
/// assert_eq!(oid!(P).to_string(), "P");
/// ```
#[macro_export]
macro_rules! oid {
    ($root:ident $(, $arc:expr)* $(,)?) => {
        $crate::oid::Oid::from_slice($crate::oid::Root::$root, &[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letter_form() {
        let oid = Oid::parse("B.1.3.0").unwrap();
        assert_eq!(oid.root(), Root::Mgmt);
        assert_eq!(oid.arcs(), &[1, 3, 0]);
    }

    #[test]
    fn test_parse_skips_leading_spaces() {
        assert_eq!(Oid::parse("   P.38644.30").unwrap(), oid!(P, 38644, 30));
    }

    #[test]
    fn test_parse_bare_root() {
        let oid = Oid::parse("E").unwrap();
        assert!(oid.is_empty());
        assert_eq!(oid.to_string(), "E");
    }

    #[test]
    fn test_parse_rejects_unknown_root() {
        for text in ["U.1", "X", "", "B1.3", "1.3.6.1.6.3.1"] {
            let err = Oid::parse(text).unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::InvalidOid {
                        kind: OidErrorKind::UnknownRoot,
                        ..
                    }
                ),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_arc() {
        assert!(Oid::parse("B.1.x").is_err());
        assert!(Oid::parse("B.1..2").is_err());
        assert!(Oid::parse("B.4294967296").is_err());
    }

    #[test]
    fn test_parse_numeric_form() {
        assert_eq!(
            Oid::parse("1.3.6.1.4.1.9.1").unwrap(),
            oid!(P, 9, 1)
        );
        assert_eq!(Oid::parse(".1.3.6.1.3.7").unwrap(), oid!(E, 7));
        assert_eq!(oid!(E, 7).to_dotted(), "1.3.6.1.3.7");
    }

    #[test]
    fn test_too_many_arcs() {
        let text = format!("B{}", ".1".repeat(MAX_ARCS + 1));
        assert!(Oid::parse(&text).is_err());
        let text = format!("B{}", ".1".repeat(MAX_ARCS));
        assert_eq!(Oid::parse(&text).unwrap().len(), MAX_ARCS);

        let long = Oid::from_slice(Root::Mgmt, &[1; MAX_ARCS + 1]);
        assert!(long.to_ber().is_err());
    }

    #[test]
    fn test_ber_encoding_roots() {
        assert_eq!(
            &oid!(B, 1, 3, 0).to_ber().unwrap()[..],
            &[0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x03, 0x00]
        );
        assert_eq!(
            &oid!(E, 1).to_ber().unwrap()[..],
            &[0x2B, 0x06, 0x01, 0x03, 0x01]
        );
        assert_eq!(
            &oid!(P, 38644, 30).to_ber().unwrap()[..],
            &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x82, 0xAD, 0x74, 0x1E]
        );
    }

    #[test]
    fn test_ber_large_arcs() {
        let oid = oid!(P, 0x7F, 0x80, 0x3FFF, 0x4000, u32::MAX);
        let ber = oid.to_ber().unwrap();
        assert_eq!(
            &ber[5..],
            &[
                0x7F, //
                0x81, 0x00, //
                0xFF, 0x7F, //
                0x81, 0x80, 0x00, //
                0x8F, 0xFF, 0xFF, 0xFF, 0x7F
            ]
        );
        assert_eq!(Oid::from_ber(&ber).unwrap(), oid);
    }

    #[test]
    fn test_from_ber_unknown_root() {
        let err = Oid::from_ber(&[0x2B, 0x06, 0x01, 0x06, 0x03]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOid {
                kind: OidErrorKind::UnknownRoot,
                ..
            }
        ));
    }

    #[test]
    fn test_from_ber_truncated_and_overflow() {
        assert!(Oid::from_ber(&[0x2B, 0x06, 0x01, 0x03, 0x81]).is_err());
        assert!(Oid::from_ber(&[0x2B, 0x06, 0x01, 0x03, 0x90, 0x80, 0x80, 0x80, 0x80, 0x00]).is_err());
    }

    #[test]
    fn test_root_following_raw_names() {
        assert_eq!(Root::following(&[]), Some(Root::Mgmt));
        assert_eq!(Root::following(&[0x2A, 0x7F]), Some(Root::Mgmt));
        assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x02, 0x00]), Some(Root::Mgmt));
        assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x02, 0x02]), Some(Root::Experimental));
        assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x03, 0x81]), None);
        assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x04, 0x00]), Some(Root::Private));
        assert_eq!(Root::following(&[0x2B, 0x06, 0x01, 0x05]), None);
        assert_eq!(Root::following(&[0x2B, 0x86, 0x01]), None);
    }

    #[test]
    fn test_ordering() {
        let mut oids = vec![
            oid!(P, 1),
            oid!(B, 2, 1),
            oid!(E, 1),
            oid!(B, 1, 2),
            oid!(B, 1),
            oid!(B, 1, 1),
        ];
        oids.sort();
        let text: Vec<String> = oids.iter().map(|o| o.to_string()).collect();
        assert_eq!(text, ["B.1", "B.1.1", "B.1.2", "B.2.1", "E.1", "P.1"]);
    }

    #[test]
    fn test_starts_with_and_child() {
        let system = oid!(B, 1);
        let uptime = system.child(3).child(0);
        assert_eq!(uptime, oid!(B, 1, 3, 0));
        assert!(uptime.starts_with(&system));
        assert!(!oid!(P, 1, 3).starts_with(&system));
    }

    #[test]
    fn test_fromstr_and_debug() {
        let oid: Oid = "B.1.5.0".parse().unwrap();
        assert_eq!(format!("{:?}", oid), "Oid(B.1.5.0)");
    }
}
