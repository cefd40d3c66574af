// ── Zone member addressing ──
//
// A zone or alias member is either a port/node WWN, a legacy
// `domain,index` pair, or (for zones only) the name of an alias.
// Zone object names share one naming rule across aliases, zones and
// configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shortest and longest legal zone object name.
pub const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=64;

/// Whether `name` is a legal alias, zone or zone configuration name.
///
/// 2-64 characters, the first alphanumeric, the rest alphanumeric,
/// underscore or dash.
pub fn is_valid_zone_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    NAME_LEN.contains(&name.chars().count())
        && first.is_ascii_alphanumeric()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ── Wwn ─────────────────────────────────────────────────────────────

/// World Wide Name, normalized to lowercase colon-separated hex
/// (`10:00:00:05:1e:01:02:03`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wwn(String);

impl Wwn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Wwn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Wwn {
    type Err = InvalidMember;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: Vec<&str> = s.split(':').collect();
        let valid = bytes.len() == 8
            && bytes
                .iter()
                .all(|b| b.len() == 2 && b.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(InvalidMember(s.to_owned()))
        }
    }
}

impl TryFrom<String> for Wwn {
    type Error = InvalidMember;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Wwn> for String {
    fn from(w: Wwn) -> Self {
        w.0
    }
}

/// A string that is neither a WWN nor a `d,i` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid zone member: {0}")]
pub struct InvalidMember(pub String);

// ── Member ──────────────────────────────────────────────────────────

/// A parsed zone member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    Wwn(Wwn),
    /// `domain,index`, e.g. `1,4`.
    DomainIndex { domain: u8, index: u16 },
    /// Reference to an alias by name.
    Alias(String),
}

impl Member {
    /// Classify a raw member string.
    ///
    /// Returns `None` when the string is neither an address nor a legal
    /// object name.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(wwn) = raw.parse::<Wwn>() {
            return Some(Self::Wwn(wwn));
        }
        if let Some((d, i)) = raw.split_once(',') {
            return match (d.trim().parse(), i.trim().parse()) {
                (Ok(domain), Ok(index)) => Some(Self::DomainIndex { domain, index }),
                _ => None,
            };
        }
        is_valid_zone_name(raw).then(|| Self::Alias(raw.to_owned()))
    }

    /// Whether this member addresses a device directly.
    pub fn is_address(&self) -> bool {
        !matches!(self, Self::Alias(_))
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wwn(w) => write!(f, "{w}"),
            Self::DomainIndex { domain, index } => write!(f, "{domain},{index}"),
            Self::Alias(name) => f.write_str(name),
        }
    }
}

/// Whether `raw` is a device address (WWN or `d,i`), as required for
/// alias members.
pub fn is_address(raw: &str) -> bool {
    Member::parse(raw).is_some_and(|m| m.is_address())
}

/// Whether `raw` is acceptable as a zone member (address or alias name).
pub fn is_zone_member(raw: &str) -> bool {
    Member::parse(raw).is_some()
}

/// Canonical spelling of a member: WWNs lowercased, `d,i` without
/// whitespace, names untouched.
pub fn normalize_member(raw: &str) -> String {
    match Member::parse(raw) {
        Some(m) => m.to_string(),
        None => raw.to_owned(),
    }
}
