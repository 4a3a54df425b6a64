//! MS-DTYP 2.4.2: SID

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A Windows security identifier: a revision, a 48-bit authority, and a
/// chain of sub-authorities. Printable/parseable in the familiar
/// `S-1-5-21-...` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    pub revision: u8,
    pub identifier_authority: u64,
    pub sub_authorities: Vec<u32>,
}

impl Sid {
    /// `S-1-1-0`: the "Everyone" well-known SID.
    pub const S_EVERYONE: &'static str = "S-1-1-0";
    /// `S-1-5-18`: the local system account.
    pub const S_LOCAL_SYSTEM: &'static str = "S-1-5-18";

    pub fn new(identifier_authority: u64, sub_authorities: Vec<u32>) -> Self {
        Self {
            revision: 1,
            identifier_authority,
            sub_authorities,
        }
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.identifier_authority)?;
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SidParseError {
    #[error("SID string must start with \"S-\"")]
    MissingPrefix,
    #[error("SID string is missing the revision or authority fields")]
    Truncated,
    #[error("invalid SID component: {0}")]
    InvalidComponent(String),
}

impl FromStr for Sid {
    type Err = SidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("S-").ok_or(SidParseError::MissingPrefix)?;
        let mut parts = rest.split('-');
        let revision: u8 = parts
            .next()
            .ok_or(SidParseError::Truncated)?
            .parse()
            .map_err(|_| SidParseError::InvalidComponent("revision".into()))?;
        let identifier_authority: u64 = parts
            .next()
            .ok_or(SidParseError::Truncated)?
            .parse()
            .map_err(|_| SidParseError::InvalidComponent("identifier_authority".into()))?;
        let sub_authorities = parts
            .map(|p| {
                p.parse()
                    .map_err(|_| SidParseError::InvalidComponent(p.to_string()))
            })
            .collect::<Result<Vec<u32>, _>>()?;
        Ok(Sid {
            revision,
            identifier_authority,
            sub_authorities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_well_known_sids() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        assert_eq!(sid.to_string(), Sid::S_EVERYONE);
        let sid = Sid::from_str(Sid::S_LOCAL_SYSTEM).unwrap();
        assert_eq!(sid.sub_authorities, vec![18]);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert_eq!(Sid::from_str("1-5-21"), Err(SidParseError::MissingPrefix));
    }
}
