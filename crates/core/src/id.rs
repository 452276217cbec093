//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a bill record (e.g. `CORP-0001`, `EVT-0012`).
///
/// Ids are opaque strings once stored; only freshly minted ids are guaranteed
/// to follow the `<PREFIX>-<sequence>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(String);

impl BillId {
    /// Build `<prefix>-<seq>` with the sequence zero padded to four digits.
    pub fn compose(prefix: &str, seq: u64) -> Self {
        Self(format!("{prefix}-{seq:04}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric sequence of this id if it was minted under `prefix`.
    pub fn sequence(&self, prefix: &str) -> Option<u64> {
        let rest = self.0.strip_prefix(prefix)?.strip_prefix('-')?;
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse().ok()
    }
}

impl core::fmt::Display for BillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BillId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("BillId: empty"));
        }
        Ok(Self(s.to_string()))
    }
}

/// Identifier of a line item, unique within its bill.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub u32);

impl LineItemId {
    pub const FIRST: LineItemId = LineItemId(1);

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_pads_to_four_digits() {
        assert_eq!(BillId::compose("CORP", 1).as_str(), "CORP-0001");
        assert_eq!(BillId::compose("EVT", 12345).as_str(), "EVT-12345");
    }

    #[test]
    fn sequence_only_matches_own_prefix() {
        let id: BillId = "CORP-0042".parse().unwrap();
        assert_eq!(id.sequence("CORP"), Some(42));
        assert_eq!(id.sequence("EVT"), None);

        let legacy: BillId = "CORP-1735948800000".parse().unwrap();
        assert_eq!(legacy.sequence("CORP"), Some(1_735_948_800_000));

        let odd: BillId = "CORP-x1".parse().unwrap();
        assert_eq!(odd.sequence("CORP"), None);
    }

    #[test]
    fn blank_bill_id_is_rejected() {
        let err = "   ".parse::<BillId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = BillId::compose("EVT", 1);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"EVT-0001\"");
        assert_eq!(serde_json::to_string(&LineItemId(3)).unwrap(), "3");
    }
}
