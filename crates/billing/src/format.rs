//! Display formatting for money and dates.

use chrono::NaiveDate;

use cloudkitchen_core::{DomainError, DomainResult};

/// Whole amount with two decimals, no grouping: `10000` -> `"10000.00"`.
pub fn fixed2(amount: u64) -> String {
    format!("{amount}.00")
}

/// Whole amount with Indian digit grouping and two decimals:
/// `1234567` -> `"12,34,567.00"`.
pub fn grouped(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("{digits}.00");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2 + 3);
    // Leading group is 1 or 2 digits; the rest are pairs.
    let first = head.len() % 2;
    if first == 1 {
        out.push_str(&head[..1]);
    }
    for (i, pair) in head.as_bytes()[first..].chunks(2).enumerate() {
        if i > 0 || first == 1 {
            out.push(',');
        }
        out.extend(pair.iter().map(|&b| b as char));
    }
    out.push(',');
    out.push_str(tail);
    out.push_str(".00");
    out
}

/// `dd/mm/yyyy`, or an empty string when the date is unknown.
pub fn day_month_year(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Parse an ISO `yyyy-mm-dd` form value; blank means "not set".
pub fn parse_optional_date(raw: &str) -> DomainResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| DomainError::validation(format!("invalid date {raw:?}: {e}")))
}

/// Serde adapter for optional ISO dates stored as `""` when unset.
pub(crate) mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => super::parse_optional_date(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_uses_indian_grouping() {
        assert_eq!(grouped(0), "0.00");
        assert_eq!(grouped(999), "999.00");
        assert_eq!(grouped(6_000), "6,000.00");
        assert_eq!(grouped(10_000), "10,000.00");
        assert_eq!(grouped(123_456), "1,23,456.00");
        assert_eq!(grouped(1_234_567), "12,34,567.00");
    }

    #[test]
    fn fixed2_has_two_decimals() {
        assert_eq!(fixed2(200), "200.00");
        assert_eq!(fixed2(0), "0.00");
    }

    #[test]
    fn dates_render_day_first() {
        assert_eq!(day_month_year(NaiveDate::from_ymd_opt(2025, 1, 4)), "04/01/2025");
        assert_eq!(day_month_year(None), "");
    }

    #[test]
    fn blank_date_is_unset() {
        assert_eq!(parse_optional_date("  ").unwrap(), None);
        assert!(parse_optional_date("2025-13-01").is_err());
    }
}
