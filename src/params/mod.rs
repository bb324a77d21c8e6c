// src/params/mod.rs
//
// Selection state for the report lives in a shareable query string
// (`cid`, `rid`, `ed`), so a report address can be bookmarked or pasted.
// Writes are read-modify-write merges against the current address; keys we
// don't own are preserved untouched.

use chrono::NaiveDate;
use url::form_urlencoded;

const KEY_CENSUS_ID: &str = "cid";
const KEY_RATE_ID: &str = "rid";
const KEY_EFFECTIVE_DATE: &str = "ed";

/// An ordered set of query-string pairs. Preserves the order keys first
/// appeared in, so round-tripping an address doesn't shuffle it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryAddress {
    pairs: Vec<(String, String)>,
}

impl QueryAddress {
    pub fn parse(query: &str) -> Self {
        let pairs = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        QueryAddress { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value for `key` in place, or append it if absent. All
    /// other pairs keep their position.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn to_query(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            ser.append_pair(k, v);
        }
        ser.finish()
    }
}

/// The (census, rate, effective date) triple as picked so far. Any part may
/// still be missing; dependent queries stay idle until all three are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSelection {
    pub census_master_id: Option<i64>,
    pub rate_master_id: Option<i64>,
    pub effective_date: Option<String>,
}

/// A fully validated selection triple. This is the cache-key component that
/// scopes every save-age page: change any field and you are looking at a
/// different report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub census_master_id: i64,
    pub rate_master_id: i64,
    pub effective_date: String,
}

impl ReportSelection {
    /// Read the selection out of an address. Ids that don't parse as
    /// integers read as absent rather than erroring.
    pub fn from_address(addr: &QueryAddress) -> Self {
        ReportSelection {
            census_master_id: addr.get(KEY_CENSUS_ID).and_then(|v| v.parse().ok()),
            rate_master_id: addr.get(KEY_RATE_ID).and_then(|v| v.parse().ok()),
            effective_date: addr.get(KEY_EFFECTIVE_DATE).map(str::to_string),
        }
    }

    /// Merge the selection into an address, leaving unrelated keys alone.
    pub fn write_to(&self, addr: &mut QueryAddress) {
        if let Some(cid) = self.census_master_id {
            addr.set(KEY_CENSUS_ID, &cid.to_string());
        }
        if let Some(rid) = self.rate_master_id {
            addr.set(KEY_RATE_ID, &rid.to_string());
        }
        if let Some(ed) = &self.effective_date {
            addr.set(KEY_EFFECTIVE_DATE, ed);
        }
    }

    /// All three parts present and the date a strict ISO `YYYY-MM-DD`,
    /// otherwise `None`. Callers treat `None` as "don't query yet".
    pub fn validated(&self) -> Option<ReportKey> {
        let census_master_id = self.census_master_id?;
        let rate_master_id = self.rate_master_id?;
        let effective_date = self.effective_date.as_deref()?;
        if !is_iso_date(effective_date) {
            return None;
        }
        Some(ReportKey {
            census_master_id,
            rate_master_id,
            effective_date: effective_date.to_string(),
        })
    }
}

/// Strict `YYYY-MM-DD`: must parse as a real calendar date and be exactly
/// ten characters, so `2024-1-5` does not slip through.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_merges_without_clobbering_other_keys() {
        let mut addr = QueryAddress::parse("tab=report&cid=1&theme=dark");
        addr.set(KEY_CENSUS_ID, "42");
        addr.set(KEY_EFFECTIVE_DATE, "2025-06-01");
        assert_eq!(addr.to_query(), "tab=report&cid=42&theme=dark&ed=2025-06-01");
    }

    #[test]
    fn selection_round_trips_through_address() {
        let sel = ReportSelection {
            census_master_id: Some(12),
            rate_master_id: Some(3),
            effective_date: Some("2025-06-01".to_string()),
        };
        let mut addr = QueryAddress::parse("tab=report");
        sel.write_to(&mut addr);
        assert_eq!(ReportSelection::from_address(&addr), sel);
    }

    #[test]
    fn malformed_id_reads_as_absent() {
        let addr = QueryAddress::parse("cid=twelve&rid=3");
        let sel = ReportSelection::from_address(&addr);
        assert_eq!(sel.census_master_id, None);
        assert_eq!(sel.rate_master_id, Some(3));
    }

    #[test]
    fn validated_requires_full_iso_triple() {
        let mut sel = ReportSelection {
            census_master_id: Some(1),
            rate_master_id: Some(2),
            effective_date: Some("2025-6-1".to_string()),
        };
        assert_eq!(sel.validated(), None);

        sel.effective_date = Some("2025-06-01".to_string());
        let key = sel.validated().unwrap();
        assert_eq!(key.census_master_id, 1);
        assert_eq!(key.effective_date, "2025-06-01");

        sel.rate_master_id = None;
        assert_eq!(sel.validated(), None);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(is_iso_date("2024-02-29"));
        assert!(!is_iso_date("2023-02-29"));
        assert!(!is_iso_date("2024-13-01"));
        assert!(!is_iso_date("06/01/2025"));
    }
}
