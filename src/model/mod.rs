// src/model/mod.rs
//
// Typed mirrors of the report API's response bodies. Every response is
// deserialized into one of these before anything else touches it; a shape
// mismatch surfaces as `ApiError::Contract` and never reaches the UI layer.

use serde::{Deserialize, Serialize};

/// An uploaded census roster. Immutable once created by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CensusMaster {
    pub census_master_id: i64,
    pub census_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub census_path: Option<String>,
}

/// One insured individual within a census. Read-only from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CensusDetail {
    pub census_detail_id: i64,
    pub census_master_id: i64,
    pub birthdate: String,
    pub relationship: String,
    pub tobacco_disposition: String,
    pub effective_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateMaster {
    pub rate_master_id: i64,
    pub rate_master_name: String,
}

/// A typeahead search hit from the `/api/dd/*` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropdownItem {
    pub id: i64,
    pub name: String,
}

/// One computed save-age record. Valid only for the (census, rate, date)
/// triple it was computed against; never persisted beyond the page cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveAgeRow {
    pub census_detail_id: i64,
    pub relationship: String,
    pub tobacco_disposition: String,
    pub issue_age: i64,
    pub birthdate: String,
    pub save_age_effective_date: String,
    pub new_effective_date: String,
    #[serde(default)]
    pub save_age_rate: Option<f64>,
    #[serde(default)]
    pub new_rate: Option<f64>,
    #[serde(default)]
    pub diff: Option<f64>,
}

/// Aggregate statistics returned alongside every save-age page. `count` is
/// the total matching row count across all pages; the `pct_range_*` fields
/// are the impacted-bucket counts behind the "# Impacted" card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveAgeStats {
    pub count: u64,
    #[serde(default)]
    pub save_age_rate: Option<f64>,
    #[serde(default)]
    pub new_rate: Option<f64>,
    #[serde(default)]
    pub diff: Option<f64>,
    #[serde(default)]
    pub pct_range_le_0: Option<f64>,
    #[serde(default)]
    pub pct_range_00_05: Option<f64>,
    #[serde(default)]
    pub pct_range_05_10: Option<f64>,
    #[serde(default)]
    pub pct_range_10_20: Option<f64>,
    #[serde(default)]
    pub pct_range_gt_20: Option<f64>,
}

/// One page of the save-age report plus its aggregate stats.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveAgeOutput {
    pub data: Vec<SaveAgeRow>,
    pub stats: SaveAgeStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TobaccoBucket {
    pub tobacco_disposition: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssueAgeBucket {
    pub issue_age: i64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipBucket {
    pub relationship: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TenureBucket {
    pub tenure: i64,
    pub count: u64,
}

/// Census-level histograms, recomputed per request by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CensusStats {
    pub tobacco_stats: Vec<TobaccoBucket>,
    pub issue_age_stats: Vec<IssueAgeBucket>,
    pub relationship_stats: Vec<RelationshipBucket>,
    pub tenure_stats: Vec<TenureBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_age_output_accepts_nullish_rates() {
        let body = r#"{
            "data": [{
                "census_detail_id": 7,
                "relationship": "EE",
                "tobacco_disposition": "N",
                "issue_age": 42,
                "birthdate": "1982-03-01",
                "save_age_effective_date": "2020-01-01",
                "new_effective_date": "2025-01-01",
                "save_age_rate": 12.5,
                "new_rate": null,
                "diff": null
            }],
            "stats": {"count": 311, "pct_range_le_0": 40}
        }"#;
        let out: SaveAgeOutput = serde_json::from_str(body).unwrap();
        assert_eq!(out.stats.count, 311);
        assert_eq!(out.data[0].new_rate, None);
        assert_eq!(out.data[0].save_age_rate, Some(12.5));
        assert_eq!(out.stats.pct_range_le_0, Some(40.0));
        assert_eq!(out.stats.pct_range_gt_20, None);
    }

    #[test]
    fn census_master_requires_id_and_name() {
        let err = serde_json::from_str::<CensusMaster>(r#"{"census_name": "acme"}"#);
        assert!(err.is_err());

        let ok: CensusMaster =
            serde_json::from_str(r#"{"census_master_id": 3, "census_name": "acme"}"#).unwrap();
        assert_eq!(ok.census_path, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let ok: RateMaster = serde_json::from_str(
            r#"{"rate_master_id": 1, "rate_master_name": "std", "created_by": "x"}"#,
        )
        .unwrap();
        assert_eq!(ok.rate_master_name, "std");
    }
}
