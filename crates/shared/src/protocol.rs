use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Reel, ReelId, StockIdentifier, StockOption};

pub const UPLOAD_PART_FILE: &str = "file";
pub const UPLOAD_PART_CAPTION: &str = "caption";
pub const UPLOAD_PART_STOCK_IDENTIFIER: &str = "stock_identifier";

/// Body of the market-data "most active by index" query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MostActiveByIndexRequest {
    pub index_id: i64,
    pub segment_id: i64,
    pub market_data_type: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostActiveByIndexResponse {
    #[serde(rename = "Response")]
    pub response: MostActivePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostActivePayload {
    #[serde(rename = "MostActiveList")]
    pub most_active_list: Vec<MostActiveEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MostActiveEntry {
    #[serde(rename = "SecDesc")]
    pub sec_desc: String,
    #[serde(rename = "Token")]
    pub token: LooseId,
}

impl MostActiveEntry {
    pub fn into_stock_option(self, segment_id: i64) -> StockOption {
        StockOption {
            value: StockIdentifier::from_parts(segment_id, &self.token),
            label: self.sec_desc,
        }
    }
}

/// Identifier the upstream services emit either as a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Text(String),
    Number(i64),
}

impl fmt::Display for LooseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseId::Text(text) => f.write_str(text),
            LooseId::Number(number) => write!(f, "{number}"),
        }
    }
}

/// One entry of the reels-listing endpoint. Everything except the id may be
/// absent or `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelRecord {
    pub reel_id: LooseId,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub stock_identifier: Option<String>,
    #[serde(default)]
    pub likes: Option<i64>,
}

impl From<ReelRecord> for Reel {
    fn from(record: ReelRecord) -> Self {
        Self {
            id: ReelId(record.reel_id.to_string()),
            caption: record.caption.unwrap_or_default(),
            media_url: record.media_url.unwrap_or_default(),
            stock_identifier: StockIdentifier(record.stock_identifier.unwrap_or_default()),
            like_count: record.likes.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_data_request_uses_pascal_case_keys() {
        let body = serde_json::to_value(MostActiveByIndexRequest {
            index_id: 26012,
            segment_id: 1,
            market_data_type: 1,
        })
        .expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({ "IndexId": 26012, "SegmentId": 1, "MarketDataType": 1 })
        );
    }

    #[test]
    fn most_active_entries_accept_string_and_numeric_tokens() {
        let raw = r#"{
            "Response": {
                "MostActiveList": [
                    { "SecDesc": "RELIANCE", "Token": "2885" },
                    { "SecDesc": "TCS", "Token": 11536, "Ltp": 3900.5 }
                ]
            }
        }"#;
        let parsed: MostActiveByIndexResponse = serde_json::from_str(raw).expect("parse");
        let options: Vec<StockOption> = parsed
            .response
            .most_active_list
            .into_iter()
            .map(|entry| entry.into_stock_option(1))
            .collect();

        assert_eq!(options[0].label, "RELIANCE");
        assert_eq!(options[0].value.as_str(), "1@2885");
        assert_eq!(options[1].value.as_str(), "1@11536");
        assert_eq!(options[1].value.segment(), Some("1"));
        assert_eq!(options[1].value.token(), Some("11536"));
    }

    #[test]
    fn reel_record_maps_wire_names_onto_domain_reel() {
        let raw = r#"{
            "reel_id": 42,
            "caption": "breakout",
            "media_url": "https://cdn.example/42.mp4",
            "stock_identifier": "1@2885",
            "likes": 7
        }"#;
        let record: ReelRecord = serde_json::from_str(raw).expect("parse");
        let reel = Reel::from(record);

        assert_eq!(reel.id.as_str(), "42");
        assert_eq!(reel.caption, "breakout");
        assert_eq!(reel.media_url, "https://cdn.example/42.mp4");
        assert_eq!(reel.stock_identifier.as_str(), "1@2885");
        assert_eq!(reel.like_count, 7);
    }

    #[test]
    fn reel_record_without_likes_counts_zero() {
        let record: ReelRecord =
            serde_json::from_str(r#"{ "reel_id": "abc", "caption": "x" }"#).expect("parse");
        assert_eq!(Reel::from(record).like_count, 0);
    }

    #[test]
    fn null_columns_in_one_record_keep_the_listing() {
        let raw = r#"[
            { "reel_id": 1, "caption": "gap up", "media_url": "https://cdn.example/1.mp4", "stock_identifier": "1@2885", "likes": 3 },
            { "reel_id": 2, "caption": null, "media_url": null, "stock_identifier": null, "likes": null }
        ]"#;
        let records: Vec<ReelRecord> = serde_json::from_str(raw).expect("parse");
        let reels: Vec<Reel> = records.into_iter().map(Reel::from).collect();

        assert_eq!(reels.len(), 2);
        assert_eq!(reels[0].caption, "gap up");
        assert_eq!(reels[0].like_count, 3);
        assert_eq!(reels[1].id.as_str(), "2");
        assert_eq!(reels[1].caption, "");
        assert_eq!(reels[1].media_url, "");
        assert_eq!(reels[1].stock_identifier.as_str(), "");
        assert_eq!(reels[1].like_count, 0);
    }
}
