// Request payloads for the trend and search endpoints
use crate::model::KeywordGroup;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DatalabSearch,
    ShopSearch,
    BlogSearch,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::DatalabSearch => "/v1/datalab/search",
            Endpoint::ShopSearch => "/v1/search/shop.json",
            Endpoint::BlogSearch => "/v1/search/blog.json",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Date,
    Week,
    Month,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Date => "date",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
        }
    }
}

/// Body of one trend request covering a single [`KeywordGroup`].
///
/// Every keyword becomes its own upstream topic, named after itself, so the
/// response carries one series per keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_unit: TimeUnit,
    pub keywords: Vec<String>,
    pub device: Option<String>,
    pub gender: Option<String>,
    pub ages: Vec<String>,
}

impl TrendQuery {
    pub fn for_group(
        group: &KeywordGroup,
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_unit: TimeUnit,
    ) -> Self {
        Self {
            start_date,
            end_date,
            time_unit,
            keywords: group.keywords().to_vec(),
            device: None,
            gender: None,
            ages: Vec::new(),
        }
    }

    pub fn with_filters(mut self, device: Option<String>, gender: Option<String>, ages: Vec<String>) -> Self {
        self.device = device.filter(|d| !d.is_empty());
        self.gender = gender.filter(|g| !g.is_empty());
        self.ages = ages;
        self
    }

    pub fn to_json(&self) -> Value {
        let groups: Vec<Value> = self
            .keywords
            .iter()
            .map(|k| json!({ "groupName": k, "keywords": [k] }))
            .collect();

        let mut body = json!({
            "startDate": self.start_date.format("%Y-%m-%d").to_string(),
            "endDate": self.end_date.format("%Y-%m-%d").to_string(),
            "timeUnit": self.time_unit.as_str(),
            "keywordGroups": groups,
        });

        if let Value::Object(map) = &mut body {
            if let Some(device) = &self.device {
                map.insert("device".into(), json!(device));
            }
            if let Some(gender) = &self.gender {
                map.insert("gender".into(), json!(gender));
            }
            if !self.ages.is_empty() {
                map.insert("ages".into(), json!(self.ages));
            }
        }
        body
    }
}

/// A fully-formed upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Post { endpoint: Endpoint, body: Value },
    Get { endpoint: Endpoint, query: Vec<(String, String)> },
}

impl ApiRequest {
    pub fn trend(query: &TrendQuery) -> Self {
        ApiRequest::Post {
            endpoint: Endpoint::DatalabSearch,
            body: query.to_json(),
        }
    }

    pub fn shop(query: &str, display: u32) -> Self {
        ApiRequest::Get {
            endpoint: Endpoint::ShopSearch,
            query: vec![
                ("query".into(), query.to_string()),
                ("display".into(), display.to_string()),
                ("sort".into(), "sim".into()),
            ],
        }
    }

    pub fn blog(query: &str, display: u32) -> Self {
        ApiRequest::Get {
            endpoint: Endpoint::BlogSearch,
            query: vec![
                ("query".into(), query.to_string()),
                ("display".into(), display.to_string()),
            ],
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiRequest::Post { endpoint, .. } | ApiRequest::Get { endpoint, .. } => *endpoint,
        }
    }

    /// Canonical argument string; equal requests produce equal strings.
    ///
    /// JSON object keys serialise in sorted order, so field insertion order
    /// does not leak into the key.
    pub fn canonical_args(&self) -> String {
        match self {
            ApiRequest::Post { body, .. } => body.to_string(),
            ApiRequest::Get { query, .. } => {
                let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
                pairs.sort();
                pairs.join("&")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trend_body_has_one_topic_per_keyword() {
        let group = KeywordGroup::new("group-1", vec!["omega3".into(), "vitamin d".into()]).unwrap();
        let query = TrendQuery::for_group(&group, date(2025, 1, 1), date(2025, 3, 31), TimeUnit::Date);
        let body = query.to_json();

        assert_eq!(body["startDate"], "2025-01-01");
        assert_eq!(body["endDate"], "2025-03-31");
        assert_eq!(body["timeUnit"], "date");
        assert_eq!(body["keywordGroups"][1]["groupName"], "vitamin d");
        assert_eq!(body["keywordGroups"][1]["keywords"][0], "vitamin d");
        assert!(body.get("device").is_none());
        assert!(body.get("ages").is_none());
    }

    #[test]
    fn filters_are_added_when_present() {
        let group = KeywordGroup::new("group-1", vec!["padding".into()]).unwrap();
        let query = TrendQuery::for_group(&group, date(2025, 1, 1), date(2025, 1, 2), TimeUnit::Month)
            .with_filters(Some("mo".into()), Some(String::new()), vec!["3".into(), "4".into()]);
        let body = query.to_json();

        assert_eq!(body["device"], "mo");
        assert!(body.get("gender").is_none());
        assert_eq!(body["ages"], json!(["3", "4"]));
    }

    #[test]
    fn canonical_args_ignore_query_order() {
        let a = ApiRequest::Get {
            endpoint: Endpoint::ShopSearch,
            query: vec![("a".into(), "1".into()), ("b".into(), "2".into())],
        };
        let b = ApiRequest::Get {
            endpoint: Endpoint::ShopSearch,
            query: vec![("b".into(), "2".into()), ("a".into(), "1".into())],
        };
        assert_eq!(a.canonical_args(), b.canonical_args());
        assert_ne!(
            ApiRequest::shop("padding", 100).canonical_args(),
            ApiRequest::shop("fleece", 100).canonical_args()
        );
    }
}
