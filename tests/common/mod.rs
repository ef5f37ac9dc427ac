#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use naver_trends::cache::ManualClock;
use naver_trends::client::{ApiClient, ApiRequest, Endpoint};
use naver_trends::config::DashboardConfig;
use naver_trends::model::FetchError;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Stand-in for the upstream API: records every request and answers from fixtures.
#[derive(Default)]
pub struct FakeClient {
    pub requests: Mutex<Vec<ApiRequest>>,
    /// Any trend request containing one of these keywords gets a 429.
    pub failing_keywords: Vec<String>,
    pub shop_body: String,
    pub blog_body: String,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            shop_body: SHOP_BODY.to_string(),
            blog_body: BLOG_BODY.to_string(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, keyword: &str) -> Self {
        self.failing_keywords.push(keyword.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn trend_requests(&self) -> Vec<Vec<String>> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                ApiRequest::Post { body, .. } => Some(requested_keywords(&body)),
                ApiRequest::Get { .. } => None,
            })
            .collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.requests().iter().filter(|r| r.endpoint() == endpoint).count()
    }
}

fn requested_keywords(body: &Value) -> Vec<String> {
    body["keywordGroups"]
        .as_array()
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| g["groupName"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Two daily points per keyword; the second value depends on the keyword length.
fn trend_body(keywords: &[String]) -> String {
    let results: Vec<Value> = keywords
        .iter()
        .map(|k| {
            json!({
                "title": k,
                "keywords": [k],
                "data": [
                    {"period": "2025-02-01", "ratio": 100.0},
                    {"period": "2025-02-02", "ratio": 10.0 * k.len() as f64}
                ]
            })
        })
        .collect();
    json!({"startDate": "2025-02-01", "endDate": "2025-02-02", "timeUnit": "date", "results": results})
        .to_string()
}

#[async_trait::async_trait]
impl ApiClient for FakeClient {
    async fn send(&self, request: &ApiRequest) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        match request {
            ApiRequest::Post { body, .. } => {
                let keywords = requested_keywords(body);
                if keywords.iter().any(|k| self.failing_keywords.contains(k)) {
                    return Err(FetchError::UpstreamHttp {
                        status: 429,
                        body: "rate limited".into(),
                    });
                }
                Ok(trend_body(&keywords))
            }
            ApiRequest::Get { endpoint: Endpoint::ShopSearch, .. } => Ok(self.shop_body.clone()),
            ApiRequest::Get { .. } => Ok(self.blog_body.clone()),
        }
    }
}

pub const SHOP_BODY: &str = r#"{"total": 4, "start": 1, "display": 4, "items": [
    {"title": "<b>Padding</b> long", "lprice": "120000", "mallName": "Mall A", "category1": "Fashion", "link": "https://shop/1", "brand": "North"},
    {"title": "Light <b>padding</b>", "lprice": "80000", "mallName": "Mall B", "category1": "Fashion", "link": "https://shop/2", "brand": ""},
    {"title": "Kids <b>padding</b>", "lprice": "60,000", "mallName": "Mall A", "category1": "Kids", "link": "https://shop/3"},
    {"title": "Vest", "lprice": "40000", "mallName": "Mall C", "category1": "Kids", "link": "https://shop/4"}
]}"#;

pub const BLOG_BODY: &str = r#"{"total": 3, "items": [
    {"title": "<b>padding</b> review", "link": "https://blog/1", "bloggername": "kim", "postdate": "20250201"},
    {"title": "winter haul", "link": "https://blog/2", "bloggername": "lee", "postdate": "20250201"},
    {"title": "old post", "link": "https://blog/3", "bloggername": "kim", "postdate": "n/a"}
]}"#;

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap()))
}

pub fn dashboard_config(keywords: &[&str], batch_mode: &str) -> DashboardConfig {
    serde_json::from_value(json!({
        "name": "test",
        "keywords": keywords,
        "batch_mode": batch_mode,
        "start_date": "2025-02-01",
    }))
    .unwrap()
}
