use crate::model::{FetchError, ItemRow, NormalizedTable, TimeSeriesRow};
use crate::utils::{coerce_price, parse_compact_date, parse_period, strip_highlight};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const NO_TREND_DATA: &str = "no trend data returned for the requested range";
pub const NO_ITEM_DATA: &str = "no items returned for the query";

#[derive(Debug, Deserialize)]
struct TrendResponse {
    #[serde(default)]
    results: Vec<TrendResult>,
}

#[derive(Debug, Deserialize)]
struct TrendResult {
    title: String,
    #[serde(default)]
    data: Vec<TrendPoint>,
}

#[derive(Debug, Deserialize)]
struct TrendPoint {
    period: String,
    ratio: f64,
}

#[derive(Debug, Deserialize)]
struct ItemResponse {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawItem {
    title: Option<String>,
    lprice: Option<Value>,
    #[serde(rename = "mallName")]
    mall_name: Option<String>,
    category1: Option<String>,
    link: Option<String>,
    brand: Option<String>,
    bloggername: Option<String>,
    postdate: Option<String>,
}

fn malformed(e: serde_json::Error) -> FetchError {
    FetchError::MalformedResponse(e.to_string())
}

/// Flattens a trend response into one row per (keyword, period), in response order.
pub fn normalize_trend(body: &str) -> Result<NormalizedTable<TimeSeriesRow>, FetchError> {
    let response: TrendResponse = serde_json::from_str(body).map_err(malformed)?;

    let mut rows = Vec::new();
    for result in response.results {
        for point in result.data {
            let period = parse_period(&point.period).ok_or_else(|| {
                FetchError::MalformedResponse(format!(
                    "invalid period '{}' for '{}'",
                    point.period, result.title
                ))
            })?;
            rows.push(TimeSeriesRow {
                period,
                value: point.ratio,
                keyword: result.title.clone(),
            });
        }
    }

    debug!("Normalized {} trend rows", rows.len());
    if rows.is_empty() {
        return Ok(NormalizedTable::empty(NO_TREND_DATA));
    }
    Ok(NormalizedTable::new(rows))
}

/// Flattens a shop or blog search response into item rows.
pub fn normalize_items(body: &str) -> Result<NormalizedTable<ItemRow>, FetchError> {
    let response: ItemResponse = serde_json::from_str(body).map_err(malformed)?;

    let rows: Vec<ItemRow> = response.items.into_iter().map(normalize_item).collect();

    debug!("Normalized {} item rows", rows.len());
    if rows.is_empty() {
        return Ok(NormalizedTable::empty(NO_ITEM_DATA));
    }
    Ok(NormalizedTable::new(rows))
}

fn normalize_item(item: RawItem) -> ItemRow {
    let price = match item.lprice {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => coerce_price(&s),
        _ => None,
    };

    ItemRow {
        title: strip_highlight(item.title.as_deref().unwrap_or_default()),
        price,
        seller_name: item.mall_name.unwrap_or_default(),
        category: item.category1.unwrap_or_default(),
        link: item.link.unwrap_or_default(),
        brand: item.brand.filter(|b| !b.is_empty()),
        blogger_name: item.bloggername,
        post_date: item.postdate.as_deref().and_then(parse_compact_date),
    }
}
