use crate::analyzer::{
    correlation_matrix, count_by, describe, distinct_count, pivot, summary_stats, top_n,
    Aggregation, CorrelationMatrix, GroupStats, PivotTable,
};
use crate::batcher::{plan_groups, reconcile, TrendOutcome};
use crate::cache::{CacheKey, Clock, TtlCache};
use crate::client::{ApiClient, ApiRequest, TrendQuery};
use crate::config::DashboardConfig;
use crate::model::{FetchError, ItemRow, NormalizedTable, TimeSeriesRow};
use crate::normalizer::{normalize_items, normalize_trend};
use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const TREND_OPERATION: &str = "datalab.search";
pub const SHOP_OPERATION: &str = "search.shop";
pub const BLOG_OPERATION: &str = "search.blog";

type Normalize<R> = fn(&str) -> Result<NormalizedTable<R>, FetchError>;

pub struct TrendReport {
    pub outcome: TrendOutcome,
    pub summary: BTreeMap<String, GroupStats>,
    /// Keywords by mean relative index, highest first.
    pub ranked_means: Vec<(String, f64)>,
    pub pivot: PivotTable<NaiveDate, String>,
    /// Present only when at least two keywords have data.
    pub correlation: Option<CorrelationMatrix<String>>,
}

pub struct ShopReport {
    pub query: String,
    pub items: NormalizedTable<ItemRow>,
    pub price: Option<GroupStats>,
    pub active_sellers: usize,
    pub top_sellers: Vec<(String, usize)>,
    pub by_category: BTreeMap<String, GroupStats>,
}

pub struct BlogReport {
    pub query: String,
    pub posts: NormalizedTable<ItemRow>,
    pub daily_posts: BTreeMap<NaiveDate, usize>,
    pub top_bloggers: Vec<(String, usize)>,
}

pub struct DashboardReport {
    pub name: String,
    pub trend: TrendReport,
    /// `None` when there is no keyword to search for.
    pub shop: Option<Result<ShopReport, FetchError>>,
    pub blog: Option<Result<BlogReport, FetchError>>,
}

/// One parameterized fetch → normalize → aggregate pipeline shared by every dashboard.
pub struct Dashboard {
    client: Arc<dyn ApiClient>,
    clock: Arc<dyn Clock>,
    trends: TtlCache<NormalizedTable<TimeSeriesRow>>,
    shop: TtlCache<NormalizedTable<ItemRow>>,
    blog: TtlCache<NormalizedTable<ItemRow>>,
}

impl Dashboard {
    pub fn new(client: Arc<dyn ApiClient>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            trends: TtlCache::new(ttl, clock.clone()),
            shop: TtlCache::new(ttl, clock.clone()),
            blog: TtlCache::new(ttl, clock.clone()),
            clock,
        }
    }

    async fn cached_fetch<R: Clone>(
        &self,
        cache: &TtlCache<NormalizedTable<R>>,
        operation: &'static str,
        request: ApiRequest,
        normalize: Normalize<R>,
    ) -> Result<NormalizedTable<R>, FetchError> {
        let key = CacheKey::new(operation, request.canonical_args());
        let client = &self.client;
        cache
            .get_or_fetch(key, || async move {
                info!("Calling {}", request.endpoint());
                let body = client.send(&request).await?;
                normalize(&body)
            })
            .await
    }

    /// Issues one cached request per keyword group and combines the results.
    /// A failed group is reported in `failures` without affecting the others.
    pub async fn fetch_trends(&self, cfg: &DashboardConfig) -> TrendOutcome {
        let end_date = cfg.end_date_or(self.clock.now().date_naive());
        let groups = plan_groups(&cfg.keywords, cfg.batch_mode);
        info!(
            "Fetching trends for '{}': {} keyword group(s), {} to {}",
            cfg.name,
            groups.len(),
            cfg.start_date,
            end_date
        );

        let calls = groups.into_iter().map(|group| async move {
            let query = TrendQuery::for_group(&group, cfg.start_date, end_date, cfg.time_unit)
                .with_filters(cfg.device.clone(), cfg.gender.clone(), cfg.ages.clone());
            let result = self
                .cached_fetch(&self.trends, TREND_OPERATION, ApiRequest::trend(&query), normalize_trend)
                .await;
            (group, result)
        });
        let outcome = reconcile(join_all(calls).await);

        for failure in &outcome.failures {
            warn!(
                "Trend request for {} {:?} failed: {}",
                failure.group.name(),
                failure.group.keywords(),
                failure.error
            );
        }
        if let Some(note) = &outcome.table.note {
            info!("Trend table for '{}' is empty: {}", cfg.name, note);
        }
        outcome
    }

    pub async fn fetch_shop(&self, query: &str, display: u32) -> Result<NormalizedTable<ItemRow>, FetchError> {
        self.cached_fetch(&self.shop, SHOP_OPERATION, ApiRequest::shop(query, display), normalize_items)
            .await
    }

    pub async fn fetch_blog(&self, query: &str, display: u32) -> Result<NormalizedTable<ItemRow>, FetchError> {
        self.cached_fetch(&self.blog, BLOG_OPERATION, ApiRequest::blog(query, display), normalize_items)
            .await
    }

    pub async fn build_report(&self, cfg: &DashboardConfig) -> DashboardReport {
        let trend = trend_report(self.fetch_trends(cfg).await);

        let shop = match cfg.shop_query() {
            Some(query) => Some(
                self.fetch_shop(query, cfg.item_display())
                    .await
                    .map(|items| shop_report(query, items, cfg.top_n)),
            ),
            None => None,
        };

        let blog = match cfg.blog_query() {
            Some(query) => Some(
                self.fetch_blog(query, cfg.item_display())
                    .await
                    .map(|posts| blog_report(query, posts, cfg.top_n)),
            ),
            None => None,
        };

        DashboardReport {
            name: cfg.name.clone(),
            trend,
            shop,
            blog,
        }
    }
}

pub fn trend_report(outcome: TrendOutcome) -> TrendReport {
    let rows = &outcome.table.rows;
    let summary = summary_stats(rows, |r| r.keyword.clone(), |r| Some(r.value));

    let mut ranked_means: Vec<(String, f64)> = summary
        .iter()
        .map(|(keyword, stats)| (keyword.clone(), stats.mean))
        .collect();
    ranked_means.sort_by(|a, b| b.1.total_cmp(&a.1));

    let table = pivot(
        rows,
        |r| r.period,
        |r| r.keyword.clone(),
        |r| Some(r.value),
        Aggregation::Mean,
    );
    let correlation = (table.n_cols() >= 2).then(|| correlation_matrix(&table));
    debug!(
        "Trend pivot: {} periods x {} keywords",
        table.n_rows(),
        table.n_cols()
    );

    TrendReport {
        outcome,
        summary,
        ranked_means,
        pivot: table,
        correlation,
    }
}

pub fn shop_report(query: &str, items: NormalizedTable<ItemRow>, top: usize) -> ShopReport {
    let rows = &items.rows;
    let price = describe(rows.iter().filter_map(|r| r.price));
    let active_sellers = distinct_count(rows, |r| r.seller_name.clone());
    let top_sellers = top_n(rows, |r| r.seller_name.clone(), top);
    let by_category = summary_stats(rows, |r| r.category.clone(), |r| r.price);

    ShopReport {
        query: query.to_string(),
        items,
        price,
        active_sellers,
        top_sellers,
        by_category,
    }
}

/// Posts are listed newest first; undated posts go last in their original order.
pub fn blog_report(query: &str, mut posts: NormalizedTable<ItemRow>, top: usize) -> BlogReport {
    posts.rows.sort_by_key(|r| Reverse(r.post_date));

    let daily_posts = count_by(&posts.rows, |r| r.post_date);
    let named: Vec<&str> = posts
        .rows
        .iter()
        .filter_map(|r| r.blogger_name.as_deref())
        .collect();
    let top_bloggers = top_n(&named, |name| name.to_string(), top);

    BlogReport {
        query: query.to_string(),
        posts,
        daily_posts,
        top_bloggers,
    }
}
