use naver_trends::cache::{Clock, SystemClock};
use naver_trends::client::{ApiClient, NaverClient};
use naver_trends::config::{load_config, AppConfig, Credentials, DashboardConfig};
use naver_trends::pipeline::{BlogReport, Dashboard, DashboardReport, ShopReport, TrendReport};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Rows shown in the item listings.
const LISTING_ROWS: usize = 20;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Credentials may live in a local .env file
    if let Err(e) = dotenvy::dotenv() {
        info!("No .env loaded: {}", e);
    }

    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let credentials = Credentials::from_env();
    if credentials.is_none() {
        warn!("API credentials are not set; every request will report MissingCredentials");
    }

    let client: Arc<dyn ApiClient> = match NaverClient::new(
        config.api_base_url.clone(),
        credentials,
        Duration::from_secs(config.request_timeout_seconds),
    ) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let ttl = match config.cache_ttl() {
        Ok(ttl) => ttl,
        Err(e) => {
            error!("Config error: {}", e);
            return;
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let dashboard = Dashboard::new(client, ttl, clock);

    loop {
        info!("Dashboards to process: {}", config.dashboards.len());
        for dashboard_cfg in &config.dashboards {
            process_dashboard(&dashboard, dashboard_cfg).await;
        }

        info!(
            "Waiting {}s before refreshing (Ctrl-C to exit)...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                return;
            }
        }
    }
}

async fn process_dashboard(dashboard: &Dashboard, cfg: &DashboardConfig) {
    info!("Processing dashboard: {}", cfg.name);
    let report = dashboard.build_report(cfg).await;
    log_report(&report);
    info!("Finished dashboard: {}", cfg.name);
}

fn log_report(report: &DashboardReport) {
    info!("===== {} =====", report.name);
    log_trend(&report.trend);

    match &report.shop {
        Some(Ok(shop)) => log_shop(shop),
        Some(Err(e)) => warn!("Shop lookup failed: {}", e),
        None => info!("Shop lookup skipped: no query"),
    }

    match &report.blog {
        Some(Ok(blog)) => log_blog(blog),
        Some(Err(e)) => warn!("Blog lookup failed: {}", e),
        None => info!("Blog lookup skipped: no query"),
    }
}

fn log_trend(trend: &TrendReport) {
    let outcome = &trend.outcome;
    if outcome.all_failed() {
        warn!("All {} trend request(s) failed", outcome.groups.len());
        return;
    }
    if outcome.is_partial() {
        warn!(
            "Partial trend data: {} of {} group(s) failed",
            outcome.failures.len(),
            outcome.groups.len()
        );
    }
    if let Some(note) = &outcome.table.note {
        info!("Trend: {}", note);
        return;
    }

    info!("Trend rows: {}", outcome.table.len());
    for (keyword, stats) in &trend.summary {
        info!(
            "  {:<16} mean {:>6.1} | max {:>6.1} | min {:>6.1} | std {}",
            keyword,
            stats.mean,
            stats.max,
            stats.min,
            stats.std.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"))
        );
    }
    let ranking: Vec<String> = trend
        .ranked_means
        .iter()
        .map(|(k, m)| format!("{k} ({m:.1})"))
        .collect();
    info!("Average share ranking: {}", ranking.join(" > "));

    if let Some(corr) = &trend.correlation {
        info!("Correlation ({} keywords):", corr.labels.len());
        for (label, row) in corr.labels.iter().zip(&corr.values) {
            let cells: Vec<String> = row
                .iter()
                .map(|v| v.map_or_else(|| "  n/a".to_string(), |v| format!("{v:>5.2}")))
                .collect();
            info!("  {:<16} {}", label, cells.join(" "));
        }
    }
}

fn log_shop(shop: &ShopReport) {
    info!("Shop '{}': {} item(s)", shop.query, shop.items.len());
    if let Some(note) = &shop.items.note {
        info!("Shop: {}", note);
        return;
    }
    if let Some(price) = &shop.price {
        info!(
            "Price avg {:.0} | max {:.0} | min {:.0} | active sellers {}",
            price.mean, price.max, price.min, shop.active_sellers
        );
    }
    for (seller, count) in &shop.top_sellers {
        info!("  seller {:<24} {}", seller, count);
    }
    for (category, stats) in &shop.by_category {
        info!(
            "  category {:<20} count {} | avg {:.0} | max {:.0}",
            category, stats.count, stats.mean, stats.max
        );
    }
    for item in shop.items.rows.iter().take(LISTING_ROWS) {
        let price = item.price.map_or_else(|| "-".to_string(), |p| format!("{p:.0}"));
        info!("  {} | {} | {} | {}", item.title, price, item.seller_name, item.link);
    }
}

fn log_blog(blog: &BlogReport) {
    info!("Blog '{}': {} post(s)", blog.query, blog.posts.len());
    if let Some(note) = &blog.posts.note {
        info!("Blog: {}", note);
        return;
    }
    for (date, count) in &blog.daily_posts {
        info!("  {} {}", date, count);
    }
    for (blogger, count) in &blog.top_bloggers {
        info!("  blogger {:<24} {}", blogger, count);
    }
    for post in blog.posts.rows.iter().take(LISTING_ROWS) {
        info!("  {} | {}", post.title, post.link);
    }
}
