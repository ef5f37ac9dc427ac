// HTTP adapter for the trend and search API.

pub mod naver;
pub mod request;
pub mod traits;

pub use naver::NaverClient;
pub use request::{ApiRequest, Endpoint, TimeUnit, TrendQuery};
pub use traits::ApiClient;
