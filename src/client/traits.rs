use crate::client::request::ApiRequest;
use crate::model::FetchError;

/// Transport seam: performs one request and returns the raw body of a 200 response.
///
/// Implementations must not retry.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<String, FetchError>;
}
