use crate::domain::model::{Estimate, EstimateRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Produces an alternative effort/cost figure for a set of selected packages.
#[async_trait]
pub trait Estimator: Send + Sync {
    fn name(&self) -> &str;
    async fn estimate(&self, request: &EstimateRequest) -> Result<Estimate>;
}
