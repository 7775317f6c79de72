//! Bounded worker pool for hosting services.
//!
//! Generation is CPU-bound and single-threaded per call; the pool exists
//! purely as an admission-control mechanism. A fixed number of permits caps
//! concurrent generations and keeps the work off any request-dispatch
//! thread; excess calls queue on the semaphore. A call is not cancellable
//! mid-flight: wrap `generate` in a caller-side timeout if needed.

use crate::error::GenerationError;
use crate::GenerationOutput;
use log::debug;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;

/// A caller-owned handle to a bounded pool of generation workers. No global
/// state: construct one, share it by cloning.
#[derive(Clone)]
pub struct GenerationPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl GenerationPool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// One worker per available CPU.
    pub fn with_default_workers() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs one generation on a blocking worker thread once a permit is
    /// available. The whole call either completes with bytes or fails; no
    /// partial output.
    pub async fn generate(
        &self,
        template_json: String,
        data_json: String,
    ) -> Result<GenerationOutput, GenerationError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| GenerationError::Pool(e.to_string()))?;
        debug!("generation admitted ({} workers)", self.workers);
        let result = task::spawn_blocking(move || {
            let output = crate::generate(&template_json, &data_json);
            drop(permit);
            output
        })
        .await
        .map_err(|e| GenerationError::Pool(format!("generation task failed: {e}")))?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> String {
        json!({
            "page": { "size": "a4" },
            "sectionHeights": {
                "pageHeader": 40.0, "billHeader": 30.0,
                "billContent": 500.0, "pageFooter": 30.0
            },
            "billContentTables": [{
                "x": 0.0, "y": 0.0, "width": 200.0,
                "columns": [{ "label": "Item", "bind": "item", "width": 200.0 }]
            }]
        })
        .to_string()
    }

    fn data() -> String {
        json!({ "items": [{ "item": "Widget" }], "contentDetails": {} }).to_string()
    }

    #[tokio::test]
    async fn pool_of_one_serializes_concurrent_calls() {
        let pool = GenerationPool::new(1);
        let a = pool.generate(template(), data());
        let b = pool.generate(template(), data());
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.unwrap().page_count, 1);
        assert_eq!(b.unwrap().page_count, 1);
    }

    #[tokio::test]
    async fn fatal_errors_surface_through_the_pool() {
        let pool = GenerationPool::with_default_workers();
        assert!(pool.workers() >= 1);
        let err = pool
            .generate("{ not json".to_string(), data())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::TemplateValidation { .. }));
    }
}
