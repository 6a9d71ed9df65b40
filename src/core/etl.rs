use crate::core::Pipeline;
use crate::domain::model::StepReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<StepReport> {
        let name = self.pipeline.name();
        tracing::info!("▶️ Starting step: {}", name);

        tracing::debug!("[{}] extract", name);
        let extracted = self.pipeline.extract().await?;
        self.monitor.log_stats(&format!("{} extract", name));

        tracing::debug!("[{}] transform", name);
        let transformed = self.pipeline.transform(extracted).await?;
        self.monitor.log_stats(&format!("{} transform", name));

        tracing::debug!("[{}] load", name);
        let report = self.pipeline.load(transformed).await?;
        self.monitor.log_stats(&format!("{} load", name));
        self.monitor.log_final_stats();

        tracing::info!("🏁 Step {} finished: {}", name, report.output_path);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        calls: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Extracted = Vec<u32>;
        type Transformed = u32;

        fn name(&self) -> &'static str {
            "counting"
        }

        async fn extract(&self) -> Result<Vec<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        }

        async fn transform(&self, data: Vec<u32>) -> Result<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transform {
                return Err(EtlError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(data.iter().sum())
        }

        async fn load(&self, result: u32) -> Result<StepReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut report = StepReport::new("counting", "memory");
            report.rows_written = result as usize;
            Ok(report)
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = EtlEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: false,
        });

        let report = engine.run().await.unwrap();
        assert_eq!(report.rows_written, 6);
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_engine_stops_on_transform_error() {
        let engine = EtlEngine::new(CountingPipeline {
            calls: AtomicUsize::new(0),
            fail_transform: true,
        });

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 2);
    }
}
