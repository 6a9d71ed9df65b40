use crate::core::district_pipeline::DistrictPipeline;
use crate::core::etl::EtlEngine;
use crate::core::merge_pipeline::MergePipeline;
use crate::core::unzip_pipeline::UnzipPipeline;
use crate::core::{ConfigProvider, Pipeline, StepReport, Storage};
use crate::utils::error::Result;

/// 依序執行 unzip → merge → map-district
pub struct StepSequence<S, C>
where
    S: Storage + Clone,
    C: ConfigProvider + Clone,
{
    storage: S,
    config: C,
    monitor_enabled: bool,
}

impl<S, C> StepSequence<S, C>
where
    S: Storage + Clone,
    C: ConfigProvider + Clone,
{
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            monitor_enabled: false,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        self
    }

    /// 低嚴重度錯誤（缺檔）只記錄並繼續，其餘錯誤中止整個序列
    pub async fn run(&self) -> Result<Vec<StepReport>> {
        let mut reports = Vec::new();

        let unzip = UnzipPipeline::new(self.storage.clone(), self.config.clone());
        if let Some(report) = self.run_step(unzip).await? {
            reports.push(report);
        }

        let merge = MergePipeline::new(self.storage.clone(), self.config.clone());
        if let Some(report) = self.run_step(merge).await? {
            reports.push(report);
        }

        let district = DistrictPipeline::new(self.storage.clone(), self.config.clone());
        if let Some(report) = self.run_step(district).await? {
            reports.push(report);
        }

        tracing::info!("🎉 Sequence finished: {} of 3 steps produced output", reports.len());
        Ok(reports)
    }

    async fn run_step<P: Pipeline>(&self, pipeline: P) -> Result<Option<StepReport>> {
        let name = pipeline.name();
        let engine = EtlEngine::new_with_monitoring(pipeline, self.monitor_enabled);

        match engine.run().await {
            Ok(report) => Ok(Some(report)),
            Err(e) if e.is_skippable() => {
                tracing::warn!("⏭️ Step {} skipped: {}", name, e);
                Ok(None)
            }
            Err(e) => {
                tracing::error!("❌ Step {} failed: {}", name, e);
                Err(e)
            }
        }
    }
}
