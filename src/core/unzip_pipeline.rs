use crate::core::{join_path, ConfigProvider, Pipeline, StepReport, Storage};
use crate::domain::model::StationCode;
use crate::utils::error::{EtlError, Result};
use crate::utils::notice::Notices;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// 找到的測站壓縮檔，內容已讀進記憶體
pub struct LocatedArchive {
    pub station: StationCode,
    pub path: String,
    pub data: Vec<u8>,
}

pub struct ArchiveBatch {
    pub archives: Vec<LocatedArchive>,
    pub missing: Vec<String>,
    pub notices: Notices,
}

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// 相對於測站資料夾的路徑
    pub relative_path: String,
    pub is_dir: bool,
    pub data: Vec<u8>,
}

pub struct UnpackedArchive {
    pub station: StationCode,
    pub archive_path: String,
    pub entries: Vec<ArchiveEntry>,
}

pub struct UnzipPlan {
    pub unpacked: Vec<UnpackedArchive>,
    pub missing: Vec<String>,
    pub notices: Notices,
}

pub struct UnzipPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> UnzipPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

/// 檔頭宣告的大小不可信，預先配置最多 64 MiB
const MAX_CAPACITY_HINT: u64 = 64 * 1024 * 1024;

pub(crate) fn capacity_hint(declared_size: u64) -> usize {
    declared_size.min(MAX_CAPACITY_HINT) as usize
}

/// 讀出壓縮檔內所有項目；跳出目標資料夾的路徑一律拒絕
pub fn read_entries(archive_path: &str, data: Vec<u8>) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let relative = file
            .enclosed_name()
            .ok_or_else(|| EtlError::UnsafeArchiveEntry {
                archive: archive_path.to_string(),
                entry: file.name().to_string(),
            })?;
        let relative_path = relative.to_string_lossy().into_owned();

        if file.is_dir() {
            entries.push(ArchiveEntry {
                relative_path,
                is_dir: true,
                data: Vec::new(),
            });
            continue;
        }

        let mut data = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut data)?;
        entries.push(ArchiveEntry {
            relative_path,
            is_dir: false,
            data,
        });
    }

    Ok(entries)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for UnzipPipeline<S, C> {
    type Extracted = ArchiveBatch;
    type Transformed = UnzipPlan;

    fn name(&self) -> &'static str {
        "unzip"
    }

    async fn extract(&self) -> Result<ArchiveBatch> {
        let settings = self.config.unzip();
        self.storage.create_dir_all(self.config.data_dir()).await?;

        let mut archives = Vec::new();
        let mut missing = Vec::new();
        let mut notices = Notices::new();

        for &station in &settings.stations {
            let path = join_path(self.config.archive_dir(), &settings.archive_name(station));

            if !self.storage.exists(&path).await {
                notices.warn(format!("🚫 File not found: {}", path));
                missing.push(path);
                continue;
            }

            let data = self.storage.read_file(&path).await?;
            tracing::debug!("Read {} ({} bytes)", path, data.len());
            archives.push(LocatedArchive {
                station,
                path,
                data,
            });
        }

        tracing::info!(
            "📦 Found {} of {} station archives",
            archives.len(),
            settings.stations.len()
        );
        Ok(ArchiveBatch {
            archives,
            missing,
            notices,
        })
    }

    async fn transform(&self, batch: ArchiveBatch) -> Result<UnzipPlan> {
        let mut unpacked = Vec::with_capacity(batch.archives.len());

        for archive in batch.archives {
            let entries = read_entries(&archive.path, archive.data)?;
            tracing::debug!("{}: {} entries", archive.path, entries.len());
            unpacked.push(UnpackedArchive {
                station: archive.station,
                archive_path: archive.path,
                entries,
            });
        }

        Ok(UnzipPlan {
            unpacked,
            missing: batch.missing,
            notices: batch.notices,
        })
    }

    async fn load(&self, plan: UnzipPlan) -> Result<StepReport> {
        let mut report = StepReport::new(self.name(), self.config.data_dir());
        let mut notices = plan.notices;

        for archive in &plan.unpacked {
            let target = join_path(self.config.data_dir(), &archive.station.to_string());
            self.storage.create_dir_all(&target).await?;

            for entry in &archive.entries {
                let path = join_path(&target, &entry.relative_path);
                if entry.is_dir {
                    self.storage.create_dir_all(&path).await?;
                } else {
                    self.storage.write_file(&path, &entry.data).await?;
                    report.rows_written += 1;
                }
            }

            report.items_processed += 1;
            notices.info(format!("✅ Extracted: {} → {}", archive.archive_path, target));
        }

        report.skipped = plan.missing;
        report.notices = notices.into_vec();
        tracing::info!(
            "📁 Unzip complete: {} archives, {} files, {} missing",
            report.items_processed,
            report.rows_written,
            report.skipped.len()
        );
        Ok(report)
    }
}
