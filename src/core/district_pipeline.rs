use crate::core::{join_path, ConfigProvider, Pipeline, StepReport, Storage, Table};
use crate::domain::stations::DistrictMap;
use crate::utils::csv_io::{format_count, read_table, write_table};
use crate::utils::error::{EtlError, Result};
use crate::utils::notice::Notices;
use std::collections::BTreeSet;

pub struct DistrictInput {
    pub source_path: String,
    pub table: Table,
    pub mapping: DistrictMap,
}

pub struct MappedTable {
    pub table: Table,
    pub mapped: usize,
    pub unmapped: usize,
}

pub struct DistrictPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DistrictPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn load_mapping(&self) -> Result<DistrictMap> {
        let settings = self.config.district();
        let mut mapping = settings.base_mapping()?;

        for file in &settings.mapping_files {
            let data = self.storage.read_file(file).await?;
            let added = mapping.extend_from_csv(&data, file)?;
            tracing::info!("📖 Loaded {} station mappings from {}", added, file);
        }

        Ok(mapping)
    }
}

/// 把區名寫進 `district_column`；欄位已存在時就地覆寫，否則附加在最後
pub fn apply_districts(
    mut table: Table,
    mapping: &DistrictMap,
    station_column: &str,
    district_column: &str,
    source_path: &str,
) -> Result<MappedTable> {
    let station_index =
        table
            .column_index(station_column)
            .ok_or_else(|| EtlError::MissingColumn {
                column: station_column.to_string(),
                path: source_path.to_string(),
            })?;

    let district_index = match table.column_index(district_column) {
        Some(index) => index,
        None => {
            table.headers.push(district_column.to_string());
            table.headers.len() - 1
        }
    };

    let mut mapped = 0;
    let mut unknown = BTreeSet::new();

    for row in &mut table.rows {
        let station = row.get(station_index).map(String::as_str).unwrap_or("");
        let district = match mapping.lookup_cell(station) {
            Some(name) => {
                mapped += 1;
                name.to_string()
            }
            None => {
                unknown.insert(station.to_string());
                String::new()
            }
        };

        if district_index < row.len() {
            row[district_index] = district;
        } else {
            row.push(district);
        }
    }

    let unmapped = table.len() - mapped;
    if !unknown.is_empty() {
        tracing::warn!(
            "⚠️ {} rows have no district; unknown station codes: {:?}",
            format_count(unmapped),
            unknown
        );
    }

    Ok(MappedTable {
        table,
        mapped,
        unmapped,
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DistrictPipeline<S, C> {
    type Extracted = DistrictInput;
    type Transformed = MappedTable;

    fn name(&self) -> &'static str {
        "map-district"
    }

    async fn extract(&self) -> Result<DistrictInput> {
        let source_path = join_path(self.config.data_dir(), &self.config.district().input_file);

        if !self.storage.exists(&source_path).await {
            Notices::new().warn(format!("🚫 File not found: {}", source_path));
            return Err(EtlError::MissingInput { path: source_path });
        }

        let data = self.storage.read_file(&source_path).await?;
        let table = read_table(&data)?;
        tracing::info!("📊 Read {} rows from {}", format_count(table.len()), source_path);

        let mapping = self.load_mapping().await?;
        tracing::debug!("Using {} station → district mappings", mapping.len());

        Ok(DistrictInput {
            source_path,
            table,
            mapping,
        })
    }

    async fn transform(&self, input: DistrictInput) -> Result<MappedTable> {
        let settings = self.config.district();
        apply_districts(
            input.table,
            &input.mapping,
            &settings.station_column,
            &settings.district_column,
            &input.source_path,
        )
    }

    async fn load(&self, result: MappedTable) -> Result<StepReport> {
        let output_path = join_path(self.config.data_dir(), &self.config.district().output_file);
        let bytes = write_table(&result.table)?;
        self.storage.write_file(&output_path, &bytes).await?;

        tracing::info!(
            "✅ District mapping complete: {} rows ({} mapped) → {}",
            format_count(result.table.len()),
            format_count(result.mapped),
            output_path
        );

        let mut report = StepReport::new(self.name(), output_path);
        report.items_processed = result.mapped;
        report.rows_written = result.table.len();
        if result.unmapped > 0 {
            report
                .skipped
                .push(format!("{} rows without a known station code", result.unmapped));
        }
        Ok(report)
    }
}
