use crate::core::{join_path, ConfigProvider, Pipeline, StepReport, Storage, Table};
use crate::utils::csv_io::{format_count, read_table, write_table};
use crate::utils::error::{EtlError, Result};
use crate::utils::notice::Notices;

pub struct YearlyTables {
    pub tables: Vec<(i32, Table)>,
    pub failed: Vec<String>,
    pub notices: Notices,
}

pub struct MergedTable {
    pub table: Table,
    pub failed: Vec<String>,
    pub years_merged: usize,
    pub notices: Notices,
}

pub struct MergePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MergePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_year(&self, path: &str) -> Result<Table> {
        let data = self.storage.read_file(path).await?;
        read_table(&data)
    }
}

/// 依序串接；欄位取聯集（依首次出現順序），缺少的欄位補空字串
pub fn concat_tables<'a, I>(tables: I) -> Table
where
    I: IntoIterator<Item = &'a Table>,
{
    let tables: Vec<&Table> = tables.into_iter().collect();

    let mut headers: Vec<String> = Vec::new();
    for table in &tables {
        for header in &table.headers {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
    }

    let mut merged = Table::new(headers);
    merged.rows.reserve(tables.iter().map(|t| t.len()).sum());

    for table in tables {
        let positions: Vec<Option<usize>> = merged
            .headers
            .iter()
            .map(|h| table.column_index(h))
            .collect();

        for row in &table.rows {
            merged.rows.push(
                positions
                    .iter()
                    .map(|pos| {
                        pos.and_then(|i| row.get(i))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect(),
            );
        }
    }

    merged
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MergePipeline<S, C> {
    type Extracted = YearlyTables;
    type Transformed = MergedTable;

    fn name(&self) -> &'static str {
        "merge"
    }

    async fn extract(&self) -> Result<YearlyTables> {
        let settings = self.config.merge();
        let mut tables = Vec::new();
        let mut failed = Vec::new();
        let mut notices = Notices::new();

        for &year in &settings.years {
            let path = join_path(self.config.data_dir(), &settings.input_name(year));

            // 任何讀取錯誤都只跳過該年份
            match self.read_year(&path).await {
                Ok(table) => {
                    notices.info(format!(
                        "✅ {}: loaded {} rows",
                        year,
                        format_count(table.len())
                    ));
                    tables.push((year, table));
                }
                Err(e) => {
                    notices.warn(format!("❌ {}: failed to read {}: {}", year, path, e));
                    failed.push(path);
                }
            }
        }

        Ok(YearlyTables {
            tables,
            failed,
            notices,
        })
    }

    async fn transform(&self, data: YearlyTables) -> Result<MergedTable> {
        if data.tables.is_empty() {
            Notices::new().warn(format!(
                "🚨 Nothing to merge; check the file paths and names under {}",
                self.config.data_dir()
            ));
            return Err(EtlError::NoInput {
                message: format!(
                    "no yearly files could be read from {}",
                    self.config.data_dir()
                ),
            });
        }

        let years_merged = data.tables.len();
        let table = concat_tables(data.tables.iter().map(|(_, t)| t));

        Ok(MergedTable {
            table,
            failed: data.failed,
            years_merged,
            notices: data.notices,
        })
    }

    async fn load(&self, result: MergedTable) -> Result<StepReport> {
        let output_path = join_path(self.config.data_dir(), &self.config.merge().output_file);
        let bytes = write_table(&result.table)?;
        self.storage.write_file(&output_path, &bytes).await?;

        let mut notices = result.notices;
        notices.info(format!(
            "✅ Merge complete: {} rows → {}",
            format_count(result.table.len()),
            output_path
        ));

        let mut report = StepReport::new(self.name(), output_path);
        report.items_processed = result.years_merged;
        report.rows_written = result.table.len();
        report.skipped = result.failed;
        report.notices = notices.into_vec();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::core::mock_storage::MockStorage;
    use crate::utils::csv_io::UTF8_BOM;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn test_config(years: Vec<i32>) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.paths.data_dir = "weather".to_string();
        config.merge.years = years;
        config
    }

    #[test]
    fn test_concat_keeps_order_and_counts() {
        let a = table(&["지점", "일시"], &[&["400", "2018-01-01"], &["401", "2018-01-01"]]);
        let b = table(&["지점", "일시"], &[&["400", "2019-01-01"]]);

        let merged = concat_tables([&a, &b]);
        assert_eq!(merged.headers, vec!["지점", "일시"]);
        assert_eq!(merged.len(), a.len() + b.len());
        assert_eq!(merged.rows[2], vec!["400", "2019-01-01"]);
    }

    #[test]
    fn test_concat_unions_columns() {
        let a = table(&["지점", "일시", "강수량"], &[&["400", "2018-01-01", "0.5"]]);
        let b = table(&["일시", "지점", "풍속"], &[&["2019-01-01", "401", "3.2"]]);

        let merged = concat_tables([&a, &b]);
        assert_eq!(merged.headers, vec!["지점", "일시", "강수량", "풍속"]);
        assert_eq!(merged.rows[0], vec!["400", "2018-01-01", "0.5", ""]);
        assert_eq!(merged.rows[1], vec!["401", "2019-01-01", "", "3.2"]);
    }

    #[tokio::test]
    async fn test_merge_skips_missing_years() {
        let storage = MockStorage::new();
        storage
            .put_file("weather/weather 2018.csv", "지점,일시\n400,2018-01-01\n400,2018-01-02\n".as_bytes())
            .await;
        let mut with_bom = UTF8_BOM.to_vec();
        with_bom.extend_from_slice("지점,일시\n401,2020-01-01\n".as_bytes());
        storage.put_file("weather/weather 2020.csv", &with_bom).await;

        let pipeline = MergePipeline::new(storage.clone(), test_config(vec![2018, 2019, 2020]));
        let yearly = pipeline.extract().await.unwrap();
        assert_eq!(yearly.tables.len(), 2);
        assert_eq!(yearly.failed, vec!["weather/weather 2019.csv"]);
        assert_eq!(yearly.notices.messages().len(), 3);
        assert!(yearly.notices.messages()[1].starts_with("❌ 2019: failed to read weather/weather 2019.csv"));

        let merged = pipeline.transform(yearly).await.unwrap();
        let report = pipeline.load(merged).await.unwrap();

        assert_eq!(report.rows_written, 3);
        assert_eq!(report.items_processed, 2);
        assert_eq!(report.output_path, "weather/weather.csv");
        assert_eq!(report.notices[0], "✅ 2018: loaded 2 rows");
        assert_eq!(report.notices[3], "✅ Merge complete: 3 rows → weather/weather.csv");

        let written = storage.get_file("weather/weather.csv").await.unwrap();
        assert!(written.starts_with(UTF8_BOM));
        let parsed = read_table(&written).unwrap();
        assert_eq!(parsed.headers, vec!["지점", "일시"]);
        assert_eq!(parsed.column("지점").unwrap(), vec!["400", "400", "401"]);
    }

    #[tokio::test]
    async fn test_malformed_year_is_skipped() {
        let storage = MockStorage::new();
        storage.put_file("weather/weather 2018.csv", b"a,b\n1,2,3\n").await;
        storage.put_file("weather/weather 2019.csv", b"a,b\n1,2\n").await;

        let pipeline = MergePipeline::new(storage, test_config(vec![2018, 2019]));
        let yearly = pipeline.extract().await.unwrap();

        assert_eq!(yearly.tables.len(), 1);
        assert_eq!(yearly.tables[0].0, 2019);
    }

    #[tokio::test]
    async fn test_nothing_to_merge_is_low_severity() {
        let storage = MockStorage::new();
        let pipeline = MergePipeline::new(storage.clone(), test_config(vec![2018]));

        let yearly = pipeline.extract().await.unwrap();
        let err = pipeline.transform(yearly).await.err().unwrap();

        assert!(matches!(err, EtlError::NoInput { .. }));
        assert!(err.is_skippable());
        assert!(storage.get_file("weather/weather.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_header_survives_merge() {
        let storage = MockStorage::new();
        storage
            .put_file("weather/weather 2018.csv", "지점,기온,기온\n400,1.0,9.9\n".as_bytes())
            .await;
        storage
            .put_file("weather/weather 2019.csv", "지점,기온\n401,2.0\n".as_bytes())
            .await;

        let pipeline = MergePipeline::new(storage.clone(), test_config(vec![2018, 2019]));
        let yearly = pipeline.extract().await.unwrap();
        let merged = pipeline.transform(yearly).await.unwrap();
        pipeline.load(merged).await.unwrap();

        let written = storage.get_file("weather/weather.csv").await.unwrap();
        let parsed = read_table(&written).unwrap();
        assert_eq!(parsed.headers, vec!["지점", "기온", "기온.1"]);
        assert_eq!(parsed.column("기온").unwrap(), vec!["1.0", "2.0"]);
        assert_eq!(parsed.column("기온.1").unwrap(), vec!["9.9", ""]);
    }

    #[tokio::test]
    async fn test_empty_year_file_is_skipped() {
        let storage = MockStorage::new();
        storage.put_file("weather/weather 2018.csv", b"").await;

        let pipeline = MergePipeline::new(storage.clone(), test_config(vec![2018]));
        let yearly = pipeline.extract().await.unwrap();
        assert!(yearly.tables.is_empty());
        assert_eq!(yearly.failed, vec!["weather/weather 2018.csv"]);

        let err = pipeline.transform(yearly).await.err().unwrap();
        assert!(matches!(err, EtlError::NoInput { .. }));
        assert!(storage.get_file("weather/weather.csv").await.is_none());
    }
}
