use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type StationCode = u32;

/// 一份 CSV 的內容；所有欄位一律以字串保存
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// 一個步驟的執行摘要，可輸出為 JSON 報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub output_path: String,
    pub items_processed: usize,
    pub rows_written: usize,
    pub skipped: Vec<String>,
    /// 執行期間印出的提示
    pub notices: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

impl StepReport {
    pub fn new(step: &str, output_path: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            output_path: output_path.into(),
            items_processed: 0,
            rows_written: 0,
            skipped: Vec::new(),
            notices: Vec::new(),
            finished_at: Utc::now(),
        }
    }
}
