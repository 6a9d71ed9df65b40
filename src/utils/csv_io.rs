use crate::domain::model::Table;
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;

/// 氣象廳匯出的 CSV 帶有 UTF-8 BOM，輸出時保留
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// 重複的欄名依序改為 `name.1`、`name.2`，與 pandas 讀檔時相同
pub fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut deduped = Vec::with_capacity(headers.len());

    for original in headers {
        let mut name = original;
        let mut count = counts.get(&name).copied().unwrap_or(0);
        while count > 0 {
            counts.insert(name.clone(), count + 1);
            name = format!("{}.{}", name, count);
            count = counts.get(&name).copied().unwrap_or(0);
        }
        counts.insert(name.clone(), count + 1);
        deduped.push(name);
    }

    deduped
}

/// 沒有任何欄名的檔案（空檔或只有 BOM）視為讀取失敗
pub fn read_table(data: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(strip_bom(data));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(EtlError::ProcessingError {
            message: "no columns to parse from file".to_string(),
        });
    }
    let mut table = Table::new(dedupe_headers(headers));

    for record in reader.records() {
        let record = record?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(table)
}

pub fn write_table(table: &Table) -> Result<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = WriterBuilder::new().from_writer(&mut buffer);
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            if row.len() != table.headers.len() {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "row has {} cells but the header has {}",
                        row.len(),
                        table.headers.len()
                    ),
                });
            }
            writer.write_record(row)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// 千分位格式，例如 `1,234,567`
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
