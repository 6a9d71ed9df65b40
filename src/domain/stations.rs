use crate::domain::model::StationCode;
use crate::utils::csv_io::read_table;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;

/// 2024 年資料有壓縮檔的 AWS 測站（不含 422）
pub const DEFAULT_STATIONS: &[StationCode] = &[
    400, 401, 402, 403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417,
    418, 419, 421, 423, 424, 425, 509, 510, 889,
];

pub const DEFAULT_YEARS: &[i32] = &[2018, 2019, 2020, 2021, 2022, 2023, 2024, 2025];

pub const DEFAULT_DISTRICTS: &[(StationCode, &str)] = &[
    (400, "강남구"),
    (401, "서초구"),
    (402, "강동구"),
    (403, "송파구"),
    (404, "강서구"),
    (405, "양천구"),
    (406, "도봉구"),
    (407, "노원구"),
    (408, "동대문구"),
    (409, "중랑구"),
    (410, "기상청"),
    (411, "마포구"),
    (412, "서대문구"),
    (413, "광진구"),
    (414, "성북구"),
    (415, "용산구"),
    (416, "은평구"),
    (417, "금천구"),
    (418, "한강"),
    (419, "중구"),
    (421, "성동구"),
    (422, "북악산"),
    (423, "구로구"),
    (424, "강북구"),
    (425, "남현구"),
    (509, "관악구"),
    (510, "영등포구"),
    (889, "현충원"),
];

/// 測站代碼 → 區名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistrictMap {
    entries: BTreeMap<StationCode, String>,
}

impl Default for DistrictMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_DISTRICTS
                .iter()
                .map(|(code, name)| (*code, name.to_string()))
                .collect(),
        }
    }
}

impl DistrictMap {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// TOML 的 table key 只能是字串，這裡轉回數字代碼
    pub fn from_string_keys<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut map = Self::empty();
        for (key, name) in entries {
            let code = key
                .trim()
                .parse::<StationCode>()
                .map_err(|e| EtlError::InvalidConfigValueError {
                    field: "district.mapping".to_string(),
                    value: key.clone(),
                    reason: format!("Station code must be a number: {}", e),
                })?;
            map.insert(code, name.clone());
        }
        Ok(map)
    }

    /// 讀取 `code,name` 兩欄的對照表 CSV
    pub fn extend_from_csv(&mut self, data: &[u8], source: &str) -> Result<usize> {
        let table = read_table(data)?;
        if table.headers.len() < 2 {
            return Err(EtlError::ProcessingError {
                message: format!("{} needs at least two columns (code,name)", source),
            });
        }

        let mut added = 0;
        for (line, row) in table.rows.iter().enumerate() {
            let code = parse_station_code(&row[0]).ok_or_else(|| EtlError::ProcessingError {
                message: format!("{} row {}: invalid station code '{}'", source, line + 2, row[0]),
            })?;
            self.insert(code, row[1].trim().to_string());
            added += 1;
        }
        Ok(added)
    }

    pub fn insert(&mut self, code: StationCode, name: String) {
        self.entries.insert(code, name);
    }

    pub fn get(&self, code: StationCode) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup_cell(&self, cell: &str) -> Option<&str> {
        parse_station_code(cell).and_then(|code| self.get(code))
    }
}

/// 接受 `400`、` 400 `、`400.0`；其他值視為無法對應
pub fn parse_station_code(cell: &str) -> Option<StationCode> {
    let trimmed = cell.trim();
    if let Ok(code) = trimmed.parse::<StationCode>() {
        return Some(code);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.fract() == 0.0 && value >= 0.0 && value <= StationCode::MAX as f64 {
        Some(value as StationCode)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_map_has_all_districts() {
        let map = DistrictMap::default();
        assert_eq!(map.len(), 28);
        assert_eq!(map.get(400), Some("강남구"));
        assert_eq!(map.get(422), Some("북악산"));
        assert_eq!(map.get(889), Some("현충원"));
        assert_eq!(map.get(420), None);
    }

    #[test]
    fn test_default_stations_skip_422() {
        assert_eq!(DEFAULT_STATIONS.len(), 27);
        assert!(!DEFAULT_STATIONS.contains(&422));
    }

    #[test]
    fn test_parse_station_code() {
        assert_eq!(parse_station_code("400"), Some(400));
        assert_eq!(parse_station_code(" 401 "), Some(401));
        assert_eq!(parse_station_code("402.0"), Some(402));
        assert_eq!(parse_station_code("402.5"), None);
        assert_eq!(parse_station_code(""), None);
        assert_eq!(parse_station_code("-1"), None);
        assert_eq!(parse_station_code("abc"), None);
    }

    #[test]
    fn test_from_string_keys() {
        let mut raw = HashMap::new();
        raw.insert("400".to_string(), "Gangnam".to_string());
        let map = DistrictMap::from_string_keys(&raw).unwrap();
        assert_eq!(map.lookup_cell("400"), Some("Gangnam"));

        raw.insert("north".to_string(), "x".to_string());
        assert!(DistrictMap::from_string_keys(&raw).is_err());
    }

    #[test]
    fn test_extend_from_csv() {
        let mut map = DistrictMap::default();
        let added = map
            .extend_from_csv("code,name\n999,테스트구\n400,Gangnam\n".as_bytes(), "extra.csv")
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(map.get(999), Some("테스트구"));
        assert_eq!(map.get(400), Some("Gangnam"));
    }

    #[test]
    fn test_extend_from_csv_rejects_bad_code() {
        let mut map = DistrictMap::empty();
        let err = map
            .extend_from_csv(b"code,name\nabc,x\n", "extra.csv")
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
