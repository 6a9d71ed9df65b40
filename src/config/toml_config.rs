use crate::core::ConfigProvider;
use crate::domain::model::StationCode;
use crate::domain::stations::{DistrictMap, DEFAULT_STATIONS, DEFAULT_YEARS};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub paths: PathsConfig,
    pub unzip: UnzipSettings,
    pub merge: MergeSettings,
    pub district: DistrictSettings,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// 測站壓縮檔所在資料夾
    pub archive_dir: String,
    /// 解壓、合併與對應結果的輸出資料夾
    pub data_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            archive_dir: "./2024".to_string(),
            data_dir: "./weather".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnzipSettings {
    pub stations: Vec<StationCode>,
    pub archive_pattern: String,
}

impl Default for UnzipSettings {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS.to_vec(),
            archive_pattern: "SURFACE_AWS_{station}_DAY_2024_2024_2025.zip".to_string(),
        }
    }
}

impl UnzipSettings {
    pub fn archive_name(&self, station: StationCode) -> String {
        self.archive_pattern
            .replace("{station}", &station.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub years: Vec<i32>,
    pub input_pattern: String,
    pub output_file: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            years: DEFAULT_YEARS.to_vec(),
            input_pattern: "weather {year}.csv".to_string(),
            output_file: "weather.csv".to_string(),
        }
    }
}

impl MergeSettings {
    pub fn input_name(&self, year: i32) -> String {
        self.input_pattern.replace("{year}", &year.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistrictSettings {
    pub input_file: String,
    pub output_file: String,
    pub station_column: String,
    pub district_column: String,
    /// 有設定時取代內建對照表
    pub mapping: Option<BTreeMap<String, String>>,
    /// 額外的 `code,name` CSV，套用在對照表之上
    pub mapping_files: Vec<String>,
}

impl Default for DistrictSettings {
    fn default() -> Self {
        Self {
            input_file: "weather.csv".to_string(),
            output_file: "weather_with_sigungu.csv".to_string(),
            station_column: "지점".to_string(),
            district_column: "sigungu".to_string(),
            mapping: None,
            mapping_files: Vec::new(),
        }
    }
}

impl DistrictSettings {
    /// 不含 `mapping_files`；那些由 pipeline 透過 Storage 讀取
    pub fn base_mapping(&self) -> Result<DistrictMap> {
        match &self.mapping {
            Some(entries) => DistrictMap::from_string_keys(entries),
            None => Ok(DistrictMap::default()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WEATHER_DIR})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for TomlConfig {
    fn archive_dir(&self) -> &str {
        &self.paths.archive_dir
    }

    fn data_dir(&self) -> &str {
        &self.paths.data_dir
    }

    fn unzip(&self) -> &UnzipSettings {
        &self.unzip
    }

    fn merge(&self) -> &MergeSettings {
        &self.merge
    }

    fn district(&self) -> &DistrictSettings {
        &self.district
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("paths.archive_dir", &self.paths.archive_dir)?;
        validation::validate_path("paths.data_dir", &self.paths.data_dir)?;

        validation::validate_non_empty_list("unzip.stations", &self.unzip.stations)?;
        validation::validate_no_duplicates("unzip.stations", &self.unzip.stations)?;
        validation::validate_pattern(
            "unzip.archive_pattern",
            &self.unzip.archive_pattern,
            "{station}",
        )?;

        validation::validate_non_empty_list("merge.years", &self.merge.years)?;
        validation::validate_no_duplicates("merge.years", &self.merge.years)?;
        for year in &self.merge.years {
            validation::validate_range("merge.years", *year, 1900, 2100)?;
        }
        validation::validate_pattern("merge.input_pattern", &self.merge.input_pattern, "{year}")?;
        validation::validate_path("merge.output_file", &self.merge.output_file)?;

        validation::validate_path("district.input_file", &self.district.input_file)?;
        validation::validate_path("district.output_file", &self.district.output_file)?;
        validation::validate_non_empty_string(
            "district.station_column",
            &self.district.station_column,
        )?;
        validation::validate_non_empty_string(
            "district.district_column",
            &self.district.district_column,
        )?;
        if self.district.station_column == self.district.district_column {
            return Err(EtlError::InvalidConfigValueError {
                field: "district.district_column".to_string(),
                value: self.district.district_column.clone(),
                reason: "Must differ from district.station_column".to_string(),
            });
        }
        if self.district.input_file == self.district.output_file {
            return Err(EtlError::InvalidConfigValueError {
                field: "district.output_file".to_string(),
                value: self.district.output_file.clone(),
                reason: "Output would overwrite the input file".to_string(),
            });
        }
        validation::validate_file_extensions(
            "district.mapping_files",
            &self.district.mapping_files,
            &["csv"],
        )?;
        self.district.base_mapping()?;

        Ok(())
    }
}
