use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input file not found: {path}")]
    MissingInput { path: String },

    #[error("No input available: {message}")]
    NoInput { message: String },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Archive entry '{entry}' in {archive} escapes the output folder")]
    UnsafeArchiveEntry { archive: String, entry: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Archive,
    Data,
    Io,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ZipError(_) | EtlError::UnsafeArchiveEntry { .. } => ErrorCategory::Archive,
            EtlError::CsvError(_)
            | EtlError::SerializationError(_)
            | EtlError::MissingColumn { .. }
            | EtlError::ProcessingError { .. } => ErrorCategory::Data,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::MissingInput { .. } | EtlError::NoInput { .. } => ErrorCategory::Input,
        }
    }

    /// 缺少輸入檔只是提示，不算失敗
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::MissingInput { .. } | EtlError::NoInput { .. } => ErrorSeverity::Low,
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                ErrorSeverity::Medium
            }
            EtlError::IoError(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ErrorSeverity::Critical
            }
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn is_skippable(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::ZipError(_) => {
                "Re-download the archive; it may be truncated or not a ZIP file".to_string()
            }
            EtlError::CsvError(_) => {
                "Check that the CSV is UTF-8 and every row has the same number of columns"
                    .to_string()
            }
            EtlError::IoError(_) => {
                "Check that the paths exist and that you have read/write permission".to_string()
            }
            EtlError::SerializationError(_) => "Check the report output path".to_string(),
            EtlError::ConfigValidationError { field, .. }
            | EtlError::InvalidConfigValueError { field, .. }
            | EtlError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the config file or CLI flags", field)
            }
            EtlError::MissingInput { path } => {
                format!("Place the file at {} or point the config at it", path)
            }
            EtlError::NoInput { .. } => {
                "Check the data directory and the file name pattern".to_string()
            }
            EtlError::MissingColumn { column, .. } => {
                format!("Set district.station_column to the header that holds '{}'", column)
            }
            EtlError::UnsafeArchiveEntry { archive, .. } => {
                format!("Inspect {} manually; it contains unsafe paths", archive)
            }
            EtlError::ProcessingError { .. } => "Run again with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ZipError(e) => format!("壓縮檔無法讀取: {}", e),
            EtlError::CsvError(e) => format!("CSV 格式錯誤: {}", e),
            EtlError::IoError(e) => format!("檔案存取失敗: {}", e),
            EtlError::MissingInput { path } => format!("🚫 檔案不存在: {}", path),
            EtlError::NoInput { message } => format!("🚨 {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
