use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 檔名樣板必須包含佔位符，例如 `{station}` 或 `{year}`
pub fn validate_pattern(field_name: &str, pattern: &str, placeholder: &str) -> Result<()> {
    validate_path(field_name, pattern)?;
    if !pattern.contains(placeholder) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: pattern.to_string(),
            reason: format!("Pattern must contain the {} placeholder", placeholder),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "List cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_no_duplicates<T>(field_name: &str, values: &[T]) -> Result<()>
where
    T: std::hash::Hash + Eq + std::fmt::Display,
{
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension.to_ascii_lowercase().as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("merge.input_pattern", "weather {year}.csv", "{year}").is_ok());
        assert!(validate_pattern("merge.input_pattern", "weather.csv", "{year}").is_err());
        assert!(validate_pattern("merge.input_pattern", "", "{year}").is_err());
    }

    #[test]
    fn test_validate_no_duplicates() {
        assert!(validate_no_duplicates("unzip.stations", &[400, 401, 402]).is_ok());
        assert!(validate_no_duplicates("unzip.stations", &[400, 401, 400]).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["stations.csv".to_string(), "LOOKUP.CSV".to_string()];
        assert!(validate_file_extensions("district.mapping_files", &files, &["csv"]).is_ok());

        let invalid_files = vec!["stations.xlsx".to_string()];
        assert!(validate_file_extensions("district.mapping_files", &invalid_files, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("merge.years", 2018, 1900, 2100).is_ok());
        assert!(validate_range("merge.years", 18, 1900, 2100).is_err());
    }

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty_string("district.station_column", "지점").is_ok());
        assert!(validate_non_empty_string("district.station_column", "  ").is_err());
        assert!(validate_non_empty_list::<u32>("unzip.stations", &[]).is_err());
    }
}
