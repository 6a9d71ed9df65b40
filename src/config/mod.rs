pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TomlConfig;
    use crate::domain::model::StationCode;
    use crate::utils::error::Result;
    use crate::utils::logger::LogFormat;
    use clap::{Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "weather-prep")]
    #[command(about = "Prepare AWS weather station data: unzip, merge and map districts")]
    pub struct CliConfig {
        /// Path to TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, value_enum, default_value = "compact")]
        pub log_format: LogFormat,

        /// Log CPU and memory usage after each phase
        #[arg(long, global = true)]
        pub monitor: bool,

        /// Write step reports as JSON to this file
        #[arg(long, global = true)]
        pub report: Option<String>,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Extract every station archive into <output-dir>/<station>/
        Unzip {
            #[arg(long)]
            archive_dir: Option<String>,
            #[arg(long)]
            output_dir: Option<String>,
            #[arg(long, value_delimiter = ',')]
            stations: Vec<StationCode>,
        },
        /// Concatenate the yearly CSV files into one
        Merge {
            #[arg(long)]
            data_dir: Option<String>,
            #[arg(long, value_delimiter = ',')]
            years: Vec<i32>,
            #[arg(long)]
            output: Option<String>,
        },
        /// Append the district name for each station code
        MapDistrict {
            #[arg(long)]
            data_dir: Option<String>,
            #[arg(long)]
            input: Option<String>,
            #[arg(long)]
            output: Option<String>,
            #[arg(long)]
            mapping_file: Vec<String>,
        },
        /// Run unzip, merge and map-district in order
        Run,
    }

    impl CliConfig {
        /// 預設值 ← TOML 檔 ← 命令列參數
        pub fn resolve(&self) -> Result<TomlConfig> {
            let mut config = match &self.config {
                Some(path) => TomlConfig::from_file(path)?,
                None => TomlConfig::default(),
            };
            self.apply_overrides(&mut config);
            Ok(config)
        }

        pub fn apply_overrides(&self, config: &mut TomlConfig) {
            if self.monitor {
                config.monitoring.enabled = true;
            }

            match &self.command {
                Command::Unzip {
                    archive_dir,
                    output_dir,
                    stations,
                } => {
                    if let Some(dir) = archive_dir {
                        config.paths.archive_dir = dir.clone();
                    }
                    if let Some(dir) = output_dir {
                        config.paths.data_dir = dir.clone();
                    }
                    if !stations.is_empty() {
                        config.unzip.stations = stations.clone();
                    }
                }
                Command::Merge {
                    data_dir,
                    years,
                    output,
                } => {
                    if let Some(dir) = data_dir {
                        config.paths.data_dir = dir.clone();
                    }
                    if !years.is_empty() {
                        config.merge.years = years.clone();
                    }
                    if let Some(file) = output {
                        config.merge.output_file = file.clone();
                    }
                }
                Command::MapDistrict {
                    data_dir,
                    input,
                    output,
                    mapping_file,
                } => {
                    if let Some(dir) = data_dir {
                        config.paths.data_dir = dir.clone();
                    }
                    if let Some(file) = input {
                        config.district.input_file = file.clone();
                    }
                    if let Some(file) = output {
                        config.district.output_file = file.clone();
                    }
                    config
                        .district
                        .mapping_files
                        .extend(mapping_file.iter().cloned());
                }
                Command::Run => {}
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_merge_overrides() {
            let cli = CliConfig::parse_from([
                "weather-prep",
                "merge",
                "--data-dir",
                "/tmp/weather",
                "--years",
                "2023,2024",
            ]);
            let config = cli.resolve().unwrap();

            assert_eq!(config.paths.data_dir, "/tmp/weather");
            assert_eq!(config.merge.years, vec![2023, 2024]);
            assert_eq!(config.merge.output_file, "weather.csv");
        }

        #[test]
        fn test_unzip_overrides_and_global_flags() {
            let cli = CliConfig::parse_from([
                "weather-prep",
                "unzip",
                "--stations",
                "400,889",
                "--monitor",
                "--log-format",
                "json",
            ]);
            let config = cli.resolve().unwrap();

            assert_eq!(config.unzip.stations, vec![400, 889]);
            assert!(config.monitoring_enabled());
            assert_eq!(cli.log_format, LogFormat::Json);
        }

        #[test]
        fn test_run_keeps_defaults() {
            let cli = CliConfig::parse_from(["weather-prep", "run"]);
            let config = cli.resolve().unwrap();
            assert_eq!(config.district.output_file, "weather_with_sigungu.csv");
            assert!(!config.monitoring_enabled());
        }
    }
}
