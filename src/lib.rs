pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use crate::core::{
    district_pipeline::DistrictPipeline, etl::EtlEngine, merge_pipeline::MergePipeline,
    sequence::StepSequence, unzip_pipeline::UnzipPipeline,
};
pub use domain::model::{StepReport, Table};
pub use utils::error::{EtlError, Result};
