use clap::Parser;
use weather_prep::utils::error::ErrorSeverity;
use weather_prep::utils::{logger, validation::Validate};
use weather_prep::{
    CliConfig, Command, DistrictPipeline, EtlEngine, EtlError, LocalStorage, MergePipeline,
    StepReport, StepSequence, TomlConfig, UnzipPipeline,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_format);

    tracing::info!("Starting weather-prep");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    match execute(&cli.command, config, monitor_enabled).await {
        Ok(reports) => {
            for report in &reports {
                println!(
                    "✅ {}: {} written, {} skipped → {}",
                    report.step,
                    report.rows_written,
                    report.skipped.len(),
                    report.output_path
                );
            }
            if let Some(path) = &cli.report {
                if let Err(e) = write_report(path, &reports) {
                    exit_with(&e);
                }
                println!("📁 Report saved to: {}", path);
            }
        }
        Err(e) => exit_with(&e),
    }
}

async fn execute(
    command: &Command,
    config: TomlConfig,
    monitor_enabled: bool,
) -> weather_prep::Result<Vec<StepReport>> {
    let storage = LocalStorage::default();

    let report = match command {
        Command::Unzip { .. } => {
            EtlEngine::new_with_monitoring(UnzipPipeline::new(storage, config), monitor_enabled)
                .run()
                .await?
        }
        Command::Merge { .. } => {
            EtlEngine::new_with_monitoring(MergePipeline::new(storage, config), monitor_enabled)
                .run()
                .await?
        }
        Command::MapDistrict { .. } => {
            EtlEngine::new_with_monitoring(DistrictPipeline::new(storage, config), monitor_enabled)
                .run()
                .await?
        }
        Command::Run => {
            return StepSequence::new(storage, config)
                .with_monitoring(monitor_enabled)
                .run()
                .await;
        }
    };

    Ok(vec![report])
}

fn write_report(path: &str, reports: &[StepReport]) -> weather_prep::Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    if e.severity() > ErrorSeverity::Low {
        tracing::error!(
            "❌ weather-prep failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    }

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,      // 缺檔提示
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 配置或權限
    };
    std::process::exit(exit_code);
}
