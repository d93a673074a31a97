use anyhow::{Context, Result};
use camera_transfer::component::CameraTransfer;
use camera_transfer::config::Settings;
use camera_transfer::init;
use console::style;
use log::{debug, error, info};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_ENV_FILE: &str = ".env";

fn main() -> Result<ExitCode> {
    init::init();

    let env_file = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_ENV_FILE), PathBuf::from);

    let settings = Settings::load_from_dotenv(&env_file)?;
    info!("已載入設定: {}", env_file.display());
    debug!("Settings: {}", serde_json::to_string(&settings)?);

    let mut transfer = CameraTransfer::from_settings(settings).context("無法開始傳輸")?;
    match transfer.run() {
        Ok(result) => {
            CameraTransfer::print_summary(&result);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("傳輸中止: {e}");
            eprintln!("{} {}", style("錯誤:").red().bold(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
