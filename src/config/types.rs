use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

pub const DEFAULT_IMAGE_FORMATS: [&str; 6] = [".jpg", ".JPG", ".jpeg", ".JPEG", ".png", ".PNG"];
pub const DEFAULT_VIDEO_FORMATS: [&str; 4] = [".mov", ".MOV", ".mp4", ".MP4"];

/// 傳輸完成後對來源檔案的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "copy" => Some(Self::Copy),
            "move" => Some(Self::Move),
            _ => None,
        }
    }
}

/// 單次執行的設定，建立後不再變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub camera_folder: PathBuf,
    pub main_photos_folder: PathBuf,
    pub main_videos_folder: PathBuf,
    pub sqlite_database: Option<PathBuf>,
    pub dry_run: bool,
    pub camera_model_short_names: HashMap<String, String>,
    pub image_formats: HashSet<String>,
    pub video_formats: HashSet<String>,
    pub recursive: bool,
    pub transfer_mode: TransferMode,
}

impl Settings {
    /// Settings with the default extension sets, no hash database and copy mode.
    #[must_use]
    pub fn new(
        camera_folder: impl Into<PathBuf>,
        main_photos_folder: impl Into<PathBuf>,
        main_videos_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            camera_folder: camera_folder.into(),
            main_photos_folder: main_photos_folder.into(),
            main_videos_folder: main_videos_folder.into(),
            sqlite_database: None,
            dry_run: false,
            camera_model_short_names: HashMap::new(),
            image_formats: default_image_formats(),
            video_formats: default_video_formats(),
            recursive: true,
            transfer_mode: TransferMode::Copy,
        }
    }

    /// 取得相機型號的縮寫，未設定時回傳 `None`
    #[must_use]
    pub fn short_model_name(&self, model: &str) -> Option<&str> {
        self.camera_model_short_names
            .get(model.trim())
            .map(String::as_str)
    }
}

#[must_use]
pub fn default_image_formats() -> HashSet<String> {
    DEFAULT_IMAGE_FORMATS.iter().map(ToString::to_string).collect()
}

#[must_use]
pub fn default_video_formats() -> HashSet<String> {
    DEFAULT_VIDEO_FORMATS.iter().map(ToString::to_string).collect()
}
