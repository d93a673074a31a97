use crate::config::types::Settings;
use std::path::Path;

/// 依副檔名判斷的媒體類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    Unknown,
}

impl MediaKind {
    /// Exact match of the dotted extension (`.JPG`) against the configured sets.
    #[must_use]
    pub fn classify(path: &Path, settings: &Settings) -> Self {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return Self::Unknown;
        };
        let dotted = format!(".{ext}");

        if settings.image_formats.contains(&dotted) {
            Self::Photo
        } else if settings.video_formats.contains(&dotted) {
            Self::Video
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub const fn is_media(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}
