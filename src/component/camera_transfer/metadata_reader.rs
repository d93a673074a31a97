use crate::config::MediaKind;
use crate::error::TransferError;
use crate::tools::{SourceFile, get_video_tags};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid regex"));

/// EXIF 中可能記錄拍攝時間的欄位，依優先順序排列
const DATETIME_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Embedded,
    Filesystem,
}

/// 拍攝資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureMetadata {
    pub timestamp: NaiveDateTime,
    pub model: Option<String>,
    pub counter: Option<String>,
    pub source: MetadataSource,
}

/// 檔案內嵌的拍攝資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedMetadata {
    pub timestamp: NaiveDateTime,
    pub model: Option<String>,
}

pub trait EmbeddedMetadataReader {
    fn read(&self, path: &Path) -> Result<EmbeddedMetadata, TransferError>;
}

/// Reads `DateTimeOriginal` (or the next best datetime tag) and `Model` from EXIF.
#[derive(Debug, Default)]
pub struct ExifMetadataReader;

impl EmbeddedMetadataReader for ExifMetadataReader {
    fn read(&self, path: &Path) -> Result<EmbeddedMetadata, TransferError> {
        let unreadable = |reason: String| TransferError::MetadataUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| unreadable(e.to_string()))?;

        let timestamp = DATETIME_TAGS
            .iter()
            .filter_map(|tag| exif.get_field(*tag, In::PRIMARY))
            .find_map(|field| ascii_value(&field.value).and_then(|v| parse_exif_datetime(&v)))
            .ok_or_else(|| unreadable("沒有拍攝時間".to_string()))?;

        let model = exif
            .get_field(Tag::Model, In::PRIMARY)
            .and_then(|field| ascii_value(&field.value))
            .filter(|m| !m.is_empty());

        Ok(EmbeddedMetadata { timestamp, model })
    }
}

/// 透過 ffprobe 讀取影片容器的 creation_time
#[derive(Debug, Default)]
pub struct FfprobeMetadataReader;

impl EmbeddedMetadataReader for FfprobeMetadataReader {
    fn read(&self, path: &Path) -> Result<EmbeddedMetadata, TransferError> {
        let tags = get_video_tags(path).map_err(|e| TransferError::MetadataUnreadable {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })?;

        let timestamp = tags
            .creation_time
            .ok_or_else(|| TransferError::MetadataUnreadable {
                path: path.to_path_buf(),
                reason: "沒有 creation_time 標籤".to_string(),
            })?;

        Ok(EmbeddedMetadata {
            timestamp,
            model: tags.model,
        })
    }
}

/// 依媒體類型選擇讀取器，失敗時退回檔案系統的修改時間
pub struct MetadataExtractor {
    photo_reader: Box<dyn EmbeddedMetadataReader>,
    video_reader: Box<dyn EmbeddedMetadataReader>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(Box::new(ExifMetadataReader), Box::new(FfprobeMetadataReader))
    }
}

impl MetadataExtractor {
    #[must_use]
    pub fn new(
        photo_reader: Box<dyn EmbeddedMetadataReader>,
        video_reader: Box<dyn EmbeddedMetadataReader>,
    ) -> Self {
        Self {
            photo_reader,
            video_reader,
        }
    }

    /// Embedded metadata or `None`; reader failures never escape this function.
    #[must_use]
    pub fn read_embedded(&self, file: &SourceFile) -> Option<CaptureMetadata> {
        let reader = match file.kind {
            MediaKind::Photo => &self.photo_reader,
            MediaKind::Video => &self.video_reader,
            MediaKind::Unknown => return None,
        };

        match reader.read(&file.path) {
            Ok(embedded) => Some(CaptureMetadata {
                timestamp: embedded.timestamp,
                model: embedded.model,
                counter: shot_counter(&file.path),
                source: MetadataSource::Embedded,
            }),
            Err(e) => {
                debug!("{e}，改用檔案修改時間");
                None
            }
        }
    }

    /// 取得拍攝資訊；只有在連修改時間都無法取得時才回傳錯誤
    pub fn extract(&self, file: &SourceFile) -> Result<CaptureMetadata, TransferError> {
        if let Some(metadata) = self.read_embedded(file) {
            return Ok(metadata);
        }

        let timestamp = modification_time(&file.path)?;
        Ok(CaptureMetadata {
            timestamp,
            model: None,
            counter: None,
            source: MetadataSource::Filesystem,
        })
    }
}

fn modification_time(path: &Path) -> Result<NaiveDateTime, TransferError> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| TransferError::MetadataUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// 檔名結尾的數字即為相機的拍攝序號（例如 DSCN6228 → 6228）
#[must_use]
pub fn shot_counter(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    TRAILING_DIGITS
        .captures(stem)
        .map(|caps| caps[1].to_string())
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .trim()
                .to_string()
        }),
        _ => None,
    }
}

fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    let datetime = exif::DateTime::from_ascii(value.as_bytes()).ok()?;
    NaiveDate::from_ymd_opt(
        i32::from(datetime.year),
        u32::from(datetime.month),
        u32::from(datetime.day),
    )?
    .and_hms_opt(
        u32::from(datetime.hour),
        u32::from(datetime.minute),
        u32::from(datetime.second),
    )
}
