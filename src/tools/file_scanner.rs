use crate::config::{MediaKind, Settings};
use crate::error::TransferError;
use log::warn;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use walkdir::WalkDir;

/// 相機資料夾中的一個來源檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub size: u64,
}

impl SourceFile {
    pub fn open(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    /// 原始副檔名（保留大小寫，不含點）
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// Source of candidate files. Every call to `files` restarts the enumeration.
pub trait FileGetter {
    fn files(&self) -> Result<Box<dyn Iterator<Item = SourceFile> + '_>, TransferError>;
}

/// 從本機資料夾列舉檔案
pub struct OsFileGetter {
    settings: Settings,
}

impl OsFileGetter {
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }

    fn to_source_file(&self, entry: walkdir::DirEntry) -> Option<SourceFile> {
        if !entry.file_type().is_file() {
            return None;
        }

        let kind = MediaKind::classify(entry.path(), &self.settings);
        if !kind.is_media() {
            return None;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("略過 {}: {e}", entry.path().display());
                return None;
            }
        };

        Some(SourceFile {
            path: entry.into_path(),
            kind,
            size,
        })
    }
}

impl FileGetter for OsFileGetter {
    fn files(&self) -> Result<Box<dyn Iterator<Item = SourceFile> + '_>, TransferError> {
        let folder = &self.settings.camera_folder;
        if !folder.is_dir() {
            return Err(TransferError::SourceUnavailable {
                path: folder.clone(),
            });
        }

        // 目的地資料夾若位於相機資料夾內，不再掃描已整理過的檔案
        let excluded: Vec<PathBuf> = [
            &self.settings.main_photos_folder,
            &self.settings.main_videos_folder,
        ]
        .into_iter()
        .filter(|dest| *dest != folder && dest.starts_with(folder))
        .cloned()
        .collect();

        let max_depth = if self.settings.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !excluded.iter().any(|dest| entry.path() == dest.as_path()));

        Ok(Box::new(walker.filter_map(move |entry| {
            match entry {
                Ok(entry) => self.to_source_file(entry),
                Err(e) => {
                    warn!("略過無法讀取的項目 ({}): {e}", folder.display());
                    None
                }
            }
        })))
    }
}
