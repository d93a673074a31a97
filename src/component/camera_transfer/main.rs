use super::destination::destination_path;
use super::metadata_reader::MetadataExtractor;
use super::output_writer::{OsOutputFileWriter, OutputFileWriter};
use crate::config::{Settings, TransferMode};
use crate::error::TransferError;
use crate::tools::{
    ContentHash, FileGetter, HashStore, OsFileGetter, SourceFile, calculate_file_hash,
    open_hash_store,
};
use console::style;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 單一檔案的最終狀態
#[derive(Debug)]
pub enum FileOutcome {
    Transferred(PathBuf),
    /// Dry run: the file would have been written here.
    DryRun(PathBuf),
    Duplicate,
    Collision(PathBuf),
    Failed(TransferError),
    Unrecognized,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub total_files: usize,
    pub transferred: usize,
    pub dry_run: usize,
    pub duplicates: usize,
    pub collisions: usize,
    pub failed: usize,
    pub unrecognized: usize,
}

impl TransferResult {
    fn add(&mut self, outcome: &FileOutcome) {
        self.total_files += 1;
        match outcome {
            FileOutcome::Transferred(_) => self.transferred += 1,
            FileOutcome::DryRun(_) => self.dry_run += 1,
            FileOutcome::Duplicate => self.duplicates += 1,
            FileOutcome::Collision(_) => self.collisions += 1,
            FileOutcome::Failed(_) => self.failed += 1,
            FileOutcome::Unrecognized => self.unrecognized += 1,
        }
    }
}

/// 相機檔案傳輸元件
///
/// 依序處理相機資料夾中的每個檔案：計算 hash、去重、讀取拍攝資訊、
/// 決定目的地，再交給 writer 寫入。單一檔案的錯誤不會中止整個執行。
pub struct CameraTransfer {
    file_getter: Box<dyn FileGetter>,
    processor: FileProcessor,
}

impl CameraTransfer {
    /// 依設定組裝本機檔案來源、writer 與 hash 紀錄
    pub fn from_settings(settings: Settings) -> Result<Self, TransferError> {
        let hash_store = open_hash_store(&settings)?;
        Ok(Self::new(
            settings.clone(),
            Box::new(OsFileGetter::new(settings)),
            hash_store,
            Box::new(OsOutputFileWriter),
            MetadataExtractor::default(),
        ))
    }

    #[must_use]
    pub fn new(
        settings: Settings,
        file_getter: Box<dyn FileGetter>,
        hash_store: Box<dyn HashStore>,
        writer: Box<dyn OutputFileWriter>,
        metadata: MetadataExtractor,
    ) -> Self {
        Self {
            file_getter,
            processor: FileProcessor {
                settings,
                metadata,
                writer,
                hash_store,
                planned: HashSet::new(),
                planned_destinations: HashSet::new(),
            },
        }
    }

    /// 執行傳輸；只有相機資料夾無法存取時回傳錯誤
    pub fn run(&mut self) -> Result<TransferResult, TransferError> {
        let settings = &self.processor.settings;
        info!(
            "{}開始傳輸: {}",
            if settings.dry_run { "[dry run] " } else { "" },
            settings.camera_folder.display()
        );

        let mut result = TransferResult::default();
        for file in self.file_getter.files()? {
            let outcome = self.processor.process(&file);
            result.add(&outcome);
        }

        info!(
            "傳輸完成 - 總數: {}, 已傳輸: {}, 預計傳輸: {}, 重複: {}, 名稱衝突: {}, 失敗: {}",
            result.total_files,
            result.transferred,
            result.dry_run,
            result.duplicates,
            result.collisions,
            result.failed
        );

        Ok(result)
    }

    pub fn print_summary(result: &TransferResult) {
        println!();
        println!("{}", style("=== 相機檔案傳輸結果 ===").cyan().bold());
        println!("  掃描檔案: {} 個", result.total_files);
        println!("  已傳輸: {}", style(result.transferred).green());
        if result.dry_run > 0 {
            println!("  預計傳輸 (dry run): {}", style(result.dry_run).cyan());
        }
        println!("  略過重複: {}", style(result.duplicates).yellow());
        if result.collisions > 0 {
            println!("  名稱衝突: {}", style(result.collisions).yellow());
        }
        if result.failed > 0 {
            println!("  失敗: {}", style(result.failed).red());
        }
    }
}

struct FileProcessor {
    settings: Settings,
    metadata: MetadataExtractor,
    writer: Box<dyn OutputFileWriter>,
    hash_store: Box<dyn HashStore>,
    /// Hashes already planned during a dry run, never persisted.
    planned: HashSet<ContentHash>,
    /// dry run 中已分配出去的目的地
    planned_destinations: HashSet<PathBuf>,
}

impl FileProcessor {
    fn process(&mut self, file: &SourceFile) -> FileOutcome {
        match self.try_process(file) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("傳輸失敗 {}: {e}", file.path.display());
                FileOutcome::Failed(e)
            }
        }
    }

    fn try_process(&mut self, file: &SourceFile) -> Result<FileOutcome, TransferError> {
        if !file.kind.is_media() {
            return Ok(FileOutcome::Unrecognized);
        }

        let hash =
            calculate_file_hash(&file.path).map_err(|e| TransferError::HashComputeFailure {
                path: file.path.clone(),
                source: e,
            })?;

        if self.is_known(&hash)? {
            info!("略過重複檔案: {}", file.path.display());
            return Ok(FileOutcome::Duplicate);
        }

        let metadata = self.metadata.extract(file)?;
        let extension = file.extension().unwrap_or_default();
        let Some(destination) = destination_path(file.kind, &metadata, extension, &self.settings)
        else {
            return Ok(FileOutcome::Unrecognized);
        };

        if self.settings.dry_run {
            return Ok(self.plan(file, hash, destination));
        }

        let mut source = file.open().map_err(|e| TransferError::WriteError {
            path: file.path.clone(),
            source: e,
        })?;

        match self.writer.write(&mut source, &destination) {
            Ok(()) => {}
            Err(TransferError::NamingCollision { path }) => {
                return self.resolve_collision(file, &hash, path);
            }
            Err(e) => return Err(e),
        }
        drop(source);

        self.hash_store.record(&hash)?;
        info!(
            "已傳輸 {} -> {}",
            file.path.display(),
            destination.display()
        );

        if self.settings.transfer_mode == TransferMode::Move {
            remove_source(&file.path);
        }

        Ok(FileOutcome::Transferred(destination))
    }

    fn is_known(&self, hash: &ContentHash) -> Result<bool, TransferError> {
        Ok(self.planned.contains(hash) || self.hash_store.contains(hash)?)
    }

    /// dry run 與實際執行做出相同的判斷，但不寫入檔案也不記錄 hash
    fn plan(&mut self, file: &SourceFile, hash: ContentHash, destination: PathBuf) -> FileOutcome {
        // 同一次執行中先分配到此名稱的檔案優先
        if self.planned_destinations.contains(&destination) {
            warn_collision(file, &destination);
            return FileOutcome::Collision(destination);
        }

        if destination.exists() {
            if has_same_content(&destination, &hash) {
                info!(
                    "[dry run] 略過 {}: 相同內容已在 {}",
                    file.path.display(),
                    destination.display()
                );
                self.planned.insert(hash);
                return FileOutcome::Duplicate;
            }
            warn_collision(file, &destination);
            return FileOutcome::Collision(destination);
        }

        info!(
            "[dry run] 預計傳輸 {} -> {}",
            file.path.display(),
            destination.display()
        );
        self.planned.insert(hash);
        self.planned_destinations.insert(destination.clone());
        FileOutcome::DryRun(destination)
    }

    /// 目的地已存在：內容相同視為重複並補記 hash，否則保留既有檔案
    fn resolve_collision(
        &mut self,
        file: &SourceFile,
        hash: &ContentHash,
        existing: PathBuf,
    ) -> Result<FileOutcome, TransferError> {
        if has_same_content(&existing, hash) {
            info!(
                "略過 {}: 相同內容已在 {}",
                file.path.display(),
                existing.display()
            );
            self.hash_store.record(hash)?;
            return Ok(FileOutcome::Duplicate);
        }

        warn_collision(file, &existing);
        Ok(FileOutcome::Collision(existing))
    }
}

fn has_same_content(existing: &Path, hash: &ContentHash) -> bool {
    matches!(calculate_file_hash(existing), Ok(ref existing_hash) if existing_hash == hash)
}

fn warn_collision(file: &SourceFile, existing: &Path) {
    warn!(
        "名稱衝突: {} 會覆寫 {}，保留既有檔案",
        file.path.display(),
        existing.display()
    );
}

fn remove_source(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("已傳輸但無法刪除來源檔案 {}: {e}", path.display());
    }
}
