use crate::error::TransferError;
use crate::tools::file_hasher::ContentHash;
use crate::tools::hash_store::HashStore;
use log::warn;
use rusqlite::Connection;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_transferred_hashes",
    "CREATE TABLE IF NOT EXISTS transferred_hashes (
        hash TEXT PRIMARY KEY,
        recorded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );",
)];

/// SQLite 持久化的 hash 紀錄，跨執行去重
///
/// 開啟時將所有已知 hash 載入記憶體；`record` 先寫入資料庫（autocommit）
/// 再更新快取，因此 `record` 回傳後即使程式中斷紀錄也不會遺失。
pub struct SqliteHashStore {
    conn: Connection,
    known: HashSet<ContentHash>,
}

impl SqliteHashStore {
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let unavailable = |source: rusqlite::Error| TransferError::HashStoreUnavailable {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("無法建立資料夾 {}: {e}", parent.display());
            }
        }

        let mut conn = Connection::open(path).map_err(unavailable)?;
        run_migrations(&mut conn).map_err(unavailable)?;
        let known = load_hashes(&conn).map_err(unavailable)?;

        Ok(Self { conn, known })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl HashStore for SqliteHashStore {
    fn contains(&self, hash: &ContentHash) -> Result<bool, TransferError> {
        Ok(self.known.contains(hash))
    }

    fn record(&mut self, hash: &ContentHash) -> Result<(), TransferError> {
        if self.known.contains(hash) {
            return Ok(());
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO transferred_hashes (hash) VALUES (?1)",
            (hash.to_hex(),),
        )?;
        self.known.insert(*hash);
        Ok(())
    }
}

fn run_migrations(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS __schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    for (version, sql) in MIGRATIONS {
        let already_applied = {
            let mut stmt = conn.prepare("SELECT 1 FROM __schema_migrations WHERE version = ?1")?;
            stmt.exists([version])?
        };

        if !already_applied {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO __schema_migrations (version) VALUES (?1)",
                (version,),
            )?;
            tx.commit()?;
        }
    }

    Ok(())
}

fn load_hashes(conn: &Connection) -> rusqlite::Result<HashSet<ContentHash>> {
    let mut stmt = conn.prepare("SELECT hash FROM transferred_hashes")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut known = HashSet::new();
    for row in rows {
        let hex = row?;
        match ContentHash::from_hex(&hex) {
            Some(hash) => {
                known.insert(hash);
            }
            None => warn!("略過資料庫中格式錯誤的 hash: {hex}"),
        }
    }
    Ok(known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::file_hasher::hash_reader;
    use tempfile::TempDir;

    #[test]
    fn test_record_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("hashes.db");
        let hash1 = hash_reader(&b"hash1"[..]).unwrap();
        let hash2 = hash_reader(&b"hash2"[..]).unwrap();

        {
            let mut store = SqliteHashStore::open(&db_path).unwrap();
            assert!(store.is_empty());
            store.record(&hash1).unwrap();
        }

        let store = SqliteHashStore::open(&db_path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&hash1).unwrap());
        assert!(!store.contains(&hash2).unwrap());
    }

    #[test]
    fn test_record_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("hashes.db");
        let hash = hash_reader(&b"same"[..]).unwrap();

        let mut store = SqliteHashStore::open(&db_path).unwrap();
        store.record(&hash).unwrap();
        store.record(&hash).unwrap();
        drop(store);

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM transferred_hashes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrations_run_once() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("hashes.db");

        SqliteHashStore::open(&db_path).unwrap();
        SqliteHashStore::open(&db_path).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM __schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_unwritable_path_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        // 目錄本身無法作為資料庫檔案開啟
        let err = SqliteHashStore::open(temp_dir.path()).err().unwrap();
        assert!(err.is_fatal());
    }
}
