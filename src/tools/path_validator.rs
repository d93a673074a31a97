use std::io;
use std::path::Path;

/// 建立資料夾（已存在時不視為錯誤）
pub fn ensure_directory_exists(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directory_exists_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2022").join("07");

        ensure_directory_exists(&nested).unwrap();
        ensure_directory_exists(&nested).unwrap();

        assert!(nested.is_dir());
    }

    #[test]
    fn test_ensure_directory_fails_on_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        assert!(ensure_directory_exists(&file).is_err());
    }
}
