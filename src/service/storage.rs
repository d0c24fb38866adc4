//! 進度與排行榜的儲存後端
//!
//! whole-record 替換、last-writer-wins。儲存失敗只記錄日誌，
//! 絕不回滾記憶體內的遊戲狀態，也絕不阻擋遊玩。
//! 後端可插拔：記憶體（測試、訪客）或 JSON 檔案。

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use dashmap::DashMap;
use thiserror::Error;

use crate::game::{ProgressRecord, RankingEntry};

/// 儲存層錯誤
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// 玩家進度儲存
pub trait ProgressStore: Send + Sync {
    fn load(&self, player_id: &str) -> Result<Option<ProgressRecord>, StorageError>;
    fn save(&self, player_id: &str, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// 排行榜儲存
pub trait BoardStore: Send + Sync {
    fn load(&self) -> Result<Vec<RankingEntry>, StorageError>;
    fn save(&self, entries: &[RankingEntry]) -> Result<(), StorageError>;
}

// ============================================================================
// 記憶體儲存
// ============================================================================

/// 記憶體儲存（測試與訪客模式）
#[derive(Default)]
pub struct MemoryStore {
    progress: DashMap<String, ProgressRecord>,
    board: Mutex<Vec<RankingEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, player_id: &str) -> Result<Option<ProgressRecord>, StorageError> {
        Ok(self.progress.get(player_id).map(|r| r.value().clone()))
    }

    fn save(&self, player_id: &str, record: &ProgressRecord) -> Result<(), StorageError> {
        self.progress.insert(player_id.to_string(), record.clone());
        Ok(())
    }
}

impl BoardStore for MemoryStore {
    fn load(&self) -> Result<Vec<RankingEntry>, StorageError> {
        let board = self.board.lock().unwrap_or_else(|e| e.into_inner());
        Ok(board.clone())
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<(), StorageError> {
        let mut board = self.board.lock().unwrap_or_else(|e| e.into_inner());
        *board = entries.to_vec();
        Ok(())
    }
}

// ============================================================================
// JSON 檔案儲存
// ============================================================================

/// JSON 檔案儲存：每位玩家一個進度檔 + 一個排行榜檔
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn progress_path(&self, player_id: &str) -> PathBuf {
        // 玩家 id 是不透明字串，可能含路徑不安全字元，檔名用十六進位編碼
        let mut encoded = String::with_capacity(player_id.len() * 2);
        for byte in player_id.bytes() {
            let _ = write!(encoded, "{:02x}", byte);
        }
        self.dir.join(format!("progress-{}.json", encoded))
    }

    fn board_path(&self) -> PathBuf {
        self.dir.join("ranking.json")
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self, player_id: &str) -> Result<Option<ProgressRecord>, StorageError> {
        match fs::read_to_string(self.progress_path(player_id)) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, player_id: &str, record: &ProgressRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.progress_path(player_id), json)?;
        Ok(())
    }
}

impl BoardStore for JsonFileStore {
    fn load(&self) -> Result<Vec<RankingEntry>, StorageError> {
        match fs::read_to_string(self.board_path()) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(self.board_path(), json)?;
        Ok(())
    }
}

// ============================================================================
// 單元測試
// ============================================================================
