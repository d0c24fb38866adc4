//! 服務層模組
//!
//! 提供 gRPC 服務所需的會話管理、快照構建與儲存後端

#![allow(unused_imports)]

pub mod session;
pub mod snapshot;
pub mod storage;

pub use session::{Identity, PlayerSession, SessionError, SessionHub};
pub use snapshot::{catalog_response, progress_view, ranking_response, run_view};
pub use storage::{BoardStore, JsonFileStore, MemoryStore, ProgressStore, StorageError};
