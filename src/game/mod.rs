//! 遊戲核心模組
//!
//! 包含韓國文化翻牌配對遊戲的核心定義：
//! - `constants`: 遊戲常量
//! - `catalog`: 關卡/項目/頭像的靜態目錄
//! - `deck`: 牌組構建（成對 + Fisher-Yates 洗勻）
//! - `engine`: 配對引擎（純狀態機）
//! - `progress`: 玩家進度與解鎖推進
//! - `rewards`: 金幣帳本與頭像商店
//! - `leaderboard`: 排行榜收錄
//!
//! 注意：渲染與 OAuth 由 Web 客戶端處理，這裡只提供遊戲狀態

#![allow(unused_imports)]

pub mod catalog;
pub mod constants;
pub mod deck;
pub mod engine;
pub mod leaderboard;
pub mod progress;
pub mod rewards;

// Re-export 常用類型（公開 API，可能未在內部使用）
pub use constants::*;
pub use catalog::{
    avatar_by_id, item_by_index, max_stage_id, stage_by_id, AvatarCategory, AvatarDef, ItemDef,
    StageDef, AVATAR_DEFS, DEFAULT_AVATAR_ID, STAGE_DEFS,
};
pub use deck::{build_deck, Card};
pub use engine::{ClickOutcome, MatchEngine, RunPhase, RunState};
pub use leaderboard::{medal_for_rank, Leaderboard, RankingEntry};
pub use progress::{on_stage_cleared, ProgressRecord};
pub use rewards::{add_coins, purchase_avatar, select_avatar, ShopError};
