//! 遊戲常量定義

// ============================================================================
// 對局規則常量
// ============================================================================

pub const MAX_FLIPPED: usize = 2;        // 同時翻開的卡牌上限
pub const MISMATCH_DELAY_MS: u64 = 1000; // 配對失敗後蓋回卡牌的延遲
pub const FIRST_STAGE_ID: u32 = 1;       // 永遠保持解鎖的第一關

// ============================================================================
// 排行榜常量
// ============================================================================

pub const LEADERBOARD_CAP: usize = 50;   // 排行榜保留的名次數
pub const MEDAL_RANKS: u32 = 3;          // 前三名顯示獎牌

// ============================================================================
// 持久化常量
// ============================================================================

pub const SAVE_DEBOUNCE_MS: u64 = 1000;  // 進度儲存的 debounce 間隔
