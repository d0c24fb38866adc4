//! 玩家進度記錄與解鎖推進
//!
//! `ProgressRecord` 是唯一跨元件共享的可變狀態，持久化採
//! whole-record 替換（last-writer-wins），由服務層 debounce 後
//! 交給儲存後端。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::DEFAULT_AVATAR_ID;
use super::constants::FIRST_STAGE_ID;

/// 跨場次的玩家進度
///
/// 集合使用 `BTreeSet`，序列化結果穩定。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub current_stage_id: u32,
    pub unlocked_stage_ids: BTreeSet<u32>,
    pub completed_stage_ids: BTreeSet<u32>,
    pub coin_balance: i64,
    pub owned_avatar_ids: BTreeSet<String>,
    #[serde(default)]
    pub viewed_collection_ids: BTreeSet<String>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_stage_id: FIRST_STAGE_ID,
            unlocked_stage_ids: BTreeSet::from([FIRST_STAGE_ID]),
            completed_stage_ids: BTreeSet::new(),
            coin_balance: 0,
            owned_avatar_ids: BTreeSet::from([DEFAULT_AVATAR_ID.to_string()]),
            viewed_collection_ids: BTreeSet::new(),
        }
    }
}

impl ProgressRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 載入外部資料後修復不變量：第一關保持解鎖、預設頭像保持持有、
    /// 金幣不為負。儲存後端的資料可能來自舊版本或被手動編輯過。
    pub fn normalize(&mut self) {
        self.unlocked_stage_ids.insert(FIRST_STAGE_ID);
        self.owned_avatar_ids.insert(DEFAULT_AVATAR_ID.to_string());
        if self.coin_balance < 0 {
            self.coin_balance = 0;
        }
        if self.current_stage_id == 0 {
            self.current_stage_id = FIRST_STAGE_ID;
        }
    }

    /// 收藏頁面的瀏覽標記；回傳是否為首次瀏覽
    pub fn mark_collection_viewed(&mut self, collection_id: &str) -> bool {
        self.viewed_collection_ids.insert(collection_id.to_string())
    }
}

/// 關卡過關後的進度推進
///
/// 冪等：重複以同一 `stage_id` 呼叫得到相同的集合。
/// 回傳該關卡是否為首次完成（排行榜收錄不依賴這個值，
/// 只有進度集合依賴）。
pub fn on_stage_cleared(progress: &mut ProgressRecord, stage_id: u32, max_stage_id: u32) -> bool {
    let newly_completed = progress.completed_stage_ids.insert(stage_id);

    let next_stage_id = stage_id + 1;
    if next_stage_id <= max_stage_id {
        progress.unlocked_stage_ids.insert(next_stage_id);
    }

    newly_completed
}

// ============================================================================
// 單元測試
// ============================================================================
