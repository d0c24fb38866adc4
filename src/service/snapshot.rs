//! 對外快照構建
//!
//! 把會話狀態轉成 protobuf 視圖。伺服器權威：面朝下的卡牌
//! 不洩漏 `pair_key` 與項目資料，客戶端只能看到已翻開或
//! 已配對的卡面。

use hanmatch::proto;

use crate::game::catalog::{item_by_index, stage_by_id, AVATAR_DEFS, STAGE_DEFS};
use crate::game::constants::LEADERBOARD_CAP;
use crate::game::engine::{ClickOutcome, RunState};
use crate::game::leaderboard::{medal_for_rank, Leaderboard};
use crate::game::progress::ProgressRecord;
use crate::game::rewards::ShopError;

use super::session::PlayerSession;

// ============================================================================
// 目錄視圖
// ============================================================================

pub fn catalog_response() -> proto::GetCatalogResponse {
    let stages = STAGE_DEFS
        .iter()
        .map(|stage| proto::StageView {
            id: stage.id,
            name: stage.name.to_string(),
            unlock_order: stage.unlock_order,
            items: stage
                .items
                .iter()
                .map(|item| proto::ItemView {
                    index: item.index,
                    title: item.title.to_string(),
                    description: item.description.to_string(),
                    image_ref: item.image_ref.to_string(),
                    icon_glyph: item.icon_glyph.to_string(),
                })
                .collect(),
        })
        .collect();

    let avatars = AVATAR_DEFS
        .iter()
        .map(|avatar| proto::AvatarView {
            id: avatar.id.to_string(),
            name: avatar.name.to_string(),
            price: avatar.price,
            category: avatar.category.as_str().to_string(),
        })
        .collect();

    proto::GetCatalogResponse { stages, avatars }
}

// ============================================================================
// 對局視圖
// ============================================================================

pub fn run_view(run: &RunState) -> proto::RunView {
    let stage = stage_by_id(run.stage_id);

    let cards = run
        .deck
        .iter()
        .map(|card| {
            let face_up = card.is_flipped || card.is_matched;
            let item = if face_up {
                stage.and_then(|s| item_by_index(s, card.pair_key))
            } else {
                None
            };
            proto::CardView {
                card_id: card.card_id,
                is_flipped: card.is_flipped,
                is_matched: card.is_matched,
                pair_key: if face_up { card.pair_key as i32 } else { -1 },
                title: item.map(|i| i.title.to_string()).unwrap_or_default(),
                icon_glyph: item.map(|i| i.icon_glyph.to_string()).unwrap_or_default(),
                image_ref: item.map(|i| i.image_ref.to_string()).unwrap_or_default(),
            }
        })
        .collect();

    proto::RunView {
        stage_id: run.stage_id,
        cards,
        move_count: run.move_count,
        is_won: run.is_won,
        input_locked: run.input_locked,
        matched_pairs: run.matched_pairs() as u32,
        total_pairs: run.total_pairs() as u32,
    }
}

pub fn progress_view(progress: &ProgressRecord, active_avatar_id: &str) -> proto::ProgressView {
    proto::ProgressView {
        current_stage_id: progress.current_stage_id,
        unlocked_stage_ids: progress.unlocked_stage_ids.iter().copied().collect(),
        completed_stage_ids: progress.completed_stage_ids.iter().copied().collect(),
        coin_balance: progress.coin_balance,
        owned_avatar_ids: progress.owned_avatar_ids.iter().cloned().collect(),
        active_avatar_id: active_avatar_id.to_string(),
        viewed_collection_ids: progress.viewed_collection_ids.iter().cloned().collect(),
    }
}

// ============================================================================
// 回應組裝
// ============================================================================

pub fn progress_response(s: &PlayerSession) -> proto::ProgressResponse {
    proto::ProgressResponse {
        progress: Some(progress_view(&s.progress, &s.identity.active_avatar_id)),
    }
}

pub fn run_response(s: &PlayerSession) -> proto::RunResponse {
    proto::RunResponse {
        run: s.engine.run().map(run_view),
        progress: Some(progress_view(&s.progress, &s.identity.active_avatar_id)),
    }
}

pub fn click_response(outcome: ClickOutcome, s: &PlayerSession) -> proto::ClickCardResponse {
    let result = match outcome {
        ClickOutcome::Ignored => proto::ClickResult::ClickIgnored,
        ClickOutcome::FirstFlip => proto::ClickResult::ClickFirstFlip,
        ClickOutcome::Matched => proto::ClickResult::ClickMatched,
        ClickOutcome::Mismatched => proto::ClickResult::ClickMismatched,
        ClickOutcome::Cleared => proto::ClickResult::ClickStageCleared,
    };

    proto::ClickCardResponse {
        result: result as i32,
        run: s.engine.run().map(run_view),
        progress: Some(progress_view(&s.progress, &s.identity.active_avatar_id)),
    }
}

pub fn shop_status(err: ShopError) -> proto::ShopStatus {
    match err {
        ShopError::UnknownAvatar => proto::ShopStatus::ShopUnknownAvatar,
        ShopError::AlreadyOwned => proto::ShopStatus::ShopAlreadyOwned,
        ShopError::InsufficientFunds => proto::ShopStatus::ShopInsufficientFunds,
        ShopError::NotOwned => proto::ShopStatus::ShopNotOwned,
    }
}

pub fn shop_response(status: proto::ShopStatus, s: &PlayerSession) -> proto::ShopResponse {
    proto::ShopResponse {
        status: status as i32,
        progress: Some(progress_view(&s.progress, &s.identity.active_avatar_id)),
        active_avatar_id: s.identity.active_avatar_id.clone(),
    }
}

// ============================================================================
// 排行榜視圖
// ============================================================================

/// 名次與獎牌是查詢結果內的 1-based 顯示推導
pub fn ranking_response(
    board: &Leaderboard,
    stage_id: u32,
    limit: u32,
) -> proto::GetRankingResponse {
    let limit = if limit == 0 {
        LEADERBOARD_CAP
    } else {
        (limit as usize).min(LEADERBOARD_CAP)
    };

    let filtered: Vec<&crate::game::leaderboard::RankingEntry> = if stage_id == 0 {
        board.entries().iter().collect()
    } else {
        board.for_stage(stage_id)
    };

    let entries = filtered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, entry)| {
            let rank = idx as u32 + 1;
            proto::RankingEntryView {
                rank,
                display_name: entry.display_name.clone(),
                stage_id: entry.stage_id,
                stage_name: entry.stage_name.clone(),
                move_count: entry.move_count,
                timestamp_ms: entry.timestamp_ms,
                completion_time_secs: entry.completion_time_secs,
                medal: medal_for_rank(rank).unwrap_or_default().to_string(),
            }
        })
        .collect();

    proto::GetRankingResponse { entries }
}

// ============================================================================
// 單元測試
// ============================================================================
