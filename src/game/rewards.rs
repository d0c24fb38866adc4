//! 金幣帳本與頭像商店
//!
//! 所有規則違反都以結構化結果回報給呼叫端，絕不 panic，
//! UI 層據此顯示訊息。

use thiserror::Error;

use super::catalog::{avatar_by_id, AvatarDef};
use super::progress::ProgressRecord;

/// 商店操作被拒絕的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ShopError {
    #[error("unknown avatar")]
    UnknownAvatar,
    #[error("avatar already owned")]
    AlreadyOwned,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("avatar not owned")]
    NotOwned,
}

/// 增加金幣
///
/// 只接受非負金額，負數視為 no-op。回傳實際入帳金額。
pub fn add_coins(progress: &mut ProgressRecord, amount: i64) -> i64 {
    if amount <= 0 {
        return 0;
    }
    progress.coin_balance += amount;
    amount
}

/// 購買頭像
///
/// 檢查順序：存在 → 未持有 → 餘額足夠（免費頭像跳過餘額檢查）。
/// 扣款與入庫在同一步完成，呼叫端觀察不到「已扣款未入庫」的
/// 中間狀態；任一檢查失敗時記錄完全不變。
pub fn purchase_avatar(
    progress: &mut ProgressRecord,
    avatar_id: &str,
) -> Result<&'static AvatarDef, ShopError> {
    let avatar = avatar_by_id(avatar_id).ok_or(ShopError::UnknownAvatar)?;

    if progress.owned_avatar_ids.contains(avatar_id) {
        return Err(ShopError::AlreadyOwned);
    }
    if avatar.price > 0 && avatar.price > progress.coin_balance {
        return Err(ShopError::InsufficientFunds);
    }

    progress.coin_balance -= avatar.price;
    progress.owned_avatar_ids.insert(avatar.id.to_string());
    Ok(avatar)
}

/// 選擇當前頭像
///
/// 頭像指標屬於身分/會話狀態，不存在進度記錄裡。
pub fn select_avatar(
    progress: &ProgressRecord,
    active_avatar_id: &mut String,
    avatar_id: &str,
) -> Result<(), ShopError> {
    if !progress.owned_avatar_ids.contains(avatar_id) {
        return Err(ShopError::NotOwned);
    }
    *active_avatar_id = avatar_id.to_string();
    Ok(())
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::DEFAULT_AVATAR_ID;

    #[test]
    fn test_add_coins() {
        let mut progress = ProgressRecord::new();
        assert_eq!(add_coins(&mut progress, 10), 10);
        assert_eq!(progress.coin_balance, 10);

        assert_eq!(add_coins(&mut progress, 0), 0);
        assert_eq!(add_coins(&mut progress, -5), 0);
        assert_eq!(progress.coin_balance, 10);
    }

    #[test]
    fn test_purchase_then_repurchase() {
        let mut progress = ProgressRecord::new();
        progress.coin_balance = 15;

        let avatar = purchase_avatar(&mut progress, "😎").unwrap();
        assert_eq!(avatar.price, 10);
        assert_eq!(progress.coin_balance, 5);
        assert!(progress.owned_avatar_ids.contains("😎"));

        assert_eq!(purchase_avatar(&mut progress, "😎"), Err(ShopError::AlreadyOwned));
        assert_eq!(progress.coin_balance, 5);
    }

    #[test]
    fn test_purchase_rejections_leave_record_untouched() {
        let mut progress = ProgressRecord::new();
        progress.coin_balance = 5;
        let snapshot = progress.clone();

        assert_eq!(purchase_avatar(&mut progress, "🤖"), Err(ShopError::UnknownAvatar));
        assert_eq!(purchase_avatar(&mut progress, "👑"), Err(ShopError::InsufficientFunds));
        assert_eq!(
            purchase_avatar(&mut progress, DEFAULT_AVATAR_ID),
            Err(ShopError::AlreadyOwned)
        );
        assert_eq!(progress, snapshot);
    }

    #[test]
    fn test_exact_balance_purchase_succeeds() {
        let mut progress = ProgressRecord::new();
        progress.coin_balance = 50;
        purchase_avatar(&mut progress, "👑").unwrap();
        assert_eq!(progress.coin_balance, 0);
    }

    #[test]
    fn test_free_avatar_bypasses_funds_check() {
        let mut progress = ProgressRecord::new();
        progress.owned_avatar_ids.clear();
        assert_eq!(progress.coin_balance, 0);

        purchase_avatar(&mut progress, DEFAULT_AVATAR_ID).unwrap();
        assert_eq!(progress.coin_balance, 0);
        assert!(progress.owned_avatar_ids.contains(DEFAULT_AVATAR_ID));
    }

    #[test]
    fn test_select_avatar_requires_ownership() {
        let mut progress = ProgressRecord::new();
        progress.coin_balance = 10;
        purchase_avatar(&mut progress, "🥳").unwrap();

        let mut active = DEFAULT_AVATAR_ID.to_string();
        select_avatar(&progress, &mut active, "🥳").unwrap();
        assert_eq!(active, "🥳");

        assert_eq!(
            select_avatar(&progress, &mut active, "👑"),
            Err(ShopError::NotOwned)
        );
        assert_eq!(active, "🥳");
    }
}
