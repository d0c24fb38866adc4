//! 牌組構建
//!
//! 從關卡的項目目錄產生成對、洗勻的牌組。

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::catalog::StageDef;

/// 對局中的一張卡牌
///
/// `card_id` 等於洗勻後在牌組中的位置，因此 `deck[card_id]`
/// 恆為被點擊的那張卡。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub card_id: u32,
    pub pair_key: u32, // 來源項目的 index，每副牌恰好兩張相同
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    fn face_down(pair_key: u32) -> Self {
        Self {
            card_id: 0,
            pair_key,
            is_flipped: false,
            is_matched: false,
        }
    }
}

/// 構建洗勻的牌組
///
/// 每個項目產生兩張共享 `pair_key` 的卡牌，以 Fisher-Yates 洗勻
/// （`(2N)!` 種排列等機率），最後依位置編號 `card_id`。
/// 空關卡回傳空牌組，呼叫端必須視為「無可遊玩」而不開局。
pub fn build_deck(stage: &StageDef, rng: &mut StdRng) -> Vec<Card> {
    let mut deck = Vec::with_capacity(stage.items.len() * 2);
    for item in stage.items {
        deck.push(Card::face_down(item.index));
        deck.push(Card::face_down(item.index));
    }

    deck.shuffle(rng);

    for (pos, card) in deck.iter_mut().enumerate() {
        card.card_id = pos as u32;
    }
    deck
}

// ============================================================================
// 單元測試
// ============================================================================
