//! 配對引擎
//!
//! 純狀態機：吃點擊事件，追蹤翻開/已配對的卡牌、嘗試次數、
//! 輸入鎖定與勝利判定。單執行緒、逐步執行；唯一的非同步元素
//! 是配對失敗後的延遲蓋牌，由呼叫端以當前 generation 排程
//! `resolve_mismatch`，過期計時器自動失效。

use rand::rngs::StdRng;

use super::catalog::StageDef;
use super::constants::MAX_FLIPPED;
use super::deck::{build_deck, Card};

/// 對局階段
///
/// `Idle -> Ready -> OneFlipped -> Resolving -> (Ready | Won)`；
/// `Won` 為終態，直到下一次 `initialize_game`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Ready,
    OneFlipped,
    Resolving,
    Won,
}

/// 單次點擊的結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 點擊被忽略：鎖定中、重複點擊、已配對、已勝利或 id 越界
    Ignored,
    /// 第一張卡翻開
    FirstFlip,
    /// 配對成功（輸入立即解鎖）
    Matched,
    /// 配對成功且整副牌完成：關卡過關事件，每局恰好一次
    Cleared,
    /// 配對失敗：保持鎖定，呼叫端須在 `MISMATCH_DELAY_MS` 後
    /// 以當前 generation 呼叫 `resolve_mismatch`
    Mismatched,
}

/// 一局的狀態，由引擎獨占持有；每次開新局整個重建
#[derive(Clone, Debug)]
pub struct RunState {
    pub stage_id: u32,
    pub deck: Vec<Card>,
    pub flipped: Vec<u32>, // 至多 MAX_FLIPPED 張
    pub move_count: u32,
    pub is_won: bool,
    pub input_locked: bool,
}

impl RunState {
    #[allow(dead_code)]
    pub fn matched_ids(&self) -> Vec<u32> {
        self.deck
            .iter()
            .filter(|c| c.is_matched)
            .map(|c| c.card_id)
            .collect()
    }

    pub fn matched_pairs(&self) -> usize {
        self.deck.iter().filter(|c| c.is_matched).count() / 2
    }

    pub fn total_pairs(&self) -> usize {
        self.deck.len() / 2
    }
}

/// 配對引擎
///
/// generation 在每次 `initialize_game`/`reset` 遞增，是延遲蓋牌
/// 計時器的失效憑證。
#[derive(Debug, Default)]
pub struct MatchEngine {
    run: Option<RunState>,
    generation: u64,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> RunPhase {
        match &self.run {
            None => RunPhase::Idle,
            Some(run) if run.is_won => RunPhase::Won,
            Some(run) => match run.flipped.len() {
                0 => RunPhase::Ready,
                1 => RunPhase::OneFlipped,
                _ => RunPhase::Resolving,
            },
        }
    }

    /// 開新局：構建新牌組並清空所有對局狀態
    ///
    /// generation 一律遞增，因此上一局未到期的蓋牌計時器立即失效。
    /// 空關卡不開局（回傳 None）。
    pub fn initialize_game(&mut self, stage: &StageDef, rng: &mut StdRng) -> Option<&RunState> {
        self.generation = self.generation.wrapping_add(1);

        let deck = build_deck(stage, rng);
        if deck.is_empty() {
            self.run = None;
            return None;
        }

        self.run = Some(RunState {
            stage_id: stage.id,
            deck,
            flipped: Vec::with_capacity(MAX_FLIPPED),
            move_count: 0,
            is_won: false,
            input_locked: false,
        });
        self.run.as_ref()
    }

    /// 放棄當前對局，回到 Idle
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.run = None;
    }

    /// 處理一次卡牌點擊
    ///
    /// 第二張卡翻開的同一個同步步驟內就上鎖並計一次嘗試，
    /// 因此 Resolving 期間的第三次點擊必然被拒絕。
    pub fn handle_card_click(&mut self, card_id: u32) -> ClickOutcome {
        let run = match self.run.as_mut() {
            Some(run) => run,
            None => return ClickOutcome::Ignored,
        };

        let idx = card_id as usize;
        if run.input_locked
            || run.is_won
            || run.flipped.len() >= MAX_FLIPPED
            || run.flipped.contains(&card_id)
            || idx >= run.deck.len()
            || run.deck[idx].is_matched
        {
            return ClickOutcome::Ignored;
        }

        run.deck[idx].is_flipped = true;
        run.flipped.push(card_id);

        if run.flipped.len() < MAX_FLIPPED {
            return ClickOutcome::FirstFlip;
        }

        // 第二張卡：上鎖並計一次嘗試（一次嘗試 = 翻開兩張卡）
        run.input_locked = true;
        run.move_count += 1;

        let a = run.flipped[0] as usize;
        let b = run.flipped[1] as usize;

        if run.deck[a].pair_key == run.deck[b].pair_key {
            run.deck[a].is_matched = true;
            run.deck[b].is_matched = true;
            run.deck[a].is_flipped = false;
            run.deck[b].is_flipped = false;
            run.flipped.clear();
            run.input_locked = false;

            if run.deck.iter().all(|c| c.is_matched) {
                run.is_won = true;
                return ClickOutcome::Cleared;
            }
            return ClickOutcome::Matched;
        }

        // 配對失敗：維持鎖定，等待延遲蓋牌
        ClickOutcome::Mismatched
    }

    /// 配對失敗的延遲蓋牌
    ///
    /// 只有在 generation 相符且確實有待蓋回的失敗配對時才生效；
    /// 其餘情況（對局已重開、已配對成功）皆為 no-op，
    /// 因此過期計時器不會覆寫新對局的狀態。
    pub fn resolve_mismatch(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        let run = match self.run.as_mut() {
            Some(run) => run,
            None => return false,
        };
        if run.is_won || !run.input_locked || run.flipped.len() != MAX_FLIPPED {
            return false;
        }

        for id in run.flipped.drain(..) {
            run.deck[id as usize].is_flipped = false;
        }
        run.input_locked = false;
        true
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{StageDef, STAGE_DEFS};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn new_engine(seed: u64) -> MatchEngine {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut engine = MatchEngine::new();
        engine.initialize_game(&STAGE_DEFS[0], &mut rng);
        engine
    }

    /// 依 pair_key 分組取出每對卡牌的兩個 card_id
    fn pair_ids(engine: &MatchEngine) -> Vec<(u32, u32)> {
        let deck = &engine.run().unwrap().deck;
        let mut by_key: std::collections::BTreeMap<u32, Vec<u32>> = Default::default();
        for card in deck {
            by_key.entry(card.pair_key).or_default().push(card.card_id);
        }
        by_key.values().map(|ids| (ids[0], ids[1])).collect()
    }

    /// 找出兩張 pair_key 不同的卡
    fn mismatched_ids(engine: &MatchEngine) -> (u32, u32) {
        let deck = &engine.run().unwrap().deck;
        let first = &deck[0];
        let other = deck.iter().find(|c| c.pair_key != first.pair_key).unwrap();
        (first.card_id, other.card_id)
    }

    #[test]
    fn test_initialize_builds_fresh_run() {
        let engine = new_engine(42);
        let run = engine.run().unwrap();
        assert_eq!(run.deck.len(), 16);
        assert_eq!(run.move_count, 0);
        assert!(!run.is_won);
        assert!(!run.input_locked);
        assert!(run.flipped.is_empty());
        assert_eq!(engine.phase(), RunPhase::Ready);
    }

    #[test]
    fn test_first_flip_does_not_count_a_move() {
        let mut engine = new_engine(42);
        assert_eq!(engine.handle_card_click(0), ClickOutcome::FirstFlip);
        let run = engine.run().unwrap();
        assert_eq!(run.move_count, 0);
        assert_eq!(run.flipped, vec![0]);
        assert_eq!(engine.phase(), RunPhase::OneFlipped);
    }

    #[test]
    fn test_matching_pair_resolves_immediately() {
        let mut engine = new_engine(42);
        let (a, b) = pair_ids(&engine)[0];

        assert_eq!(engine.handle_card_click(a), ClickOutcome::FirstFlip);
        assert_eq!(engine.handle_card_click(b), ClickOutcome::Matched);

        let run = engine.run().unwrap();
        assert_eq!(run.move_count, 1);
        assert!(run.flipped.is_empty());
        assert!(!run.input_locked);
        assert_eq!(run.matched_ids().len(), 2);
        assert!(run.matched_ids().contains(&a));
        assert!(run.matched_ids().contains(&b));
        assert!(!run.is_won);
        assert_eq!(engine.phase(), RunPhase::Ready);
    }

    #[test]
    fn test_mismatch_locks_until_resolved() {
        let mut engine = new_engine(42);
        let (a, b) = mismatched_ids(&engine);

        engine.handle_card_click(a);
        assert_eq!(engine.handle_card_click(b), ClickOutcome::Mismatched);
        assert_eq!(engine.phase(), RunPhase::Resolving);

        let run = engine.run().unwrap();
        assert_eq!(run.move_count, 1);
        assert!(run.input_locked);

        // 鎖定期間所有點擊都是 no-op
        for id in 0..16 {
            assert_eq!(engine.handle_card_click(id), ClickOutcome::Ignored);
        }
        assert_eq!(engine.run().unwrap().move_count, 1);

        let generation = engine.generation();
        assert!(engine.resolve_mismatch(generation));

        let run = engine.run().unwrap();
        assert!(!run.input_locked);
        assert!(run.flipped.is_empty());
        assert!(run.deck.iter().all(|c| !c.is_flipped));
        assert_eq!(engine.phase(), RunPhase::Ready);
    }

    #[test]
    fn test_stale_resolve_is_a_noop() {
        let mut engine = new_engine(42);
        let (a, b) = mismatched_ids(&engine);
        engine.handle_card_click(a);
        engine.handle_card_click(b);
        let stale = engine.generation();

        // 計時器未到期就重開：新局不得被過期計時器覆寫
        let mut rng = StdRng::seed_from_u64(7);
        engine.initialize_game(&STAGE_DEFS[0], &mut rng);
        engine.handle_card_click(3);
        assert_eq!(engine.phase(), RunPhase::OneFlipped);

        assert!(!engine.resolve_mismatch(stale));
        assert_eq!(engine.phase(), RunPhase::OneFlipped);
        assert_eq!(engine.run().unwrap().flipped, vec![3]);
    }

    #[test]
    fn test_resolve_without_pending_mismatch_is_a_noop() {
        let mut engine = new_engine(42);
        let generation = engine.generation();
        assert!(!engine.resolve_mismatch(generation));

        let (a, b) = pair_ids(&engine)[0];
        engine.handle_card_click(a);
        engine.handle_card_click(b);
        assert!(!engine.resolve_mismatch(generation));
        assert_eq!(engine.run().unwrap().matched_ids().len(), 2);
    }

    #[test]
    fn test_duplicate_and_out_of_range_clicks_ignored() {
        let mut engine = new_engine(42);
        engine.handle_card_click(5);
        assert_eq!(engine.handle_card_click(5), ClickOutcome::Ignored);
        assert_eq!(engine.handle_card_click(16), ClickOutcome::Ignored);
        assert_eq!(engine.handle_card_click(u32::MAX), ClickOutcome::Ignored);
        assert_eq!(engine.run().unwrap().flipped, vec![5]);
    }

    #[test]
    fn test_clicking_matched_card_ignored() {
        let mut engine = new_engine(42);
        let (a, b) = pair_ids(&engine)[0];
        engine.handle_card_click(a);
        engine.handle_card_click(b);
        assert_eq!(engine.handle_card_click(a), ClickOutcome::Ignored);
    }

    #[test]
    fn test_clearing_all_pairs_wins_exactly_once() {
        let mut engine = new_engine(42);
        let pairs = pair_ids(&engine);
        let total = pairs.len();

        for (i, (a, b)) in pairs.into_iter().enumerate() {
            engine.handle_card_click(a);
            let outcome = engine.handle_card_click(b);
            if i + 1 == total {
                assert_eq!(outcome, ClickOutcome::Cleared);
            } else {
                assert_eq!(outcome, ClickOutcome::Matched);
                assert!(!engine.run().unwrap().is_won);
            }
        }

        let run = engine.run().unwrap();
        assert!(run.is_won);
        assert_eq!(run.move_count, total as u32);
        assert_eq!(run.matched_ids().len(), run.deck.len());
        assert_eq!(engine.phase(), RunPhase::Won);

        // 終態：後續點擊全部忽略
        for id in 0..16 {
            assert_eq!(engine.handle_card_click(id), ClickOutcome::Ignored);
        }
    }

    #[test]
    fn test_won_is_terminal_until_reinitialize() {
        let mut engine = new_engine(42);
        for (a, b) in pair_ids(&engine) {
            engine.handle_card_click(a);
            engine.handle_card_click(b);
        }
        assert_eq!(engine.phase(), RunPhase::Won);

        let mut rng = StdRng::seed_from_u64(77);
        engine.initialize_game(&STAGE_DEFS[0], &mut rng);
        assert_eq!(engine.phase(), RunPhase::Ready);
        assert_eq!(engine.run().unwrap().move_count, 0);
    }

    #[test]
    fn test_empty_stage_does_not_start_a_run() {
        let empty = StageDef {
            id: 9,
            name: "빈 스테이지",
            unlock_order: 9,
            items: &[],
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut engine = MatchEngine::new();
        assert!(engine.initialize_game(&empty, &mut rng).is_none());
        assert_eq!(engine.phase(), RunPhase::Idle);
        assert_eq!(engine.handle_card_click(0), ClickOutcome::Ignored);
    }

    #[test]
    fn test_reset_returns_to_idle_and_invalidates_timers() {
        let mut engine = new_engine(42);
        let (a, b) = mismatched_ids(&engine);
        engine.handle_card_click(a);
        engine.handle_card_click(b);
        let stale = engine.generation();

        engine.reset();
        assert_eq!(engine.phase(), RunPhase::Idle);
        assert!(!engine.resolve_mismatch(stale));
    }

    proptest! {
        /// 任意點擊序列下的不變量：
        /// - 鎖定中時任何點擊都被忽略
        /// - move_count 只在恰好兩張卡翻開時 +1
        /// - is_won 與「全部配對完成」同時成立
        #[test]
        fn prop_click_sequences_preserve_invariants(
            seed in any::<u64>(),
            clicks in proptest::collection::vec((0u32..20, any::<bool>()), 0..200),
        ) {
            let mut engine = new_engine(seed);
            let mut attempts = 0u32;

            for (card_id, resolve_after) in clicks {
                let locked_before = engine.run().unwrap().input_locked;
                let flipped_before = engine.run().unwrap().flipped.len();

                let outcome = engine.handle_card_click(card_id);

                if locked_before {
                    prop_assert_eq!(outcome, ClickOutcome::Ignored);
                }
                match outcome {
                    ClickOutcome::Matched | ClickOutcome::Cleared | ClickOutcome::Mismatched => {
                        prop_assert_eq!(flipped_before, 1);
                        attempts += 1;
                    }
                    ClickOutcome::FirstFlip => prop_assert_eq!(flipped_before, 0),
                    ClickOutcome::Ignored => {}
                }

                let run = engine.run().unwrap();
                prop_assert_eq!(run.move_count, attempts);
                prop_assert!(run.flipped.len() <= MAX_FLIPPED);
                let all_matched = run.deck.iter().all(|c| c.is_matched);
                prop_assert_eq!(run.is_won, all_matched);

                if resolve_after {
                    let generation = engine.generation();
                    engine.resolve_mismatch(generation);
                }
            }
        }
    }
}
