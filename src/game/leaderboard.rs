//! 排行榜收錄
//!
//! 有界（50 名）、依嘗試次數升冪的排名表。平手依收錄順序
//! （穩定排序），completion_time 只是顯示欄位，不參與排序。

use serde::{Deserialize, Serialize};

use super::constants::{LEADERBOARD_CAP, MEDAL_RANKS};

/// 一筆過關成績，收錄後不再修改
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub display_name: String,
    pub stage_id: u32,
    pub stage_name: String,
    pub move_count: u32,
    pub timestamp_ms: i64,
    #[serde(default)]
    pub completion_time_secs: u32,
}

/// 排行榜
#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<RankingEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從儲存後端載入的資料重建排行榜，套用同一套排序與上限
    /// （外部資料可能超額或失序）。
    pub fn from_entries(mut entries: Vec<RankingEntry>) -> Self {
        entries.sort_by_key(|e| e.move_count);
        entries.truncate(LEADERBOARD_CAP);
        Self { entries }
    }

    /// 收錄一筆成績：追加、穩定排序、裁到上限
    ///
    /// 回傳收錄後的名次（0-based）；被裁掉（超出第 50 名）時回傳
    /// None，該成績永久捨棄。
    pub fn submit(&mut self, entry: RankingEntry) -> Option<usize> {
        let move_count = entry.move_count;
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.move_count);

        // 穩定排序讓新成績排在同 move_count 的最後
        let position = self
            .entries
            .iter()
            .rposition(|e| e.move_count == move_count)
            .unwrap_or(self.entries.len() - 1);

        self.entries.truncate(LEADERBOARD_CAP);

        (position < LEADERBOARD_CAP).then_some(position)
    }

    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// 指定關卡的成績（保持榜內順序）
    pub fn for_stage(&self, stage_id: u32) -> Vec<&RankingEntry> {
        self.entries
            .iter()
            .filter(|e| e.stage_id == stage_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 前三名的獎牌，名次（1-based）的純顯示推導
pub fn medal_for_rank(rank: u32) -> Option<&'static str> {
    if rank == 0 || rank > MEDAL_RANKS {
        return None;
    }
    match rank {
        1 => Some("🥇"),
        2 => Some("🥈"),
        _ => Some("🥉"),
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str, move_count: u32) -> RankingEntry {
        RankingEntry {
            display_name: name.to_string(),
            stage_id: 1,
            stage_name: "한국 문화".to_string(),
            move_count,
            timestamp_ms: 0,
            completion_time_secs: 0,
        }
    }

    #[test]
    fn test_sorted_ascending_by_move_count() {
        let mut board = Leaderboard::new();
        board.submit(entry("a", 20));
        board.submit(entry("b", 8));
        board.submit(entry("c", 12));

        let moves: Vec<u32> = board.entries().iter().map(|e| e.move_count).collect();
        assert_eq!(moves, vec![8, 12, 20]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut board = Leaderboard::new();
        board.submit(entry("first", 10));
        board.submit(entry("second", 10));
        board.submit(entry("third", 10));

        let names: Vec<&str> = board.entries().iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_completion_time_never_ranks() {
        let mut board = Leaderboard::new();
        let mut slow = entry("slow-clock", 10);
        slow.completion_time_secs = 999;
        let mut fast = entry("fast-clock", 10);
        fast.completion_time_secs = 1;

        board.submit(slow);
        board.submit(fast);

        // 同 move_count 時仍依收錄順序，不看 completion_time
        assert_eq!(board.entries()[0].display_name, "slow-clock");
    }

    #[test]
    fn test_bounded_at_cap_keeps_lowest() {
        let mut board = Leaderboard::new();
        // 51 筆嚴格遞增的成績：最高的一筆被捨棄
        for n in 1..=51u32 {
            board.submit(entry(&format!("p{}", n), n));
        }

        assert_eq!(board.len(), LEADERBOARD_CAP);
        assert_eq!(board.entries().first().unwrap().move_count, 1);
        assert_eq!(board.entries().last().unwrap().move_count, 50);
        assert!(board.entries().iter().all(|e| e.move_count <= 50));
    }

    #[test]
    fn test_submit_reports_rank_or_none() {
        let mut board = Leaderboard::new();
        assert_eq!(board.submit(entry("a", 5)), Some(0));
        assert_eq!(board.submit(entry("b", 3)), Some(0));
        assert_eq!(board.submit(entry("c", 5)), Some(2));

        for n in 0..50u32 {
            board.submit(entry(&format!("p{}", n), 1));
        }
        // 榜已滿且全是更好的成績：新的最差成績進不了榜
        assert_eq!(board.submit(entry("late", 100)), None);
        assert_eq!(board.len(), LEADERBOARD_CAP);
    }

    #[test]
    fn test_for_stage_filters() {
        let mut board = Leaderboard::new();
        board.submit(entry("a", 9));
        let mut other = entry("b", 7);
        other.stage_id = 2;
        board.submit(other);

        let stage_one = board.for_stage(1);
        assert_eq!(stage_one.len(), 1);
        assert_eq!(stage_one[0].display_name, "a");
    }

    #[test]
    fn test_from_entries_reapplies_order_and_cap() {
        let raw: Vec<RankingEntry> = (0..60u32).rev().map(|n| entry(&format!("p{}", n), n + 1)).collect();
        let board = Leaderboard::from_entries(raw);

        assert_eq!(board.len(), LEADERBOARD_CAP);
        assert_eq!(board.entries().first().unwrap().move_count, 1);
    }

    #[test]
    fn test_medals_for_top_three_only() {
        assert_eq!(medal_for_rank(1), Some("🥇"));
        assert_eq!(medal_for_rank(2), Some("🥈"));
        assert_eq!(medal_for_rank(3), Some("🥉"));
        assert_eq!(medal_for_rank(0), None);
        assert_eq!(medal_for_rank(4), None);
    }

    proptest! {
        /// 任意收錄序列後：長度 ≤ 50、升冪排序、保留的是最小的成績
        #[test]
        fn prop_board_bounded_and_sorted(move_counts in proptest::collection::vec(1u32..500, 0..120)) {
            let mut board = Leaderboard::new();
            for (i, &n) in move_counts.iter().enumerate() {
                board.submit(entry(&format!("p{}", i), n));
            }

            prop_assert!(board.len() <= LEADERBOARD_CAP);
            prop_assert!(board.entries().windows(2).all(|w| w[0].move_count <= w[1].move_count));

            let mut expected = move_counts.clone();
            expected.sort_unstable();
            expected.truncate(LEADERBOARD_CAP);
            let kept: Vec<u32> = board.entries().iter().map(|e| e.move_count).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
