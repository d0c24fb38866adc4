//! 玩家會話管理
//!
//! 每位玩家一個會話：配對引擎 + 進度記錄 + 種子化 RNG。
//! 所有引擎步驟都在會話鎖內同步執行；配對失敗的延遲蓋牌與
//! 進度儲存的 debounce 是 tokio 計時任務，分別以 generation 與
//! save epoch 檢查讓過期任務自動失效。儲存失敗只記日誌，
//! 不回滾記憶體狀態。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use hanmatch::proto;

use crate::game::catalog::{max_stage_id, stage_by_id, DEFAULT_AVATAR_ID};
use crate::game::constants::{MISMATCH_DELAY_MS, SAVE_DEBOUNCE_MS};
use crate::game::engine::{ClickOutcome, MatchEngine};
use crate::game::leaderboard::{Leaderboard, RankingEntry};
use crate::game::progress::{on_stage_cleared, ProgressRecord};
use crate::game::rewards;

use super::snapshot;
use super::storage::{BoardStore, ProgressStore};

/// 認證協作者提供的不透明身分；核心不驗證憑證
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
    pub active_avatar_id: String,
}

/// 開局被拒絕的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown stage {0}")]
    UnknownStage(u32),
    #[error("stage {0} is locked")]
    StageLocked(u32),
    #[error("stage {0} has no items")]
    EmptyStage(u32),
}

/// 單一玩家的會話狀態
pub struct PlayerSession {
    pub identity: Identity,
    pub engine: MatchEngine,
    pub progress: ProgressRecord,
    pub rng: StdRng,
    pub run_started_at: Option<Instant>,
    save_epoch: u64,
}

/// 會話註冊表 + 共享排行榜 + 儲存後端
pub struct SessionHub {
    sessions: DashMap<String, Arc<Mutex<PlayerSession>>>,
    leaderboard: Mutex<Leaderboard>,
    progress_store: Arc<dyn ProgressStore>,
    board_store: Arc<dyn BoardStore>,
}

fn lock(session: &Arc<Mutex<PlayerSession>>) -> MutexGuard<'_, PlayerSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// 配對失敗的延遲蓋牌任務；generation 不符時引擎端自動 no-op
fn schedule_mismatch_resolve(session: &Arc<Mutex<PlayerSession>>, generation: u64) {
    let session = Arc::clone(session);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(MISMATCH_DELAY_MS)).await;
        let mut s = lock(&session);
        s.engine.resolve_mismatch(generation);
    });
}

impl SessionHub {
    pub fn new(
        progress_store: Arc<dyn ProgressStore>,
        board_store: Arc<dyn BoardStore>,
    ) -> Arc<Self> {
        let board = match board_store.load() {
            Ok(entries) => Leaderboard::from_entries(entries),
            Err(err) => {
                tracing::warn!(%err, "ranking board load failed, starting empty");
                Leaderboard::new()
            }
        };

        Arc::new(Self {
            sessions: DashMap::new(),
            leaderboard: Mutex::new(board),
            progress_store,
            board_store,
        })
    }

    /// 取得（或建立）玩家會話；首次建立時載入持久化進度
    pub fn session(&self, identity: &Identity) -> Arc<Mutex<PlayerSession>> {
        if let Some(existing) = self.sessions.get(&identity.id) {
            return Arc::clone(existing.value());
        }

        let created = Arc::new(Mutex::new(self.new_session(identity)));
        match self.sessions.entry(identity.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Arc::clone(entry.get()),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&created));
                created
            }
        }
    }

    fn new_session(&self, identity: &Identity) -> PlayerSession {
        let mut progress = match self.progress_store.load(&identity.id) {
            Ok(Some(record)) => record,
            Ok(None) => ProgressRecord::new(),
            Err(err) => {
                // 載入失敗不阻擋遊玩，從預設進度開始
                tracing::warn!(player = %identity.id, %err, "progress load failed, starting fresh");
                ProgressRecord::new()
            }
        };
        progress.normalize();

        let mut identity = identity.clone();
        if !progress.owned_avatar_ids.contains(&identity.active_avatar_id) {
            identity.active_avatar_id = DEFAULT_AVATAR_ID.to_string();
        }

        tracing::debug!(player = %identity.id, "session created");

        PlayerSession {
            identity,
            engine: MatchEngine::new(),
            progress,
            rng: StdRng::from_entropy(),
            run_started_at: None,
            save_epoch: 0,
        }
    }

    /// 開新局
    ///
    /// 關卡必須存在、已解鎖且非空。seed 非 0 時重播種 RNG
    /// （可重現的測試對局）。
    pub fn start_run(
        &self,
        identity: &Identity,
        stage_id: u32,
        seed: u64,
    ) -> Result<proto::RunResponse, SessionError> {
        let stage = stage_by_id(stage_id).ok_or(SessionError::UnknownStage(stage_id))?;

        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        if !s.progress.unlocked_stage_ids.contains(&stage_id) {
            return Err(SessionError::StageLocked(stage_id));
        }
        if stage.items.is_empty() {
            return Err(SessionError::EmptyStage(stage_id));
        }

        if seed != 0 {
            s.rng = StdRng::seed_from_u64(seed);
        }
        s.engine.initialize_game(stage, &mut s.rng);
        s.run_started_at = Some(Instant::now());
        s.progress.current_stage_id = stage_id;
        self.schedule_save(&session_arc, s);

        Ok(snapshot::run_response(s))
    }

    /// 處理一次卡牌點擊
    ///
    /// 過關事件在同一個鎖內處理：推進進度、收錄排行榜、排程儲存。
    pub fn click_card(&self, identity: &Identity, card_id: u32) -> proto::ClickCardResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        let outcome = s.engine.handle_card_click(card_id);

        match outcome {
            ClickOutcome::Mismatched => {
                schedule_mismatch_resolve(&session_arc, s.engine.generation());
            }
            ClickOutcome::Cleared => {
                self.record_stage_clear(s);
                self.schedule_save(&session_arc, s);
            }
            _ => {}
        }

        snapshot::click_response(outcome, s)
    }

    /// 放棄當前對局
    pub fn abandon_run(&self, identity: &Identity) -> proto::ProgressResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        s.engine.reset();
        s.run_started_at = None;
        snapshot::progress_response(s)
    }

    pub fn progress(&self, identity: &Identity) -> proto::ProgressResponse {
        let session_arc = self.session(identity);
        let guard = lock(&session_arc);
        snapshot::progress_response(&guard)
    }

    /// 入帳金幣（外部協作者的獎勵來源，如測驗子系統）
    pub fn add_coins(&self, identity: &Identity, amount: i64) -> proto::ProgressResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        if rewards::add_coins(&mut s.progress, amount) > 0 {
            self.schedule_save(&session_arc, s);
        }
        snapshot::progress_response(s)
    }

    pub fn purchase_avatar(&self, identity: &Identity, avatar_id: &str) -> proto::ShopResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        let status = match rewards::purchase_avatar(&mut s.progress, avatar_id) {
            Ok(avatar) => {
                tracing::debug!(player = %s.identity.id, avatar = avatar.id, "avatar purchased");
                self.schedule_save(&session_arc, s);
                proto::ShopStatus::ShopOk
            }
            Err(err) => snapshot::shop_status(err),
        };
        snapshot::shop_response(status, s)
    }

    pub fn select_avatar(&self, identity: &Identity, avatar_id: &str) -> proto::ShopResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        let status = match rewards::select_avatar(
            &s.progress,
            &mut s.identity.active_avatar_id,
            avatar_id,
        ) {
            Ok(()) => proto::ShopStatus::ShopOk,
            Err(err) => snapshot::shop_status(err),
        };
        snapshot::shop_response(status, s)
    }

    pub fn mark_collection_viewed(
        &self,
        identity: &Identity,
        collection_id: &str,
    ) -> proto::ProgressResponse {
        let session_arc = self.session(identity);
        let mut guard = lock(&session_arc);
        let s = &mut *guard;

        if s.progress.mark_collection_viewed(collection_id) {
            self.schedule_save(&session_arc, s);
        }
        snapshot::progress_response(s)
    }

    pub fn ranking(&self, stage_id: u32, limit: u32) -> proto::GetRankingResponse {
        let board = self.leaderboard.lock().unwrap_or_else(|e| e.into_inner());
        snapshot::ranking_response(&board, stage_id, limit)
    }

    /// 過關事件：進度推進 + 排行榜收錄 + 排行榜立即持久化
    fn record_stage_clear(&self, s: &mut PlayerSession) {
        let (stage_id, move_count) = match s.engine.run() {
            Some(run) => (run.stage_id, run.move_count),
            None => return,
        };

        let newly_completed = on_stage_cleared(&mut s.progress, stage_id, max_stage_id());
        tracing::debug!(
            player = %s.identity.id,
            stage_id,
            move_count,
            newly_completed,
            "stage cleared"
        );

        let entry = RankingEntry {
            display_name: s.identity.display_name.clone(),
            stage_id,
            stage_name: stage_by_id(stage_id)
                .map(|stage| stage.name.to_string())
                .unwrap_or_default(),
            move_count,
            timestamp_ms: now_ms(),
            completion_time_secs: s
                .run_started_at
                .map(|started| started.elapsed().as_secs() as u32)
                .unwrap_or(0),
        };

        {
            let mut board = self.leaderboard.lock().unwrap_or_else(|e| e.into_inner());
            let rank = board.submit(entry);
            tracing::debug!(?rank, board_len = board.len(), "ranking entry submitted");
        }
        self.persist_board();
    }

    /// debounce 後儲存進度：較新的儲存任務讓舊任務失效
    fn schedule_save(&self, session_arc: &Arc<Mutex<PlayerSession>>, s: &mut PlayerSession) {
        s.save_epoch = s.save_epoch.wrapping_add(1);
        let epoch = s.save_epoch;
        let player_id = s.identity.id.clone();
        let store = Arc::clone(&self.progress_store);
        let session = Arc::clone(session_arc);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(SAVE_DEBOUNCE_MS)).await;
            let record = {
                let s = lock(&session);
                if s.save_epoch != epoch {
                    return;
                }
                s.progress.clone()
            };
            if let Err(err) = store.save(&player_id, &record) {
                // 失敗不回滾記憶體狀態，玩家的會話保持一致
                tracing::warn!(player = %player_id, %err, "progress save failed");
            }
        });
    }

    /// 排行榜持久化（fire-and-forget，容忍失敗；I/O 不在任何鎖內）
    fn persist_board(&self) {
        let entries: Vec<RankingEntry> = {
            let board = self.leaderboard.lock().unwrap_or_else(|e| e.into_inner());
            board.entries().to_vec()
        };
        let store = Arc::clone(&self.board_store);
        tokio::spawn(async move {
            if let Err(err) = store.save(&entries) {
                tracing::warn!(%err, "ranking board save failed");
            }
        });
    }
}
