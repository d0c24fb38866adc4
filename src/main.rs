use std::env;
use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing_subscriber::EnvFilter;

use hanmatch::proto::han_match_server::{HanMatch, HanMatchServer};
use hanmatch::proto::{
    AbandonRunRequest, AddCoinsRequest, ClickCardRequest, ClickCardResponse, GetCatalogRequest,
    GetCatalogResponse, GetProgressRequest, GetRankingRequest, GetRankingResponse,
    MarkCollectionViewedRequest, ProgressResponse, PurchaseAvatarRequest, RunResponse,
    SelectAvatarRequest, ShopResponse, StartRunRequest,
};

// 遊戲核心模組
mod game;
mod service;

use service::session::{Identity, SessionError, SessionHub};
use service::snapshot;
use service::storage::{BoardStore, JsonFileStore, MemoryStore, ProgressStore};

// ============================================================================
// gRPC 服務
// ============================================================================

struct HanMatchService {
    hub: Arc<SessionHub>,
}

/// 每個請求都帶不透明身分；缺漏視為呼叫端錯誤
fn identity_from(identity: Option<hanmatch::proto::Identity>) -> Result<Identity, Status> {
    let identity = identity.ok_or_else(|| Status::invalid_argument("identity is required"))?;
    if identity.id.is_empty() {
        return Err(Status::invalid_argument("identity.id is required"));
    }
    Ok(Identity {
        id: identity.id,
        display_name: identity.display_name,
        active_avatar_id: identity.active_avatar_id,
    })
}

fn session_status(err: SessionError) -> Status {
    match err {
        SessionError::UnknownStage(_) => Status::not_found(err.to_string()),
        SessionError::StageLocked(_) | SessionError::EmptyStage(_) => {
            Status::failed_precondition(err.to_string())
        }
    }
}

#[tonic::async_trait]
impl HanMatch for HanMatchService {
    async fn get_catalog(
        &self,
        _request: Request<GetCatalogRequest>,
    ) -> Result<Response<GetCatalogResponse>, Status> {
        Ok(Response::new(snapshot::catalog_response()))
    }

    async fn get_progress(
        &self,
        request: Request<GetProgressRequest>,
    ) -> Result<Response<ProgressResponse>, Status> {
        let identity = identity_from(request.into_inner().identity)?;
        Ok(Response::new(self.hub.progress(&identity)))
    }

    async fn start_run(
        &self,
        request: Request<StartRunRequest>,
    ) -> Result<Response<RunResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        let response = self
            .hub
            .start_run(&identity, req.stage_id, req.seed)
            .map_err(session_status)?;
        Ok(Response::new(response))
    }

    async fn click_card(
        &self,
        request: Request<ClickCardRequest>,
    ) -> Result<Response<ClickCardResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        Ok(Response::new(self.hub.click_card(&identity, req.card_id)))
    }

    async fn abandon_run(
        &self,
        request: Request<AbandonRunRequest>,
    ) -> Result<Response<ProgressResponse>, Status> {
        let identity = identity_from(request.into_inner().identity)?;
        Ok(Response::new(self.hub.abandon_run(&identity)))
    }

    async fn add_coins(
        &self,
        request: Request<AddCoinsRequest>,
    ) -> Result<Response<ProgressResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        Ok(Response::new(self.hub.add_coins(&identity, req.amount)))
    }

    async fn purchase_avatar(
        &self,
        request: Request<PurchaseAvatarRequest>,
    ) -> Result<Response<ShopResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        Ok(Response::new(
            self.hub.purchase_avatar(&identity, &req.avatar_id),
        ))
    }

    async fn select_avatar(
        &self,
        request: Request<SelectAvatarRequest>,
    ) -> Result<Response<ShopResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        Ok(Response::new(
            self.hub.select_avatar(&identity, &req.avatar_id),
        ))
    }

    async fn mark_collection_viewed(
        &self,
        request: Request<MarkCollectionViewedRequest>,
    ) -> Result<Response<ProgressResponse>, Status> {
        let req = request.into_inner();
        let identity = identity_from(req.identity)?;
        Ok(Response::new(
            self.hub.mark_collection_viewed(&identity, &req.collection_id),
        ))
    }

    async fn get_ranking(
        &self,
        request: Request<GetRankingRequest>,
    ) -> Result<Response<GetRankingResponse>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.hub.ranking(req.stage_id, req.limit)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = env::var("HANMATCH_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:50051".to_string())
        .parse()?;
    let data_dir = env::var("HANMATCH_DATA_DIR").unwrap_or_else(|_| "data".to_string());

    // ":memory:" 跳過磁碟持久化（訪客/展示模式）
    let (progress_store, board_store): (Arc<dyn ProgressStore>, Arc<dyn BoardStore>) =
        if data_dir == ":memory:" {
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        } else {
            let store = Arc::new(JsonFileStore::new(&data_dir)?);
            (store.clone(), store)
        };
    let hub = SessionHub::new(progress_store, board_store);

    tracing::info!(%addr, %data_dir, "HanMatch gRPC server listening");

    tonic::transport::Server::builder()
        .add_service(HanMatchServer::new(HanMatchService { hub }))
        .serve(addr)
        .await?;

    Ok(())
}
