use std::sync::{Arc, Mutex};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use billsplit_shared::rpc::{
    AddChargeInput, AddChargeOutput, AddLineItemInput, AddLineItemOutput, AddTagInput,
    AddTagOutput, AddUserInput, AddUserOutput, BillIdInput, CreateBillInput, DeleteBillOutput,
    DeleteImageInput, Procedure, RemoveChargeInput, RemoveLineItemInput, RemoveTagInput,
    RemoveUserInput, RenameBillInput, UpdateChargeInput, UpdateLineItemInput, UploadImagesInput,
};
use billsplit_shared::split::{self, SplitSummary};
use billsplit_shared::{Bill, BillSummary, Image, LineItem, ProportionalCharge};
use billsplit_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::input::RpcInput;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config: Arc::new(config),
        }
    }

    /// Run a blocking store operation off the async runtime.
    async fn run<T, F>(&self, f: F) -> Result<T, ServerError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> billsplit_store::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let db = db
                .lock()
                .map_err(|_| ServerError::Internal("database mutex poisoned".into()))?;
            f(&db).map_err(ServerError::from)
        })
        .await
        .map_err(|e| ServerError::Internal(format!("database task failed: {e}")))?
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        // Queries
        .route(&Procedure::BillList.path(), get(bill_list))
        .route(&Procedure::BillGet.path(), get(bill_get))
        .route(&Procedure::BillGetImages.path(), get(bill_get_images))
        .route(&Procedure::BillSplit.path(), get(bill_split))
        // Bills
        .route(&Procedure::BillCreate.path(), post(bill_create))
        .route(&Procedure::BillRename.path(), post(bill_rename))
        .route(&Procedure::BillDelete.path(), post(bill_delete))
        // Images
        .route(&Procedure::BillUploadImages.path(), post(bill_upload_images))
        .route(&Procedure::BillDeleteImage.path(), post(bill_delete_image))
        // Users and tags
        .route(&Procedure::BillAddUser.path(), post(bill_add_user))
        .route(&Procedure::BillRemoveUser.path(), post(bill_remove_user))
        .route(&Procedure::BillAddTag.path(), post(bill_add_tag))
        .route(&Procedure::BillRemoveTag.path(), post(bill_remove_tag))
        // Line items
        .route(&Procedure::BillAddLineItem.path(), post(bill_add_line_item))
        .route(&Procedure::BillUpdateLineItem.path(), post(bill_update_line_item))
        .route(&Procedure::BillRemoveLineItem.path(), post(bill_remove_line_item))
        // Proportional charges
        .route(&Procedure::BillAddProportionalCharge.path(), post(bill_add_charge))
        .route(&Procedure::BillUpdateProportionalCharge.path(), post(bill_update_charge))
        .route(&Procedure::BillRemoveProportionalCharge.path(), post(bill_remove_charge))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ─── Queries ───

async fn bill_list(State(state): State<AppState>) -> Result<Json<Vec<BillSummary>>, ServerError> {
    let bills = state.run(|db| db.list_bill_summaries()).await?;
    Ok(Json(bills))
}

async fn bill_get(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<BillIdInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state.run(move |db| db.get_bill(input.id)).await?;
    Ok(Json(bill))
}

async fn bill_get_images(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<BillIdInput>,
) -> Result<Json<Option<Vec<Image>>>, ServerError> {
    let images = state.run(move |db| db.get_bill_images(input.id)).await?;
    Ok(Json(images))
}

async fn bill_split(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<BillIdInput>,
) -> Result<Json<Option<SplitSummary>>, ServerError> {
    let bill = state.run(move |db| db.get_bill(input.id)).await?;
    Ok(Json(bill.as_ref().map(split::summarize)))
}

// ─── Bills ───

async fn bill_create(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<CreateBillInput>,
) -> Result<Json<Bill>, ServerError> {
    let bill = state.run(move |db| db.create_bill(&input.name)).await?;
    info!(bill_id = %bill.id, "Bill created");
    Ok(Json(bill))
}

async fn bill_rename(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<RenameBillInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state.run(move |db| db.rename_bill(input.id, &input.name)).await?;
    Ok(Json(bill))
}

async fn bill_delete(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<BillIdInput>,
) -> Result<Json<DeleteBillOutput>, ServerError> {
    let id = input.id;
    let deleted = state.run(move |db| db.delete_bill(id)).await?;
    if deleted {
        info!(bill_id = %id, "Bill deleted");
    }
    Ok(Json(DeleteBillOutput { deleted }))
}

// ─── Images ───

async fn bill_upload_images(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<UploadImagesInput>,
) -> Result<Json<Option<Vec<Image>>>, ServerError> {
    let max_images = state.config.max_images_per_bill;
    let images = state
        .run(move |db| db.append_images(input.id, input.images, max_images))
        .await?;
    Ok(Json(images))
}

async fn bill_delete_image(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<DeleteImageInput>,
) -> Result<Json<Option<Vec<Image>>>, ServerError> {
    let images = state
        .run(move |db| db.remove_image(input.bill_id, input.image_id))
        .await?;
    Ok(Json(images))
}

// ─── Users and tags ───

async fn bill_add_user(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<AddUserInput>,
) -> Result<Json<Option<AddUserOutput>>, ServerError> {
    let out = state.run(move |db| db.add_user(input.bill_id, &input.name)).await?;
    Ok(Json(out))
}

async fn bill_remove_user(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<RemoveUserInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state
        .run(move |db| db.remove_user(input.bill_id, input.user_id))
        .await?;
    Ok(Json(bill))
}

async fn bill_add_tag(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<AddTagInput>,
) -> Result<Json<Option<AddTagOutput>>, ServerError> {
    let out = state.run(move |db| db.add_tag(input.bill_id, &input.name)).await?;
    Ok(Json(out))
}

async fn bill_remove_tag(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<RemoveTagInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state
        .run(move |db| db.remove_tag(input.bill_id, input.tag_id))
        .await?;
    Ok(Json(bill))
}

// ─── Line items ───

async fn bill_add_line_item(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<AddLineItemInput>,
) -> Result<Json<Option<AddLineItemOutput>>, ServerError> {
    let out = state
        .run(move |db| db.add_line_item(input.bill_id, input.line_item))
        .await?;
    Ok(Json(out))
}

async fn bill_update_line_item(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<UpdateLineItemInput>,
) -> Result<Json<Option<LineItem>>, ServerError> {
    let item = state
        .run(move |db| db.update_line_item(input.bill_id, input.line_item))
        .await?;
    Ok(Json(item))
}

async fn bill_remove_line_item(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<RemoveLineItemInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state
        .run(move |db| db.remove_line_item(input.bill_id, input.line_item_id))
        .await?;
    Ok(Json(bill))
}

// ─── Proportional charges ───

async fn bill_add_charge(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<AddChargeInput>,
) -> Result<Json<Option<AddChargeOutput>>, ServerError> {
    let out = state
        .run(move |db| db.add_charge(input.bill_id, input.charge))
        .await?;
    Ok(Json(out))
}

async fn bill_update_charge(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<UpdateChargeInput>,
) -> Result<Json<Option<ProportionalCharge>>, ServerError> {
    let charge = state
        .run(move |db| db.update_charge(input.bill_id, input.charge))
        .await?;
    Ok(Json(charge))
}

async fn bill_remove_charge(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<RemoveChargeInput>,
) -> Result<Json<Option<Bill>>, ServerError> {
    let bill = state
        .run(move |db| db.remove_charge(input.bill_id, input.charge_id))
        .await?;
    Ok(Json(bill))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
