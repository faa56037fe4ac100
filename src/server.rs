use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;

use crate::assets::Fetch;
use crate::config::BODY_LIMIT;
use crate::error::ReportResult;
use crate::plan::LayoutPlan;
use crate::record::{FieldRecord, Submission};
use crate::render::{RenderedDocument, Reporter};
use crate::transport::ReportPayload;

const INDEX_HTML: &str = include_str!("../static/index.html");

pub struct AppState<F> {
    pub reporter: Reporter<F>,
    pub plan: &'static LayoutPlan,
}

#[derive(Serialize)]
struct Status {
    status: String,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_status() -> Json<Status> {
    Json(Status {
        status: "ok".to_string(),
    })
}

async fn render_submission<F: Fetch>(
    state: &AppState<F>,
    raw: Submission,
) -> ReportResult<(FieldRecord, RenderedDocument)> {
    let record = FieldRecord::try_from(raw)?;
    let document = state
        .reporter
        .render(&record, state.plan, OffsetDateTime::now_utc())
        .await?;
    Ok((record, document))
}

async fn submit_report<F: Fetch + 'static>(
    State(state): State<Arc<AppState<F>>>,
    Form(raw): Form<Submission>,
) -> ReportResult<Json<ReportPayload>> {
    let (record, document) = render_submission(&state, raw).await?;
    Ok(Json(ReportPayload::new(record.file_name(), &document)))
}

async fn download_report<F: Fetch + 'static>(
    State(state): State<Arc<AppState<F>>>,
    Form(raw): Form<Submission>,
) -> ReportResult<impl IntoResponse> {
    let (record, document) = render_submission(&state, raw).await?;
    let disposition = format!("attachment; filename=\"{}\"", record.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.to_bytes(),
    ))
}

pub fn router<F: Fetch + 'static>(state: Arc<AppState<F>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(get_status))
        .route("/api/report", post(submit_report::<F>))
        .route("/api/report.pdf", post(download_report::<F>))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
