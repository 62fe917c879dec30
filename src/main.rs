use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Json,
    routing::{get, post, put},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use wtr_core::{
    Comment, CommentStore, Composition, CoreConfig, FlatQuestion, QuestionnaireService,
    ReviewError, export_rows, flatten, write_csv,
};

/// Application state shared across REST API handlers
///
/// Holds the cached questionnaire compiler and the comment store; both are
/// cheap clones over shared interior state.
#[derive(Clone)]
struct AppState {
    questionnaire: QuestionnaireService,
    comments: CommentStore,
}

/// Health check response body
#[derive(serde::Serialize, ToSchema)]
struct HealthRes {
    ok: bool,
    message: String,
}

/// Request body for adding a comment to a question
#[derive(serde::Deserialize, ToSchema)]
struct AddCommentReq {
    path: String,
    #[serde(default)]
    author_name: String,
    text: String,
    #[serde(default)]
    parent_id: Option<Uuid>,
}

/// Request body for replacing a comment's text
#[derive(serde::Deserialize, ToSchema)]
struct UpdateCommentReq {
    text: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_questionnaire,
        invalidate_questionnaire,
        list_questions,
        get_comments,
        add_comment,
        update_comment,
        export_comments_csv
    ),
    components(schemas(
        HealthRes,
        Comment,
        FlatQuestion,
        AddCommentReq,
        UpdateCommentReq
    ))
)]
struct ApiDoc;

/// Main entry point for the review-form server
///
/// Serves the compiled questionnaire and the comment API over REST on port
/// 3000 (configurable via WTR_REST_ADDR).
///
/// # Environment Variables
/// - `WTR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WTR_TEMPLATE_PATH`: Web template JSON file (default: "templates/template.json")
/// - `WTR_DATA_DIR`: Directory for the comment store (default: "review_data")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("wtr=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WTR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let template_path =
        std::env::var("WTR_TEMPLATE_PATH").unwrap_or_else(|_| "templates/template.json".into());
    let data_dir = std::env::var("WTR_DATA_DIR").unwrap_or_else(|_| "review_data".into());

    let config = CoreConfig::new(PathBuf::from(template_path), PathBuf::from(data_dir))?;
    let questionnaire = QuestionnaireService::new(&config);
    let comments = CommentStore::open(&config)?;

    tracing::info!("++ Starting review-form REST on {}", rest_addr);
    tracing::info!("++ Serving template {}", config.template_path().display());

    let app = Router::new()
        .route("/health", get(health))
        .route("/questionnaire", get(get_questionnaire))
        .route("/questionnaire/invalidate", post(invalidate_questionnaire))
        .route("/questions", get(list_questions))
        .route("/comments/by-path/*path", get(get_comments))
        .route("/comments", post(add_comment))
        .route("/comments/:id", put(update_comment))
        .route("/export/comments.csv", get(export_comments_csv))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            questionnaire,
            comments,
        });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Maps store and compile errors onto HTTP statuses; anything unexpected is
/// logged and reported as a 500.
fn error_status(err: ReviewError) -> (StatusCode, &'static str) {
    match err {
        ReviewError::EmptyCommentText | ReviewError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "Invalid request")
        }
        ReviewError::UnknownComment(_) => (StatusCode::NOT_FOUND, "No such comment"),
        other => {
            tracing::error!("Request failed: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "review-form service is running".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/questionnaire",
    responses(
        (status = 200, description = "The compiled question tree")
    )
)]
/// The compiled questionnaire for the configured template
///
/// Served from cache after the first compile. A missing or malformed
/// template file still returns 200, with an empty composition whose name
/// states the problem.
async fn get_questionnaire(State(state): State<AppState>) -> Json<Arc<Composition>> {
    Json(state.questionnaire.get_or_compile())
}

#[utoipa::path(
    post,
    path = "/questionnaire/invalidate",
    responses(
        (status = 204, description = "Cache cleared, next request recompiles")
    )
)]
/// Drop the cached questionnaire after the template file changes
async fn invalidate_questionnaire(State(state): State<AppState>) -> StatusCode {
    state.questionnaire.invalidate();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/questions",
    responses(
        (status = 200, description = "Flat list of answerable questions", body = [FlatQuestion])
    )
)]
/// Flat index of every answerable question, choices expanded
async fn list_questions(State(state): State<AppState>) -> Json<Vec<FlatQuestion>> {
    Json(flatten(&state.questionnaire.get_or_compile()))
}

#[utoipa::path(
    get,
    path = "/comments/by-path/{path}",
    params(("path" = String, Path, description = "Question path the comments attach to")),
    responses(
        (status = 200, description = "Comments for the question, oldest first", body = [Comment])
    )
)]
/// Comments attached to one question path
async fn get_comments(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Json<Vec<Comment>> {
    Json(state.comments.for_path(&path))
}

#[utoipa::path(
    post,
    path = "/comments",
    request_body = AddCommentReq,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Blank text or path"),
        (status = 500, description = "Internal server error")
    )
)]
/// Attach a new comment to a question
async fn add_comment(
    State(state): State<AppState>,
    Json(req): Json<AddCommentReq>,
) -> Result<(StatusCode, Json<Comment>), (StatusCode, &'static str)> {
    match state
        .comments
        .add(&req.path, &req.author_name, &req.text, req.parent_id)
    {
        Ok(comment) => Ok((StatusCode::CREATED, Json(comment))),
        Err(err) => Err(error_status(err)),
    }
}

#[utoipa::path(
    put,
    path = "/comments/{id}",
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = UpdateCommentReq,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 400, description = "Blank text"),
        (status = 404, description = "No such comment"),
        (status = 500, description = "Internal server error")
    )
)]
/// Replace the text of an existing comment
async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCommentReq>,
) -> Result<Json<Comment>, (StatusCode, &'static str)> {
    match state.comments.update(id, &req.text) {
        Ok(comment) => Ok(Json(comment)),
        Err(err) => Err(error_status(err)),
    }
}

#[utoipa::path(
    get,
    path = "/export/comments.csv",
    responses(
        (status = 200, description = "CSV of every question with its comments"),
        (status = 500, description = "Internal server error")
    )
)]
/// Download every question and its collected comments as CSV
async fn export_comments_csv(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 2], String), (StatusCode, &'static str)> {
    let questions = flatten(&state.questionnaire.get_or_compile());
    let rows = export_rows(&questions, &state.comments);
    match write_csv(&rows) {
        Ok(csv) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"comments_export.csv\"",
                ),
            ],
            csv,
        )),
        Err(err) => Err(error_status(err)),
    }
}
