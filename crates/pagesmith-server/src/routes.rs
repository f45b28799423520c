//! HTTP routes
//!
//! JSON in, JSON out. Successful generation and editing return the
//! [`ProviderResult`] envelope verbatim; failures return
//! `{"error": message, "backend": "remote"}` with the status from
//! [`ProviderError::status_code`]. Project endpoints wrap records as
//! `{"project": …}` / `{"projects": […]}` and answer unknown or
//! malformed ids with a 404 envelope.

use pagesmith_provider::{Orchestrator, Policy, ProviderError, RequestCoalescer};
use pagesmith_store::{NewProject, ProjectId, ProjectStore, ProjectUpdate, StoreError};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub coalescer: Arc<RequestCoalescer>,
    pub store: Arc<dyn ProjectStore>,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    policy: Policy,
}

#[derive(Debug, Deserialize)]
struct EditRequest {
    document: String,
    instruction: String,
    #[serde(default)]
    policy: Policy,
}

/// The complete route tree under `/api`.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let generate = warp::path!("api" / "generate")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handle_generate);

    let edit = warp::path!("api" / "edit")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handle_edit);

    let create_project = warp::path!("api" / "projects")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handle_create_project);

    let list_projects = warp::path!("api" / "projects")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_list_projects);

    let get_project = warp::path!("api" / "projects" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_get_project);

    let update_project = warp::path!("api" / "projects" / String)
        .and(warp::post())
        .and(json_body())
        .and(with_state(state))
        .and_then(handle_update_project);

    generate
        .or(edit)
        .or(create_project)
        .or(list_projects)
        .or(get_project)
        .or(update_project)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn with_state(
    state: AppState,
) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(1024 * 1024).and(warp::body::json())
}

async fn handle_generate(
    body: GenerateRequest,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let key = RequestCoalescer::key(&body.prompt, body.policy);
    let orchestrator = state.orchestrator.clone();
    let prompt = body.prompt;
    let policy = body.policy;

    let outcome = state
        .coalescer
        .run(key, move || async move {
            orchestrator.generate(&prompt, policy).await
        })
        .await;

    Ok(match outcome {
        Ok(result) => json_with_status(&result, StatusCode::OK),
        Err(e) => error_reply(&e),
    })
}

async fn handle_edit(body: EditRequest, state: AppState) -> Result<impl Reply, Infallible> {
    let outcome = state
        .orchestrator
        .edit(&body.document, &body.instruction, body.policy)
        .await;

    Ok(match outcome {
        Ok(result) => json_with_status(&result, StatusCode::OK),
        Err(e) => error_reply(&e),
    })
}

async fn handle_create_project(
    body: NewProject,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let record = state.store.create(body).await;
    Ok(json_with_status(
        &serde_json::json!({"project": record}),
        StatusCode::CREATED,
    ))
}

async fn handle_list_projects(state: AppState) -> Result<impl Reply, Infallible> {
    let records = state.store.list().await;
    Ok(json_with_status(
        &serde_json::json!({"projects": records}),
        StatusCode::OK,
    ))
}

async fn handle_get_project(id: String, state: AppState) -> Result<impl Reply, Infallible> {
    let Ok(id) = id.parse::<ProjectId>() else {
        return Ok(not_found(&id_message(&id)));
    };
    Ok(match state.store.get(id).await {
        Some(record) => json_with_status(&serde_json::json!({"project": record}), StatusCode::OK),
        None => not_found(&StoreError::NotFound(id).to_string()),
    })
}

async fn handle_update_project(
    id: String,
    body: ProjectUpdate,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let Ok(id) = id.parse::<ProjectId>() else {
        return Ok(not_found(&id_message(&id)));
    };
    Ok(match state.store.update(id, body).await {
        Ok(record) => json_with_status(&serde_json::json!({"project": record}), StatusCode::OK),
        Err(e @ StoreError::NotFound(_)) => not_found(&e.to_string()),
    })
}

fn json_with_status<T: serde::Serialize>(
    value: &T,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(err: &ProviderError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    tracing::warn!(status = status.as_u16(), error = %err, "request failed");
    json_with_status(
        &serde_json::json!({"error": err.to_string(), "backend": "remote"}),
        status,
    )
}

fn not_found(message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    json_with_status(&serde_json::json!({"error": message}), StatusCode::NOT_FOUND)
}

fn id_message(raw: &str) -> String {
    format!("no project with id {raw}")
}

/// Map framework rejections into the same JSON envelope the handlers use.
async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if rejection
        .find::<warp::reject::MethodNotAllowed>()
        .is_some()
    {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "body too large".to_string())
    } else {
        tracing::error!(?rejection, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };
    Ok(json_with_status(
        &serde_json::json!({"error": message}),
        status,
    ))
}
