//! Axum routes for the custom-fields admin API.
//!
//! Each route resolves the current user from request headers, runs the
//! controller action, and turns the [`ControllerResponse`] into a JSON
//! render payload or a `303 See Other` redirect. Flash messages collected
//! during the action are drained into the response body.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use worktrack_core::error::WorktrackResult;
use worktrack_core::settings::Settings;

use crate::auth::CurrentUser;
use crate::controller::{ControllerResponse, CustomFieldsController, RequestContext};
use crate::params::CustomFieldParams;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AdminState {
    /// The controller handling all actions.
    pub controller: Arc<CustomFieldsController>,
}

/// Builds the admin router for custom fields.
pub fn custom_fields_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/custom_fields", get(index).post(create))
        .route("/admin/custom_fields/new/{type}", get(new_form))
        .route("/admin/custom_fields/{id}/edit", get(edit))
        .route("/admin/custom_fields/{id}", post(update))
        .route("/admin/custom_fields/{id}/delete", post(destroy))
        .route(
            "/admin/custom_fields/{id}/options/{option_id}/delete",
            post(delete_option),
        )
        .with_state(state)
}

/// Binds the listen address from settings and serves the router.
pub async fn serve(settings: &Settings, router: Router) -> WorktrackResult<()> {
    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    tracing::info!(addr = %settings.listen_addr, "admin API listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct IndexQuery {
    tab: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BackQuery {
    back_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatePayload {
    /// The requested subtype tag (e.g. "ProjectCustomField").
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    custom_field: CustomFieldParams,
}

#[derive(Debug, Deserialize)]
struct UpdatePayload {
    #[serde(default)]
    custom_field: CustomFieldParams,
}

/// Resolves the current user from request headers.
///
/// Authentication happens upstream; the headers carry its result.
fn current_user(headers: &HeaderMap) -> CurrentUser {
    let name = headers
        .get("x-worktrack-user")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous");
    let admin = headers
        .get("x-worktrack-admin")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "1");
    if admin {
        CurrentUser::admin(name)
    } else {
        CurrentUser::regular(name)
    }
}

/// Turns a controller response and the drained flash into an HTTP response.
fn respond(response: ControllerResponse, ctx: &mut RequestContext) -> Response {
    let flash = ctx.flash.drain();
    match response {
        ControllerResponse::Index(view) => (
            StatusCode::OK,
            Json(json!({"view": "index", "data": view, "flash": flash})),
        )
            .into_response(),
        ControllerResponse::NewForm(view) => (
            StatusCode::OK,
            Json(json!({"view": "new", "data": view, "flash": flash})),
        )
            .into_response(),
        ControllerResponse::EditForm(view) => (
            StatusCode::OK,
            Json(json!({"view": "edit", "data": view, "flash": flash})),
        )
            .into_response(),
        ControllerResponse::Redirect(location) => (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, location)],
            Json(json!({"flash": flash})),
        )
            .into_response(),
        ControllerResponse::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Not found"})),
        )
            .into_response(),
        ControllerResponse::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Forbidden"})),
        )
            .into_response(),
    }
}

async fn index(
    State(state): State<AdminState>,
    Query(query): Query<IndexQuery>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state.controller.index(&mut ctx, query.tab.as_deref()).await;
    respond(response, &mut ctx)
}

async fn new_form(
    State(state): State<AdminState>,
    Path(type_tag): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state.controller.new_form(&mut ctx, &type_tag).await;
    respond(response, &mut ctx)
}

async fn create(
    State(state): State<AdminState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePayload>,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state
        .controller
        .create(&mut ctx, &payload.field_type, payload.custom_field)
        .await;
    respond(response, &mut ctx)
}

async fn edit(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state.controller.edit(&mut ctx, id).await;
    respond(response, &mut ctx)
}

async fn update(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    Query(query): Query<BackQuery>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePayload>,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    if let Some(back_url) = query.back_url {
        ctx = ctx.with_back_url(back_url);
    }
    let response = state
        .controller
        .update(&mut ctx, id, payload.custom_field)
        .await;
    respond(response, &mut ctx)
}

async fn destroy(
    State(state): State<AdminState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state.controller.destroy(&mut ctx, id).await;
    respond(response, &mut ctx)
}

async fn delete_option(
    State(state): State<AdminState>,
    Path((id, option_id)): Path<(u64, u64)>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = RequestContext::new(current_user(&headers));
    let response = state.controller.delete_option(&mut ctx, id, option_id).await;
    respond(response, &mut ctx)
}
