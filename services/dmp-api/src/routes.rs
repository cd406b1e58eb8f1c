//! HTTP handlers for the admin/data-plane edge (§6.2).
//!
//! Grounded on `api/api.go`'s `URLSchema` dispatch table, reimplemented as
//! an `axum::Router` in the style of `server::http::*`:
//! one async fn per route, `State<AppState>` for shared state, `Bytes` for
//! raw message bodies.

use crate::dto::{Member, Members, ResultEnvelope, ServiceRegistration};
use crate::response::{bad_request, error_response};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Bytes};

pub async fn list_all_members(State(state): State<AppState>) -> impl IntoResponse {
    let members: Vec<Member> = state.router.list_all_members().await.iter().map(Member::from).collect();
    Json(Members { members })
}

pub async fn list_members(State(state): State<AppState>, Path(namespace): Path<String>) -> impl IntoResponse {
    let members: Vec<Member> = state.router.list_members(&namespace).await.iter().map(Member::from).collect();
    Json(Members { members })
}

pub async fn service_register(State(state): State<AppState>, body: Bytes) -> Response {
    let registration: ServiceRegistration = match serde_json::from_slice(&body) {
        Ok(registration) => registration,
        Err(err) => return bad_request(format!("invalid registration body: {err}")),
    };

    match state.router.service_register(&registration.namespace, registration.contact_point).await {
        Ok(service) => Json(Member::from(&service)).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn service_unregister(State(state): State<AppState>, Path(_namespace): Path<String>) -> impl IntoResponse {
    let result = state.router.service_unregister().await;
    Json(ResultEnvelope { result })
}

pub async fn subscribe_topic(State(state): State<AppState>, Path(topic): Path<String>) -> impl IntoResponse {
    let result = state.router.subscribe_topic(&topic).await;
    Json(ResultEnvelope { result })
}

pub async fn unsubscribe_topic(State(state): State<AppState>, Path(topic): Path<String>) -> impl IntoResponse {
    let result = state.router.unsubscribe_topic(&topic).await;
    Json(ResultEnvelope { result })
}

pub async fn request(State(state): State<AppState>, Path(namespace): Path<String>, body: Bytes) -> Response {
    match state.router.request(&namespace, body.to_vec()).await {
        Ok(reply) => (StatusCode::OK, reply).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn publish(State(state): State<AppState>, Path(topic): Path<String>, body: Bytes) -> Response {
    match state.router.publish(&topic, body.to_vec()).await {
        Ok(reply) => (StatusCode::OK, reply).into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn notificate(State(state): State<AppState>, Path(namespace): Path<String>, body: Bytes) -> Response {
    match state.router.notificate(&namespace, body.to_vec()).await {
        Ok(ack) => (StatusCode::OK, ack).into_response(),
        Err(err) => error_response(&err),
    }
}
