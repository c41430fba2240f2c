use std::sync::Arc;

use aquaferme_api::LiveMessage;
use aquaferme_api::models::*;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use futures::{SinkExt, StreamExt};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::errors::{ApiError, IotError};
use crate::middlewares::{TokenState, auth};
use crate::models::{Device, User};
use crate::repositories::{BassinRepository, DeviceRepository};
use crate::services::{IotService, LiveRouter, MesureService, Permission, require_permission};

pub const DEVICE_KEY_HEADER: &str = "x-device-key";

#[derive(Clone)]
pub struct IotState {
    pub device_repository: Arc<DeviceRepository>,
    pub bassin_repository: Arc<BassinRepository>,
    pub iot_service: Arc<IotService>,
    pub mesure_service: Arc<MesureService>,
    pub live_router: Arc<LiveRouter>,
}

pub fn iot_router(iot_state: IotState, token_state: TokenState) -> Router {
    Router::new()
        .route("/api/iot/devices", get(get_devices).post(create_device))
        .route(
            "/api/iot/devices/:device_id",
            get(get_device_by_id).put(update_device).delete(delete_device),
        )
        .route("/api/iot/status", get(get_device_status))
        .route("/api/iot/ws", get(live_socket))
        .route_layer(middleware::from_fn_with_state(token_state, auth))
        .route("/api/iot/mesures", post(post_device_mesure))
        .route("/api/iot/heartbeat", post(post_heartbeat))
        .with_state(iot_state)
}

fn generate_device_key() -> String {
    Uuid::new_v4().simple().to_string()
}

impl IotState {
    async fn ensure_bassin(&self, bassin_id: Option<i32>) -> Result<(), ApiError> {
        if let Some(bassin_id) = bassin_id {
            self.bassin_repository
                .find_by_id(bassin_id)
                .await?
                .ok_or(IotError::InvalidRequest)?;
        }

        Ok(())
    }

    /// Resolves the device presenting the key header.
    async fn authenticate_device(&self, headers: &HeaderMap) -> Result<Device, ApiError> {
        let key = headers
            .get(DEVICE_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(IotError::MissingDeviceKey)?;

        match self.device_repository.find_by_key(key).await? {
            Some(device) => Ok(device),
            None => {
                tracing::warn!("rejected traffic with an unknown device key");
                Err(IotError::InvalidDeviceKey.into())
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/iot/devices",
    tag = "iot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registered devices", body = Vec<DeviceResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_devices(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let devices = state.device_repository.find_all().await?;

    Ok(Json(devices.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/iot/devices",
    tag = "iot",
    request_body = CreateDeviceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Device registered, the key is only shown once", body = DeviceKeyResponse),
        (status = 400, description = "Empty name or unknown bassin"),
        (status = 403, description = "Insufficient permission"),
        (status = 409, description = "Device name already exists")
    )
)]
pub async fn create_device(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
    Json(body): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceKeyResponse>), ApiError> {
    require_permission(user.role(), Permission::MANAGE_DEVICES)?;

    let nom = body.nom.trim().to_string();
    if nom.is_empty() {
        return Err(IotError::InvalidRequest.into());
    }

    if state.device_repository.find_by_name(&nom).await?.is_some() {
        return Err(IotError::DeviceNameExists.into());
    }

    state.ensure_bassin(body.bassin_id).await?;

    let mut device = Device {
        id: 0,
        nom,
        bassin_id: body.bassin_id,
        type_capteur: body.type_capteur,
        device_key: generate_device_key(),
        online: false,
        last_seen: None,
        created_at: OffsetDateTime::now_utc(),
    };

    let mut tx = state.device_repository.get_pool().begin().await?;

    device.id = state
        .device_repository
        .create(&device, &mut tx)
        .await
        .map_err(ApiError::unique_as(IotError::DeviceNameExists))?;

    tx.commit().await?;

    tracing::info!("device {} ({}) registered", device.id, device.nom);

    let device_key = device.device_key.clone();

    Ok((
        StatusCode::CREATED,
        Json(DeviceKeyResponse {
            device: device.into(),
            device_key,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/iot/devices/{device_id}",
    tag = "iot",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Successfully retrieved device", body = DeviceResponse),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device_by_id(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
    Path(device_id): Path<i32>,
) -> Result<Json<DeviceResponse>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(IotError::DeviceNotFound)?;

    Ok(Json(device.into()))
}

#[utoipa::path(
    put,
    path = "/api/iot/devices/{device_id}",
    tag = "iot",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    request_body = UpdateDeviceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Device updated, the new key is included when regenerated", body = DeviceKeyResponse),
        (status = 400, description = "Empty name or unknown bassin"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Device name already exists")
    )
)]
pub async fn update_device(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
    Path(device_id): Path<i32>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Result<Response, ApiError> {
    require_permission(user.role(), Permission::MANAGE_DEVICES)?;

    let mut device = state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(IotError::DeviceNotFound)?;

    if let Some(nom) = &body.nom {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(IotError::InvalidRequest.into());
        }
        if let Some(other) = state.device_repository.find_by_name(nom).await? {
            if other.id != device_id {
                return Err(IotError::DeviceNameExists.into());
            }
        }
        device.nom = nom.to_string();
    }

    if body.bassin_id.is_some() {
        state.ensure_bassin(body.bassin_id).await?;
        device.bassin_id = body.bassin_id;
    }

    device.type_capteur = body.type_capteur.or(device.type_capteur);

    if body.regenerate_key {
        device.device_key = generate_device_key();
    }

    let mut tx = state.device_repository.get_pool().begin().await?;

    state
        .device_repository
        .update(device_id, &device, &mut tx)
        .await
        .map_err(ApiError::unique_as(IotError::DeviceNameExists))?;

    tx.commit().await?;

    if body.regenerate_key {
        tracing::info!("device {} key regenerated by user {}", device_id, user.id);

        let device_key = device.device_key.clone();
        return Ok(Json(DeviceKeyResponse {
            device: device.into(),
            device_key,
        })
        .into_response());
    }

    Ok(Json(DeviceResponse::from(device)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/iot/devices/{device_id}",
    tag = "iot",
    params(
        ("device_id" = i32, Path, description = "Device ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Device deleted successfully"),
        (status = 403, description = "Insufficient permission"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn delete_device(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
    Path(device_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    require_permission(user.role(), Permission::MANAGE_DEVICES)?;

    state
        .device_repository
        .find_by_id(device_id)
        .await?
        .ok_or(IotError::DeviceNotFound)?;

    let mut tx = state.device_repository.get_pool().begin().await?;

    state.device_repository.delete(device_id, &mut tx).await?;

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/iot/mesures",
    tag = "iot",
    request_body = CreateMesureRequest,
    params(
        ("X-Device-Key" = String, Header, description = "Key issued at device registration")
    ),
    responses(
        (status = 201, description = "Reading stored for the device bassin", body = MesureResponse),
        (status = 400, description = "Empty reading or unassigned device"),
        (status = 401, description = "Missing or unknown device key")
    )
)]
pub async fn post_device_mesure(
    State(state): State<IotState>,
    headers: HeaderMap,
    Json(body): Json<CreateMesureRequest>,
) -> Result<(StatusCode, Json<MesureResponse>), ApiError> {
    let device = state.authenticate_device(&headers).await?;

    if body.is_empty() {
        return Err(IotError::EmptyMesure.into());
    }

    let bassin_id = device.bassin_id.ok_or(IotError::DeviceUnassigned)?;

    state.iot_service.touch(&device).await?;

    let (mesure, _) = state.mesure_service.record(bassin_id, &body).await?;

    Ok((StatusCode::CREATED, Json(mesure.into())))
}

#[utoipa::path(
    post,
    path = "/api/iot/heartbeat",
    tag = "iot",
    params(
        ("X-Device-Key" = String, Header, description = "Key issued at device registration")
    ),
    responses(
        (status = 200, description = "Device marked online", body = DeviceStatus),
        (status = 401, description = "Missing or unknown device key")
    )
)]
pub async fn post_heartbeat(
    State(state): State<IotState>,
    headers: HeaderMap,
) -> Result<Json<DeviceStatus>, ApiError> {
    let device = state.authenticate_device(&headers).await?;

    let device = state.iot_service.touch(&device).await?;

    Ok(Json(device.status()))
}

#[utoipa::path(
    get,
    path = "/api/iot/status",
    tag = "iot",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Presence of every device", body = Vec<DeviceStatus>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_device_status(
    Extension(user): Extension<User>,
    State(state): State<IotState>,
) -> Result<Json<Vec<DeviceStatus>>, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    let snapshot = state.iot_service.snapshot().await?;

    Ok(Json(snapshot))
}

#[utoipa::path(
    get,
    path = "/api/iot/ws",
    tag = "iot",
    params(
        ("token" = Option<String>, Query, description = "Bearer token for clients that cannot set headers")
    ),
    responses(
        (status = 101, description = "Switching to the live message stream", body = LiveMessage),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn live_socket(
    ws: WebSocketUpgrade,
    Extension(user): Extension<User>,
    State(state): State<IotState>,
) -> Result<Response, ApiError> {
    require_permission(user.role(), Permission::VIEW_FARM)?;

    // Subscribed before the snapshot so no change falls between the two.
    let (subscription_id, live_messages) = state.live_router.subscribe().await;

    let snapshot = match state.iot_service.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            state.live_router.unsubscribe(&subscription_id).await;
            return Err(e.into());
        }
    };

    Ok(ws.on_upgrade(move |socket| {
        handle_live_socket(socket, state, user, subscription_id, live_messages, snapshot)
    }))
}

async fn handle_live_socket(
    socket: WebSocket,
    state: IotState,
    user: User,
    subscription_id: String,
    mut live_messages: mpsc::UnboundedReceiver<LiveMessage>,
    snapshot: Vec<DeviceStatus>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<WsMessage>();

    tracing::info!("live socket {} opened by user {}", subscription_id, user.id);

    let send_task = tokio::spawn(async move {
        while let Some(message) = client_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    match LiveMessage::IotStatusSnapshot(snapshot).to_json() {
        Ok(json) => {
            let _ = client_tx.send(WsMessage::Text(json));
        }
        Err(e) => tracing::error!("failed to encode status snapshot: {}", e),
    }

    let broadcast_tx = client_tx.clone();
    let broadcast_task = tokio::spawn(async move {
        while let Some(message) = live_messages.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("failed to encode {} message: {}", message.kind(), e);
                    continue;
                }
            };

            if broadcast_tx.send(WsMessage::Text(json)).is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(WsMessage::Close(_)) => break,
            Err(e) => {
                tracing::warn!("live socket {} error: {}", subscription_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    broadcast_task.abort();
    state.live_router.unsubscribe(&subscription_id).await;

    tracing::info!("live socket {} closed", subscription_id);
}
