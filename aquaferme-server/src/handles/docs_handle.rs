use aquaferme_api::LiveMessage;
use aquaferme_api::models::*;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::*;

#[derive(OpenApi)]
#[openapi(
    info(title = "Aquaferme API", description = "Farm management and IoT monitoring"),
    paths(
        register, login, refresh_token, get_current_user,
        get_users, create_user, get_user_by_id, update_user, delete_user,
        get_ferme, update_ferme, get_dashboard,
        get_bassins, create_bassin, get_bassin_by_id, update_bassin, delete_bassin,
        get_bassin_mesures, create_bassin_mesure,
        get_lots, create_lot, get_lot_by_id, update_lot, delete_lot,
        transfer_lot, generate_qr_code, get_lot_historique,
        get_ventes, create_vente, get_vente_by_id, update_vente, delete_vente,
        get_clients, create_client, get_client_by_id, update_client, delete_client,
        get_devices, create_device, get_device_by_id, update_device, delete_device,
        post_device_mesure, post_heartbeat, get_device_status, live_socket,
        get_alertes, create_alerte, resolve_alerte, delete_alerte,
        get_historique,
    ),
    components(schemas(LiveMessage, UserRole, Seuils, MesureStatistics, ParameterStatistics)),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and tokens"),
        (name = "utilisateur", description = "Account administration"),
        (name = "ferme", description = "Farm profile, thresholds and dashboard"),
        (name = "bassin", description = "Tanks and their readings"),
        (name = "lot", description = "Fish batches and their history"),
        (name = "vente", description = "Sales and stock reconciliation"),
        (name = "client", description = "Buyers"),
        (name = "iot", description = "Devices, telemetry and the live socket"),
        (name = "alerte", description = "Threshold alerts and notices"),
        (name = "historique", description = "Reading history and statistics")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn docs_router() -> Router {
    Router::new().route("/api/openapi.json", get(get_openapi))
}

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
