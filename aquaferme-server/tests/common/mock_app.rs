use std::sync::Arc;
use std::time::Duration;

use aquaferme_api::models::UserRole;
use aquaferme_server::configs::{Auth, Storage};
use aquaferme_server::handles::*;
use aquaferme_server::middlewares::TokenState;
use aquaferme_server::models::User;
use aquaferme_server::repositories::*;
use aquaferme_server::services::{
    AuthService, IotService, LiveRouter, MesureService, StockService, TokenService,
};
use aquaferme_server::tests::{create_test_user, setup_test_db};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Response;

pub struct MockApp {
    pub router: Router,
    pub storage: Arc<Storage>,
    pub admin: User,
    pub token: String,
    pub auth_service: Arc<AuthService>,
    pub token_service: Arc<TokenService>,
    pub live_router: Arc<LiveRouter>,
    pub mesure_service: Arc<MesureService>,
    pub iot_service: Arc<IotService>,
    pub window: time::Duration,
}

#[allow(dead_code)]
impl MockApp {
    pub async fn new() -> Self {
        let storage = setup_test_db().await;

        let auth_service = Arc::new(AuthService::new());
        let token_service = Arc::new(TokenService::new(Auth {
            secret: String::from("test"),
            expiration: 1000,
            admin: None,
        }));
        let live_router = Arc::new(LiveRouter::new());
        let mesure_service = Arc::new(MesureService::new(
            Arc::new(MesureRepository::new(storage.clone())),
            Arc::new(AlerteRepository::new(storage.clone())),
            Arc::new(FermeRepository::new(storage.clone())),
            live_router.clone(),
        ));
        let iot_service = Arc::new(IotService::new(
            Arc::new(DeviceRepository::new(storage.clone())),
            live_router.clone(),
            Duration::from_secs(120),
        ));

        let admin = create_test_user(
            storage.clone(),
            "admin@aquaferme.test",
            "admin_password",
            &UserRole::Admin,
        )
        .await;
        let token = token_service.generate_token(&admin).unwrap().token;

        Self {
            router: Router::new(),
            storage,
            admin,
            token,
            auth_service,
            token_service,
            live_router,
            mesure_service,
            iot_service,
            window: time::Duration::days(30),
        }
    }

    /// Creates an account with the given role and returns it with a valid token.
    pub async fn login_as(&self, email: &str, role: UserRole) -> (User, String) {
        let user = create_test_user(self.storage.clone(), email, "password123", &role).await;
        let token = self.token_for(&user);

        (user, token)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.token_service.generate_token(user).unwrap().token
    }

    fn token_state(&self) -> TokenState {
        TokenState {
            token_service: self.token_service.clone(),
            user_repository: Arc::new(UserRepository::new(self.storage.clone())),
        }
    }

    pub fn with_auth_handle(mut self) -> Self {
        let router = auth_router(
            AuthState {
                auth_service: self.auth_service.clone(),
                token_service: self.token_service.clone(),
                user_repository: Arc::new(UserRepository::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_user_handle(mut self) -> Self {
        let router = user_router(
            UserState {
                auth_service: self.auth_service.clone(),
                user_repository: Arc::new(UserRepository::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_ferme_handle(mut self) -> Self {
        let router = ferme_router(
            FermeState {
                ferme_repository: Arc::new(FermeRepository::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_bassin_handle(mut self) -> Self {
        let router = bassin_router(
            BassinState {
                bassin_repository: Arc::new(BassinRepository::new(self.storage.clone())),
                lot_repository: Arc::new(LotRepository::new(self.storage.clone())),
                mesure_repository: Arc::new(MesureRepository::new(self.storage.clone())),
                mesure_service: self.mesure_service.clone(),
                window: self.window,
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_lot_handle(mut self) -> Self {
        let router = lot_router(
            LotState {
                lot_repository: Arc::new(LotRepository::new(self.storage.clone())),
                lot_event_repository: Arc::new(LotEventRepository::new(self.storage.clone())),
                bassin_repository: Arc::new(BassinRepository::new(self.storage.clone())),
                mesure_repository: Arc::new(MesureRepository::new(self.storage.clone())),
                window: self.window,
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_vente_handle(mut self) -> Self {
        let lot_repository = Arc::new(LotRepository::new(self.storage.clone()));
        let router = vente_router(
            VenteState {
                vente_repository: Arc::new(VenteRepository::new(self.storage.clone())),
                lot_repository: lot_repository.clone(),
                client_repository: Arc::new(ClientRepository::new(self.storage.clone())),
                stock_service: Arc::new(StockService::new(lot_repository)),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_client_handle(mut self) -> Self {
        let router = client_router(
            ClientState {
                client_repository: Arc::new(ClientRepository::new(self.storage.clone())),
                user_repository: Arc::new(UserRepository::new(self.storage.clone())),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_iot_handle(mut self) -> Self {
        let router = iot_router(
            IotState {
                device_repository: Arc::new(DeviceRepository::new(self.storage.clone())),
                bassin_repository: Arc::new(BassinRepository::new(self.storage.clone())),
                iot_service: self.iot_service.clone(),
                mesure_service: self.mesure_service.clone(),
                live_router: self.live_router.clone(),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_alerte_handle(mut self) -> Self {
        let router = alerte_router(
            AlerteState {
                alerte_repository: Arc::new(AlerteRepository::new(self.storage.clone())),
                bassin_repository: Arc::new(BassinRepository::new(self.storage.clone())),
                live_router: self.live_router.clone(),
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }

    pub fn with_historique_handle(mut self) -> Self {
        let router = historique_router(
            HistoriqueState {
                bassin_repository: Arc::new(BassinRepository::new(self.storage.clone())),
                lot_repository: Arc::new(LotRepository::new(self.storage.clone())),
                mesure_repository: Arc::new(MesureRepository::new(self.storage.clone())),
                window: self.window,
            },
            self.token_state(),
        );
        self.router = self.router.merge(router);
        self
    }
}

#[allow(dead_code)]
pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
