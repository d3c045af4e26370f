use crate::{
    app_state::AppState,
    configuration::{DatabaseSettings, Settings},
    routes::{health_check, submissions},
    telemetry::{self, RequestUuid},
};
use axum::Router;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct Application {
    local_addr: SocketAddr,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let app_state = AppState {
            db_pool: get_connection_pool(&config.database),
            email_client: config.email_client.client(),
            payment: config.payment,
        };

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address).await?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            local_addr,
            listener,
            router: router(app_state),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("Listening on {}", self.local_addr);
        axum::serve(self.listener, self.router).await
    }
}

pub fn get_connection_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(config.with_db())
}

fn router(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router())
        .merge(submissions::router())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(telemetry::request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                // The form is posted from a static site on another
                // origin, so every response carries permissive CORS
                // headers.
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
