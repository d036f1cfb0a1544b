//! HTTP surface for the booking system.
//!
//! One process hosts the booking orchestrator, the reservation pool, and
//! the ledger behind a single axum router, with structured logging
//! (tracing) and Prometheus metrics. Peer seams are wired in-process by
//! default; configuring peer URLs swaps in the HTTP gateways so the same
//! binary can serve a split deployment.

pub mod auth;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod gateway;
pub mod local;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use booking::{
    InMemoryBookingStore, LedgerClient, Notifier, Orchestrator, ReservationClient,
};
use ledger::{InMemoryLedgerStore, Ledger};
use metrics_exporter_prometheus::PrometheusHandle;
use reservation::{InMemoryReservationStore, OutcomeSender, ReservationPool};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use callbacks::{
    ChannelOutcomeSender, ChannelPaymentSender, PaymentSender, spawn_dispatcher,
};
use config::Config;
use gateway::{
    HttpLedgerClient, HttpNotifier, HttpOutcomeSender, HttpPaymentSender, HttpReservationClient,
};
use local::{LocalLedgerClient, LocalReservationClient, LoggingNotifier};

/// The reservation pool as hosted by this process.
pub type AppPool = ReservationPool<InMemoryReservationStore, Arc<dyn OutcomeSender>>;

/// The ledger as hosted by this process.
pub type AppLedger = Ledger<InMemoryLedgerStore>;

/// The orchestrator as hosted by this process.
pub type AppOrchestrator = Orchestrator<
    InMemoryBookingStore,
    Arc<dyn ReservationClient>,
    Arc<dyn LedgerClient>,
    Arc<dyn Notifier>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Arc<AppOrchestrator>,
    pub pool: Arc<AppPool>,
    pub ledger: Arc<AppLedger>,
    pub payments: Arc<dyn PaymentSender>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/bookings", post(routes::bookings::create))
        .route("/bookings", get(routes::bookings::list))
        .route("/bookings/{id}", get(routes::bookings::get))
        .route(
            "/bookings/callback/reservation",
            post(routes::bookings::reservation_callback),
        )
        .route(
            "/bookings/callback/payment",
            post(routes::bookings::payment_callback),
        )
        .route("/events", post(routes::events::create))
        .route("/events", get(routes::events::list))
        .route("/events/{id}", get(routes::events::get))
        .route("/events/occupy", post(routes::events::occupy))
        .route("/events/cancel", post(routes::events::cancel))
        .route("/account/balance", get(routes::account::balance))
        .route("/account/reserve", post(routes::account::reserve))
        .route("/account/deposit", post(routes::account::deposit))
        .route("/account/withdraw", post(routes::account::withdraw))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state, wiring peers per the configuration.
///
/// Unset peer URLs mean in-process wiring; outcome callbacks then flow
/// through channels into the returned dispatcher task.
pub fn create_state(config: &Config) -> (Arc<AppState>, tokio::task::JoinHandle<()>) {
    let (reservation_tx, reservation_rx) = mpsc::unbounded_channel();
    let (payment_tx, payment_rx) = mpsc::unbounded_channel();

    let outcome_sender: Arc<dyn OutcomeSender> = match &config.callback_url {
        Some(url) => Arc::new(HttpOutcomeSender::new(url.clone())),
        None => Arc::new(ChannelOutcomeSender::new(reservation_tx)),
    };
    let payments: Arc<dyn PaymentSender> = match &config.callback_url {
        Some(url) => Arc::new(HttpPaymentSender::new(url.clone())),
        None => Arc::new(ChannelPaymentSender::new(payment_tx)),
    };

    let pool = Arc::new(ReservationPool::new(
        InMemoryReservationStore::new(),
        outcome_sender,
    ));
    let ledger = Arc::new(Ledger::new(InMemoryLedgerStore::new()));

    let reservation_client: Arc<dyn ReservationClient> = match &config.events_url {
        Some(url) => Arc::new(HttpReservationClient::new(url.clone())),
        None => Arc::new(LocalReservationClient::new(pool.clone())),
    };
    let ledger_client: Arc<dyn LedgerClient> = match &config.account_url {
        Some(url) => Arc::new(HttpLedgerClient::new(url.clone())),
        None => Arc::new(LocalLedgerClient::new(ledger.clone(), payments.clone())),
    };
    let notifier: Arc<dyn Notifier> = match &config.notify_url {
        Some(url) => Arc::new(HttpNotifier::new(url.clone())),
        None => Arc::new(LoggingNotifier),
    };

    let orchestrator = Arc::new(Orchestrator::new(
        InMemoryBookingStore::new(),
        reservation_client,
        ledger_client,
        notifier,
    ));

    let dispatcher = spawn_dispatcher(orchestrator.clone(), reservation_rx, payment_rx);

    let state = Arc::new(AppState {
        orchestrator,
        pool,
        ledger,
        payments,
    });

    (state, dispatcher)
}

/// Creates the default in-process application state.
pub fn create_default_state() -> (Arc<AppState>, tokio::task::JoinHandle<()>) {
    create_state(&Config::default())
}
