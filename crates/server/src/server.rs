use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{dashboard, entries, reports, sales};
use engine::Ledger;

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    /// Directory holding the TTF family used for PDF reports.
    pub fonts_dir: PathBuf,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/entries", post(entries::create).get(entries::list))
        .route(
            "/entries/{id}",
            patch(entries::update).delete(entries::delete),
        )
        .route("/sales", post(sales::create).get(sales::list))
        .route("/sales/{id}", patch(sales::update).delete(sales::delete))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/reports/entries", get(reports::entries_report))
        .route("/reports/sales", get(reports::sales_report))
        .with_state(state)
}

pub async fn run(ledger: Ledger, fonts_dir: PathBuf) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(ledger, fonts_dir, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    ledger: Ledger,
    fonts_dir: PathBuf,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        ledger: Arc::new(ledger),
        fonts_dir,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    ledger: Ledger,
    fonts_dir: PathBuf,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(ledger, fonts_dir, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
