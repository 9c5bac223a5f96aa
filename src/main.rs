//! Service entry-point: wires the REST endpoints over the in-memory store.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use todo_backend::domain::{TodoService, UserService};
use todo_backend::inbound::http::health::{HealthState, live, ready};
use todo_backend::inbound::http::{self, state::HttpState};
use todo_backend::outbound::persistence::MemoryStore;

/// Command-line configuration.
#[derive(Debug, Parser)]
#[command(name = "todo-backend", about = "Task tracking REST service")]
struct ServerArgs {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = ServerArgs::parse();

    let store = Arc::new(MemoryStore::new());
    let state = HttpState::new(
        Arc::new(UserService::new(store.clone(), store.clone())),
        Arc::new(TodoService::new(store.clone(), store)),
    );

    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(web::Data::new(state.clone()))
            .configure(http::configure)
            .service(ready)
            .service(live)
    })
    .bind((args.bind.as_str(), args.port))?;

    info!(bind = %args.bind, port = args.port, "listening");
    health_state.mark_ready();
    server.run().await
}
