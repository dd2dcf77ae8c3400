use agora_error::ext::ResultExt;
use agora_error::Result;
use agora_server::App;
use std::net::SocketAddr;
use std::process::ExitCode;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Debug, Error)]
#[error("Could not start Agora HTTP server")]
struct StartError;

#[tracing::instrument(skip_all, name = "server.run")]
async fn start_server(config: agora_config::Server) -> Result<(), StartError> {
    let app = App::new(config).change_context(StartError)?;

    debug!("running pending database migrations");
    let mut conn = app.db.acquire().await.change_context(StartError)?;
    agora_model::DB_MIGRATIONS
        .run(&mut *conn)
        .await
        .change_context(StartError)
        .attach_printable("could not run database migrations")?;
    drop(conn);

    debug!("binding server");
    let listener = TcpListener::bind((app.config.ip, app.config.port))
        .await
        .change_context(StartError)
        .attach_printable("could not bind server with address and port")?;

    let addr = listener
        .local_addr()
        .change_context(StartError)
        .attach_printable("could not get socket address of the server")?;

    let make_service = agora_server::build_axum_router(app)
        .into_make_service_with_connect_info::<SocketAddr>();

    info!("Agora HTTP server is listening at http://{addr}");

    axum::serve(listener, make_service)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Received graceful shutdown signal. Shutting down server...");
        })
        .await
        .change_context(StartError)
        .attach_printable("could not serve Agora HTTP service")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|error| panic!("could not listen for Ctrl+C: {error}"));
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .unwrap_or_else(|error| panic!("could not listen for SIGTERM: {error}"))
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }
}

fn main() -> ExitCode {
    let config = match agora_config::Server::from_env() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("could not load server configuration:\n{report:?}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(report) = agora_server::telemetry::init(&config.logging) {
        eprintln!("{report:?}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("could not build the async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(report) = runtime.block_on(start_server(config)) {
        eprintln!("{report:?}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
