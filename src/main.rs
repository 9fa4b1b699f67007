mod api;
mod case;
mod config;
mod event;
mod http;
mod reporter;
mod result;
mod run;
mod screenshot;
mod testrail;
#[cfg(test)]
mod testing;

use crate::api::build_api;
use crate::config::{listen_addr, ReporterMode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mode = ReporterMode::from_env();
    if let ReporterMode::Enabled(config) = &mode {
        info!(domain = %config.domain, reuse = config.reuses_run(), "TestRail reporting enabled");
    }

    let addr = listen_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("could not listen on {}: {}", addr, err);
            std::process::exit(1);
        }
    };
    info!("listening for runner events on {}", addr);
    if let Err(err) = axum::serve(listener, build_api(mode)).await {
        error!("server stopped: {}", err);
    }
}
