use anyhow::{Context, Result};
use tracing::*;
use tracing_subscriber::FmtSubscriber;
use u6_bridge::axumstate::{AxumState, BoxedDriver};
use u6_bridge::config;
use u6_bridge::http;

#[cfg(not(any(feature = "sim", feature = "labjackud")))]
compile_error!("enable either the `sim` or the `labjackud` feature");

/// Pick the driver backend the binary was built with
#[cfg(feature = "labjackud")]
fn select_driver() -> BoxedDriver {
    info!("Using the LabJackUD driver");
    Box::new(u6_bridge::controller::backend::labjack::LabJackUd)
}

#[cfg(all(feature = "sim", not(feature = "labjackud")))]
fn select_driver() -> BoxedDriver {
    info!("Using the simulated U6");
    Box::new(u6_bridge::controller::backend::sim::SimulatedU6::new())
}

/// Application & Tokio executor entrypoint
#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        // all spans/events with a level higher than TRACE (e.g, debug, info, warn, etc.)
        // will be written to stdout.
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing subscriber failed")?;

    // Initialize application state, the controller stays disconnected until asked to connect
    let state = AxumState::new(select_driver());

    let app = http::router(state);

    // Start serving webrequests
    let address = config::listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("unable to bind {address}"))?;
    info!("{} plugin listening on http://{address}", config::NAMESPACE);
    axum::serve(listener, app).await?;

    Ok(())
}
