use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use electron_regression::{
    batch,
    config::ProducerConfig,
    geometry::{CaloGeometry, CaloTopology},
    producer::ElectronRegressionProducer,
    service,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("REGRESSION_CONFIG").context("REGRESSION_CONFIG not set")?;
    let port: u16 = std::env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8080);

    let cfg = ProducerConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path))?;
    let producer = ElectronRegressionProducer::from_config(
        &cfg,
        Arc::new(CaloGeometry::ideal()),
        Arc::new(CaloTopology::ideal()),
    )
    .with_context(|| {
        format!(
            "failed to initialize regression from {}",
            cfg.regression_input_file.display()
        )
    })?;
    tracing::info!(
        electrons = %cfg.electron_tag,
        regression_type = cfg.energy_regression_type,
        energy = %cfg.energy_output_tag(),
        energy_error = %cfg.energy_error_output_tag(),
        "producer ready"
    );

    if let Ok(events_path) = std::env::var("EVENTS_PATH") {
        let input = BufReader::new(
            File::open(&events_path).with_context(|| format!("failed to open {}", events_path))?,
        );
        let summary = match std::env::var("OUTPUT_PATH") {
            Ok(out) => {
                let file = File::create(&out).with_context(|| format!("failed to create {}", out))?;
                batch::run(&producer, input, BufWriter::new(file))?
            }
            Err(_) => batch::run(&producer, input, io::stdout().lock())?,
        };
        tracing::info!(events = summary.events, electrons = summary.electrons, "done");
        return Ok(());
    }

    let app = service::router(service::AppState::new(producer));
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
