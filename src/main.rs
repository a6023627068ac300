use std::io::{Error as IoError, ErrorKind};

use actix_web::web::{self, Data};
use actix_web::{App, HttpServer};
use tokio::sync::Mutex;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use kolmarket::marketplace::Marketplace;
use kolmarket::notify::TracingNotifier;
use kolmarket::settings::Settings;
use kolmarket::{seed, store};

fn startup_error(err: kolmarket::error::Error) -> IoError {
    IoError::new(ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> Result<(), IoError> {
    let settings = Settings::load().map_err(startup_error)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log.filter))
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    info!(backend = ?settings.storage.backend, "opening store");
    let store = store::open_store(&settings.storage)
        .await
        .map_err(startup_error)?;

    let mut market = Marketplace::load(store, Box::new(TracingNotifier)).await;
    if settings.seed {
        seed::seed(&mut market).await.map_err(startup_error)?;
    }

    let market = Data::new(Mutex::new(market));

    info!(
        host = %settings.server.host,
        port = settings.server.port,
        "starting server"
    );
    HttpServer::new(move || {
        App::new()
            .app_data(market.clone())
            .wrap(TracingLogger::default())
            .configure(kolmarket::configure)
            .default_service(web::to(kolmarket::path_not_found))
    })
    .bind((settings.server.host.as_str(), settings.server.port))?
    .run()
    .await
}
