use canteen_orders::config::Settings;
use canteen_orders::{build_server, DataLifecycle};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(std::io::Error::other)?;
    let storage = settings.build_storage().map_err(std::io::Error::other)?;
    log::info!(
        "Using {:?} storage ({:?})",
        settings.backend,
        storage.mode()
    );

    let seeded = DataLifecycle::new(storage.clone())
        .initialize()
        .await
        .map_err(std::io::Error::other)?;
    if !seeded.is_empty() {
        log::info!("Seeded collections: {:?}", seeded);
    }

    log::info!(
        "Starting record service at http://{}:{}",
        settings.host,
        settings.port
    );

    build_server(storage, &settings.host, settings.port)?.await
}
