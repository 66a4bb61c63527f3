pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::{Cart, CheckoutService, DataLifecycle, MenuRepository, OrderRepository};
pub use db::{create_pool, DbPool};
pub use domain::errors::{DomainError, NotificationError, StorageError};
pub use domain::ports::{Storage, StorageKey, StorageMode};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StorageError::Backend(format!("migrations failed: {e}")))?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::records::get_collection,
        handlers::records::put_collection,
        handlers::records::append_record,
        handlers::records::get_record,
        handlers::records::delete_record,
    ),
    components(schemas(errors::ErrorBody)),
    tags((name = "records", description = "Generic JSON record store"))
)]
pub struct ApiDoc;

/// Registers the record routes (`/{key}` and `/{key}/{id}`).
pub fn configure_records(cfg: &mut web::ServiceConfig) {
    use handlers::records;

    cfg.service(
        web::resource("/{key}")
            .route(web::get().to(records::get_collection))
            .route(web::put().to(records::put_collection))
            .route(web::post().to(records::append_record)),
    )
    .service(
        web::resource("/{key}/{id}")
            .route(web::get().to(records::get_record))
            .route(web::delete().to(records::delete_record)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port` that serves
/// `storage` as a record service.
///
/// The caller is responsible for `.await`-ing (or spawning) the returned
/// server.
pub fn build_server(
    storage: Arc<dyn Storage>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let storage = web::Data::from(storage);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(storage.clone())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .configure(configure_records)
    })
    .bind((host.to_string(), port))?
    .run())
}
