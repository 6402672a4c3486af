use sea_orm::Database;
use tracing::info;

use foodgram_api::config::ApiConfig;
use foodgram_api::infra::image::FsImageStore;
use foodgram_api::infra::password::Argon2PasswordHasher;
use foodgram_api::router::build_router;
use foodgram_api::state::AppState;

#[tokio::main]
async fn main() {
    foodgram_core::tracing::init_tracing("foodgram_api");

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .expect("failed to create media root");

    let state = AppState {
        db,
        images: FsImageStore {
            root: config.media_root.clone(),
            url_prefix: config.media_url.clone(),
        },
        hasher: Argon2PasswordHasher {
            fast: config.fast_password_hashing,
        },
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!(media_root = %config.media_root.display(), "serving media");
    info!("api listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
