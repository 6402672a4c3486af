use std::path::PathBuf;

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    pub api_port: u16,
    /// Directory uploaded images are written to (default `media`). Env var: `MEDIA_ROOT`.
    pub media_root: PathBuf,
    /// Public URL prefix of `media_root`, with trailing slash (default `/media/`).
    pub media_url: String,
    /// `fast` selects minimal Argon2 parameters for dev/test. Env var: `PASSWORD_HASH_COST`.
    pub fast_password_hashing: bool,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            media_root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("media")),
            media_url: normalize_media_url(
                std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_owned()),
            ),
            fast_password_hashing: std::env::var("PASSWORD_HASH_COST")
                .is_ok_and(|v| v.eq_ignore_ascii_case("fast")),
        }
    }
}

fn normalize_media_url(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
