use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset: `info` for the binary's own crate and
/// HTTP traces, `warn` for SQL statements.
fn default_directives(crate_name: &str) -> String {
    format!("warn,{crate_name}=info,foodgram_api=info,tower_http=info,sea_orm=warn")
}

/// Install the global subscriber for a binary.
///
/// Output is JSON lines unless `LOG_FORMAT=pretty`. Later calls are ignored.
pub fn init_tracing(crate_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(crate_name)));
    let pretty = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if pretty {
        registry.with(fmt::layer().pretty()).try_init()
    } else {
        registry.with(fmt::layer().json()).try_init()
    };
}
