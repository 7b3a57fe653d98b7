use ffred::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// RUST_LOG wins over the config file; an unparsable filter falls back to
/// `info`. Logs go to stderr so reports on stdout stay machine-readable.
pub fn init(cfg: &LoggingConfig) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: logging.level='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cfg.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
