use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Read from the value of `SR_LOG_FORMAT`
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn default_directives(quiet: bool) -> &'static str {
    if quiet { "error" } else { "sr=info,sr_core=info" }
}

/// Install the global subscriber. Logs go to stderr; stdout carries image data.
///
/// Quiet mode only shows errors. `RUST_LOG` overrides the level either way.
pub fn init_logging(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(quiet)));
    let format = LogFormat::from_env_value(std::env::var("SR_LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second call (tests, embedding) keeps the first subscriber
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };
}
