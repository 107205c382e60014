use anyhow::Context;
use derive_more::Display;
use std::env;

/// Port the HTTP server listens on
pub const PORT: &str = "PORT";
/// Connection string for the MongoDB deployment. The path component names the database.
pub const MONGODB_URI: &str = "MONGODB_URI";
/// Runtime mode of the service. "development" exposes error cause chains in API responses.
pub const NODE_ENV: &str = "NODE_ENV";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 when an OpenTelemetry
/// collector sidecar runs next to the service
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 when an OpenTelemetry
/// collector sidecar runs next to the service
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/todo";

/// The mode the service is running in, as reported by [NODE_ENV]
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    #[display("development")]
    Development,
    #[display("production")]
    Production,
    #[display("unspecified")]
    Unspecified,
}

impl RuntimeMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("development") => Self::Development,
            Some("production") => Self::Production,
            _ => Self::Unspecified,
        }
    }

    /// Whether error responses may carry the full cause chain of a failure
    pub fn exposes_error_stack(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Where OpenTelemetry data gets shipped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub spans: String,
    pub metrics: String,
}

/// Service configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub mongodb_uri: String,
    pub runtime_mode: RuntimeMode,
    pub otel: Option<OtelEndpoints>,
}

impl AppConfig {
    /// Builds the configuration from the process environment
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset and blank
    /// variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match read(PORT) {
            Some(raw_port) => raw_port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{PORT} must be a valid port number, got \"{raw_port}\""))?,
            None => DEFAULT_PORT,
        };
        let mongodb_uri = read(MONGODB_URI).unwrap_or_else(|| DEFAULT_MONGODB_URI.to_owned());
        let runtime_mode = RuntimeMode::parse(read(NODE_ENV).as_deref());
        let otel = match (read(OTEL_SPAN_EXPORT_URL), read(OTEL_METRIC_EXPORT_URL)) {
            (Some(spans), Some(metrics)) => Some(OtelEndpoints { spans, metrics }),
            _ => None,
        };

        Ok(AppConfig {
            port,
            mongodb_uri,
            runtime_mode,
            otel,
        })
    }
}
