use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const DEFAULT_DIRECTIVE: &str = "gateway_client=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable console output
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Reads the `LOG_FORMAT` value; anything other than `json` is pretty.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Installs the global subscriber. The filter comes from `RUST_LOG`, the format from `LOG_FORMAT`.
pub fn init_logging() -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::builder().with_default_directive(Level::INFO.into()).parse_lossy(DEFAULT_DIRECTIVE)
    });

    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());
    match format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer().json().with_target(true).with_file(true).with_line_number(true);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().with_target(true).with_thread_ids(false).with_file(true).with_line_number(true);
            Registry::default().with(env_filter).with(fmt_layer).try_init()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("json"), LogFormat::Json)]
    #[case(Some(" JSON "), LogFormat::Json)]
    #[case(Some("pretty"), LogFormat::Pretty)]
    #[case(Some("logfmt"), LogFormat::Pretty)]
    #[case(None, LogFormat::Pretty)]
    fn log_format_from_env(#[case] value: Option<&str>, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::from_env_value(value), expected);
    }
}
