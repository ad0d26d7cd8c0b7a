use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 專用的過濾設定，優先於 RUST_LOG
pub const LOG_FILTER_ENV: &str = "PACT_MOCK_LOG";
/// 有設定就輸出 JSON
pub const LOG_JSON_ENV: &str = "PACT_MOCK_LOG_JSON";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 終端機用的精簡格式
    Compact,
    /// CI 收集日誌用，一行一個事件
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_json_flag(std::env::var(LOG_JSON_ENV).ok().as_deref())
    }

    /// 空字串、`0`、`false` 視為關閉
    pub fn from_json_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            None | Some("") | Some("0") => LogFormat::Compact,
            Some(v) if v.eq_ignore_ascii_case("false") => LogFormat::Compact,
            Some(_) => LogFormat::Json,
        }
    }
}

/// 沒有環境變數時的預設過濾字串。
///
/// 控制請求的逐筆紀錄 (`core`) 在 verbose 或 JSON 模式才顯示，
/// 其他 crate 只顯示警告以上。
pub fn default_directives(format: LogFormat, verbose: bool) -> &'static str {
    match (format, verbose) {
        (_, true) => "warn,pact_mock_client=debug",
        (LogFormat::Json, false) => "warn,pact_mock_client=info,pact_mock_client::core=debug",
        (LogFormat::Compact, false) => "warn,pact_mock_client=info",
    }
}

fn env_filter(format: LogFormat, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(format, verbose)))
}

pub fn init_logger(format: LogFormat, verbose: bool) {
    match format {
        LogFormat::Compact => init_cli_logger(verbose),
        LogFormat::Json => init_json_logger(verbose),
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(LogFormat::Compact, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(LogFormat::Json, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_target(true),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_flag_parsing() {
        assert_eq!(LogFormat::from_json_flag(None), LogFormat::Compact);
        assert_eq!(LogFormat::from_json_flag(Some("")), LogFormat::Compact);
        assert_eq!(LogFormat::from_json_flag(Some("0")), LogFormat::Compact);
        assert_eq!(LogFormat::from_json_flag(Some("FALSE")), LogFormat::Compact);
        assert_eq!(LogFormat::from_json_flag(Some("1")), LogFormat::Json);
        assert_eq!(LogFormat::from_json_flag(Some("true")), LogFormat::Json);
    }

    #[test]
    fn test_default_directives_parse() {
        for format in [LogFormat::Compact, LogFormat::Json] {
            for verbose in [false, true] {
                let directives = default_directives(format, verbose);
                assert!(
                    EnvFilter::try_new(directives).is_ok(),
                    "invalid directives: {}",
                    directives
                );
            }
        }
    }

    #[test]
    fn test_json_logs_control_requests_by_default() {
        assert!(default_directives(LogFormat::Json, false).contains("pact_mock_client::core=debug"));
        assert!(!default_directives(LogFormat::Compact, false).contains("debug"));
        assert!(default_directives(LogFormat::Compact, true).contains("pact_mock_client=debug"));
    }
}
