use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "learning-queue";
const MAX_LOG_FILES: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

fn queue_log_appender(log_dir: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
}

/// 安装全局 subscriber，返回本次调用是否完成安装。
///
/// 宿主程序已安装 subscriber 时返回 false，不覆盖；
/// 日志目录不可用时只输出到 stdout。
pub fn init_tracing(config: &LogConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = Registry::default()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    if !config.enable_file_logs {
        return registry.try_init().is_ok();
    }

    match queue_log_appender(&config.log_dir) {
        Ok(appender) => registry
            .with(fmt::layer().with_writer(appender).with_ansi(false).json())
            .try_init()
            .is_ok(),
        Err(e) => {
            let installed = registry.try_init().is_ok();
            if installed {
                tracing::warn!(error = %e, log_dir = %config.log_dir, "File logging disabled");
            }
            installed
        }
    }
}
