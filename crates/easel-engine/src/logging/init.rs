use std::sync::Once;

use log::LevelFilter;

/// Logger settings for binaries embedding the editor.
///
/// `filter` uses `env_logger` directive syntax, e.g.
/// `"easel_editor=debug,easel_engine=info"`. When it is `None` the `RUST_LOG`
/// variable is consulted, and `default_level` applies when neither is set.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self { filter: Some(filter.into()), ..Self::default() }
    }

    fn directives(&self) -> Option<String> {
        self.filter.clone().or_else(|| std::env::var("RUST_LOG").ok())
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger.
///
/// Only the first call in a process has an effect. Returns false when the
/// logger was already set up, here or by the host application.
pub fn init_logging(config: LoggingConfig) -> bool {
    let mut installed = false;
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.directives() {
            Some(directives) => builder.parse_filters(&directives),
            None => builder.filter_level(config.default_level),
        };
        builder.write_style(config.write_style);

        installed = builder.try_init().is_ok();
        if installed {
            log::debug!("logging initialized");
        }
    });
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig::with_filter("easel_editor=trace");
        assert_eq!(cfg.directives().as_deref(), Some("easel_editor=trace"));
        assert_eq!(cfg.default_level, LevelFilter::Info);
    }

    #[test]
    fn second_init_is_ignored() {
        init_logging(LoggingConfig::default());
        assert!(!init_logging(LoggingConfig::with_filter("trace")));
    }
}
