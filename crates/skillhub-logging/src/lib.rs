use anyhow::Result;
use serde::Deserialize;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging settings passed in by the embedding application
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `skillhub_skills=debug`
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Text logging at `level`
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            json: false,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn subscriber(&self) -> Box<dyn tracing::Subscriber + Send + Sync> {
        let registry = Registry::default().with(self.filter());
        if self.json {
            Box::new(
                registry.with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_current_span(true),
                ),
            )
        } else {
            Box::new(
                registry.with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(true),
                ),
            )
        }
    }
}

/// Initialize the process-wide logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config.subscriber().try_init()?;
    Ok(())
}

/// Install logging for the current thread only, until the guard drops
pub fn scoped_logging(config: &LoggingConfig) -> DefaultGuard {
    tracing::subscriber::set_default(config.subscriber())
}
