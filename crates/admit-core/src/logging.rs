//! Bridges the `log` facade onto a host log sink.

pub use log::LevelFilter;

use crate::host::{LogLevel, LogPort};

/// A `log::Log` implementation that forwards records to a [`LogPort`].
///
/// Records from other crates are tagged with their target so host output
/// stays attributable.
#[derive(Debug)]
pub struct HostLogger<P> {
    port: P,
    max_level: log::LevelFilter,
}

impl<P: LogPort> HostLogger<P> {
    pub fn new(port: P, max_level: log::LevelFilter) -> Self {
        Self { port, max_level }
    }

    fn format(record: &log::Record<'_>) -> String {
        let target = record.target();
        if target.is_empty() || target.starts_with(env!("CARGO_CRATE_NAME")) {
            record.args().to_string()
        } else {
            format!("[{target}] {}", record.args())
        }
    }
}

impl<P> log::Log for HostLogger<P>
where
    P: LogPort + Send + Sync,
{
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.port
                .log(LogLevel::from(record.level()), &Self::format(record));
        }
    }

    fn flush(&self) {}
}

/// Installs a [`HostLogger`] as the global logger.
///
/// Fails if a logger is already installed; the first one wins.
pub fn init_logger<P>(port: P, max_level: log::LevelFilter) -> Result<(), log::SetLoggerError>
where
    P: LogPort + Send + Sync + 'static,
{
    log::set_boxed_logger(Box::new(HostLogger::new(port, max_level)))?;
    log::set_max_level(max_level);
    Ok(())
}
