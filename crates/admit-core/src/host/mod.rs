pub mod ports;

use std::cell::Cell;

pub use ports::{
    ARGS_CONFIG_KEY, ConfigPort, DiscoverPort, HttpPort, HttpRequest, HttpResponse, InputPort,
    LogLevel, LogPort, MemoryPort, NullPorts, OutputPort,
};

/// Every port a full host implements.
pub trait HostPorts:
    InputPort + ConfigPort + OutputPort + HttpPort + DiscoverPort + MemoryPort + LogPort
{
}

impl<T> HostPorts for T where
    T: InputPort + ConfigPort + OutputPort + HttpPort + DiscoverPort + MemoryPort + LogPort
{
}

static NULL_PORTS: NullPorts = NullPorts;

/// The capabilities available to one policy invocation.
///
/// Borrows its ports, so callers keep ownership and can inspect fakes once
/// the invocation is over. Also counts emitted verdicts so the execution
/// wrapper can tell whether the policy body produced one.
pub struct Host<'h> {
    input: &'h dyn InputPort,
    config: &'h dyn ConfigPort,
    output: &'h dyn OutputPort,
    http: &'h dyn HttpPort,
    discover: &'h dyn DiscoverPort,
    memory: &'h dyn MemoryPort,
    log: &'h dyn LogPort,
    emitted: Cell<usize>,
}

impl<'h> Host<'h> {
    /// Wires every port from one implementation.
    pub fn new<P: HostPorts>(ports: &'h P) -> Self {
        Self {
            input: ports,
            config: ports,
            output: ports,
            http: ports,
            discover: ports,
            memory: ports,
            log: ports,
            emitted: Cell::new(0),
        }
    }

    /// Starts a host with only an output channel; other ports default to
    /// [`NullPorts`].
    pub fn builder(output: &'h dyn OutputPort) -> HostBuilder<'h> {
        HostBuilder {
            host: Host {
                input: &NULL_PORTS,
                config: &NULL_PORTS,
                output,
                http: &NULL_PORTS,
                discover: &NULL_PORTS,
                memory: &NULL_PORTS,
                log: &NULL_PORTS,
                emitted: Cell::new(0),
            },
        }
    }

    pub fn input(&self) -> &dyn InputPort {
        self.input
    }

    pub fn config(&self) -> &dyn ConfigPort {
        self.config
    }

    pub fn http(&self) -> &dyn HttpPort {
        self.http
    }

    pub fn discovery(&self) -> &dyn DiscoverPort {
        self.discover
    }

    pub fn memory(&self) -> &dyn MemoryPort {
        self.memory
    }

    /// Writes raw bytes to the output channel and records the emission.
    pub(crate) fn emit(&self, bytes: &[u8]) {
        self.output.emit(bytes);
        self.emitted.set(self.emitted.get().saturating_add(1));
    }

    /// Number of verdicts emitted through this host so far.
    pub fn emitted(&self) -> usize {
        self.emitted.get()
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.log.log(level, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl std::fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("emitted", &self.emitted.get())
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Host`] from individually supplied ports.
pub struct HostBuilder<'h> {
    host: Host<'h>,
}

impl<'h> HostBuilder<'h> {
    pub fn input(mut self, port: &'h dyn InputPort) -> Self {
        self.host.input = port;
        self
    }

    pub fn config(mut self, port: &'h dyn ConfigPort) -> Self {
        self.host.config = port;
        self
    }

    pub fn http(mut self, port: &'h dyn HttpPort) -> Self {
        self.host.http = port;
        self
    }

    pub fn discovery(mut self, discover: &'h dyn DiscoverPort, memory: &'h dyn MemoryPort) -> Self {
        self.host.discover = discover;
        self.host.memory = memory;
        self
    }

    pub fn log(mut self, port: &'h dyn LogPort) -> Self {
        self.host.log = port;
        self
    }

    pub fn build(self) -> Host<'h> {
        self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    #[test]
    fn builder_defaults_to_null_ports() {
        let fake = FakeHost::new();
        let host = Host::builder(&fake).build();

        assert!(host.input().input().is_err());
        assert_eq!(host.config().get(ARGS_CONFIG_KEY), None);
        assert_eq!(host.discovery().discover("sha256:abc", ""), 0);
    }

    #[test]
    fn builder_wires_supplied_ports() {
        let fake = FakeHost::new().with_material(b"{}".to_vec());
        let host = Host::builder(&fake).input(&fake).log(&fake).build();

        assert_eq!(host.input().input().unwrap(), b"{}");
        host.warn("careful");
        assert_eq!(fake.logs(), vec![(LogLevel::Warn, "careful".to_string())]);
    }

    #[test]
    fn emit_counts_outputs() {
        let fake = FakeHost::new();
        let host = Host::new(&fake);

        assert_eq!(host.emitted(), 0);
        host.emit(b"{}");
        host.emit(b"{}");
        assert_eq!(host.emitted(), 2);
        assert_eq!(fake.outputs().len(), 2);
    }
}
