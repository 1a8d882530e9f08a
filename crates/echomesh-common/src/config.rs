use std::net::SocketAddr;
use std::time::Duration;

/// Construction-time configuration for a serving process.
///
/// These are the plain values the boundary needs before it can accept a
/// call: where to listen, how many local workers to start, and how long a
/// call may stay pending before it is abandoned. How they are obtained
/// (flags, environment, a file) is the caller's business.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Address the HTTP boundary binds to.
    pub listen_addr: SocketAddr,
    /// Number of local workers started into the routing pool.
    pub pool_size: usize,
    /// Deadline for one dispatch-and-wait round trip.
    pub ask_deadline: Duration,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            pool_size: 5,
            ask_deadline: Duration::from_secs(5),
        }
    }
}

impl ServeConfig {
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_ask_deadline(mut self, deadline: Duration) -> Self {
        self.ask_deadline = deadline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServeConfig::default();
        assert_eq!(config.listen_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.ask_deadline, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ServeConfig::default()
            .with_pool_size(2)
            .with_ask_deadline(Duration::from_millis(250))
            .with_listen_addr(SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(config.pool_size, 2);
        assert_eq!(config.ask_deadline, Duration::from_millis(250));
        assert_eq!(config.listen_addr, SocketAddr::from(([127, 0, 0, 1], 9090)));
    }
}
