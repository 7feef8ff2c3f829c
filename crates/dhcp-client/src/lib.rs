pub mod config;
pub mod exchange;
pub mod transport;

#[cfg(test)]
pub mod test_helpers;

pub use config::ClientConfig;
pub use exchange::{Exchange, ExchangeError, Lease};
pub use transport::{Transport, TransportError};
