// Library interface for paddock
// This allows integration tests and benches to access internal modules

pub mod analysis;
pub mod catalog;
pub mod circuits;
pub mod config;
pub mod context;
pub mod errors;
mod http;
pub mod session;

// Re-export commonly used types
pub use catalog::{CircuitDescriptor, SessionCatalog};
pub use circuits::{CircuitMap, CircuitSource};
pub use config::AppConfig;
pub use context::DashboardContext;
pub use errors::{ErrorKind, PaddockError};
pub use session::{
    ArchiveProvider, Compound, Lap, Session, SessionKey, SessionRepository, TelemetrySample,
    TimingProvider, WeatherSample,
};
