//! Application context for the Balcão order ledger.
//!
//! The presentation layer builds one [`AppContext`] at start-up and calls
//! into it for every read and write. There is no global state: settings,
//! the store handle and the side-car vocabularies all live on the context.

pub mod context;
pub mod settings;
pub mod telemetry;

pub use context::AppContext;
pub use settings::Settings;
