// Public modules
pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod feed;
pub mod step;

// Re-export common types for convenience
pub use callback::{CallbackPayload, CallbackStatus, CallbackTransport, HttpTransport};
pub use config::BridgeConfig;
pub use dispatcher::{DeliveryOutcome, DispatchSummary, Dispatcher};
pub use error::{Error, ErrorCode, Result};
pub use events::{LifecycleEvent, LifecycleHooks};
pub use step::{classify, StepId};
