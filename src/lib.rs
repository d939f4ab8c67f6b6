//! Selector self-healing
//!
//! Wires the element repository and the self-healing resolver into a session
//! an automation layer can drive, plus configuration and metrics export.

pub mod config;
pub mod errors;
pub mod metrics;
pub mod session;

pub use action_locator::{
    HealOutcome, HealReport, HealStrategy, ResolverConfig, SelfHealer, SelfHealingResolver,
};
pub use config::Config;
pub use element_repository::{CapturedElement, ElementRepository, RepositoryPolicy};
pub use errors::{ActionError, SelfHealError};
pub use session::{HealEvent, HealingSession, Performed};
