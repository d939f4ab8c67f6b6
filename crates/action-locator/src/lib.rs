//! Self-healing locator resolution
//!
//! When a recorded locator stops matching, this crate recovers a working one
//! from the live document using an ordered cascade:
//! - Repository alternative (captured while the locator still worked)
//! - Role plus accessible name from captured nearby text
//! - Looser variants of the broken CSS
//! - Visual match of the captured element image, or a size heuristic
//! - Interactive elements carrying the captured nearby text
//!
//! The first strategy yielding a matching locator wins. No strategy error
//! ever escapes [`SelfHealingResolver::heal`]; exhaustion is `None`.

pub mod config;
pub mod errors;
pub mod healer;
pub mod loosen;
pub mod metrics;
pub mod strategies;
pub mod types;

pub use config::ResolverConfig;
pub use errors::*;
pub use healer::*;
pub use strategies::{HealContext, Strategy};
pub use types::*;
