//! Element Repository - recovery signals captured per successful locator
//!
//! On the first successful interaction with a locator the automation layer
//! calls [`ElementRepository::capture`]; the repository records alternative
//! locators, an element screenshot, nearby text and geometry keyed by the
//! locator string. The self-healing resolver reads these bundles back when the
//! locator later stops matching.

pub mod api;
pub mod derive;
pub mod errors;
pub mod model;
pub mod policy;

pub use api::ElementRepository;
pub use errors::{RepoErrKind, RepoError};
pub use model::{CapturedElement, RepositoryStats, Snapshot};
pub use policy::RepositoryPolicy;
