//! Locator self-heal
//!
//! Re-identifies a previously known element inside a changed DOM snapshot and
//! proposes fresh locators for it:
//! - Candidate search over the current tree (feature overlap, same tag)
//! - Similarity scoring against the baseline element
//! - Multi-strategy locator synthesis with estimated specificity
//! - Orchestration and ranking, with trace events and a healing history

pub mod errors;
pub mod events;
pub mod finder;
pub mod healer;
pub mod history;
pub mod metrics;
pub mod policy;
pub mod scorer;
pub mod synthesizer;
pub mod types;

pub use errors::*;
pub use events::*;
pub use finder::*;
pub use healer::*;
pub use history::*;
pub use policy::*;
pub use scorer::*;
pub use synthesizer::*;
pub use types::*;
