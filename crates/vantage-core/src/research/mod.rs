//! Web research: the agent seam, query planning and result aggregation.

mod agent;
mod collector;
mod document;

pub use agent::{HttpResearchAgent, ResearchAgent, ResearchError};
pub use collector::{fallback_digest, ResearchCollector};
pub use document::{ResearchDigest, ResearchQuery, ResearchResult, ResearchSource};
