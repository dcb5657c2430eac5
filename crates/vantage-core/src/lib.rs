pub mod analysis;
pub mod attachments;
pub mod config;
pub mod llm;
pub mod manager;
pub mod market;
pub mod outcome;
pub mod record;
pub mod research;
pub mod status;
pub mod storage;

pub use analysis::{AnalysisEngine, AnalysisReport, AnalysisRequest};
pub use config::Config;
pub use manager::AnalysisManager;
pub use outcome::{Outcome, Provenance};
pub use record::AnalysisRecord;
pub use status::AnalysisStatus;
