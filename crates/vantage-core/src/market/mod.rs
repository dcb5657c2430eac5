//! Local market heuristics and competitor/keyword enrichment.

mod competitors;
mod intelligence;
mod keywords;

pub use competitors::{estimate_price_band, parse_competitor_list, CompetitorAnalyzer, CompetitorProfile};
pub use intelligence::{
    CompetitionLandscape, GrowthIndicators, MarketSnapshot, PricingAnalysis, SegmentProfile,
};
pub use keywords::{Difficulty, KeywordLookup, KeywordMetrics, KeywordSimulator};
