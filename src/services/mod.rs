//! Orchestration services built on the scrapers and stores.

mod extraction;

pub use extraction::ExtractionPipeline;
