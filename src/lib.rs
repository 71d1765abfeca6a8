//! Oddsacquire - NFL betting-lines acquisition pipeline.
//!
//! Scrapes decades of historical odds tables per season, archives raw
//! week summary pages, and extracts structured game references from the
//! archive in a two-stage crawl/extract pipeline.

pub mod cli;
pub mod config;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod services;
pub mod storage;
