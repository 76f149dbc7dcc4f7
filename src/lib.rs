//! Crease - cricket data acquisition.
//!
//! Scrapes the public pages of a cricket information site into a normalized
//! relational dataset (teams, players, series, matches, scorecards) and keeps
//! it fresh on a schedule.

pub mod cli;
pub mod config;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod repository;
pub mod schema;
pub mod scheduler;
pub mod scrapers;
pub mod services;
pub mod upsert;
