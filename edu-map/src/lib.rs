//! From engine rows to a coloured map.
//!
//! [`normalize`](normalize::normalize) keys the rows by region and applies
//! per-capita scaling, [`legend`] derives the legend bounds and the colour
//! match expression, and [`session::MapSession`] runs the whole round trip
//! against an [`AnalyticsEngine`](edu_db::engine::AnalyticsEngine).

pub mod config;
pub mod legend;
pub mod normalize;
pub mod session;
