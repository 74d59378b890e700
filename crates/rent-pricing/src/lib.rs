//! Rent pricing pipeline for multifamily communities.
//!
//! The engine converts a batch of unit snapshots, a [`PricingConfig`] policy and a
//! [`MarketContext`] into fully explained multi-term quotes. It never performs I/O:
//! rent rolls are normalized by [`workflows::rent_roll`] and carry-forward baselines
//! are persisted through a [`CarryForwardRepository`].
//!
//! [`PricingConfig`]: workflows::pricing::PricingConfig
//! [`MarketContext`]: workflows::pricing::MarketContext
//! [`CarryForwardRepository`]: workflows::pricing::CarryForwardRepository

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
