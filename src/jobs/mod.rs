//! Background Jobs Module
//!
//! This module contains implementations of background jobs that are scheduled
//! and executed by the job scheduler service.
//!
//! # Available Jobs
//!
//! - `market_history_job` - Refreshes the rolling 7-day market history
//!
//! # Job Architecture
//!
//! Jobs in this module are designed to be:
//! - Idempotent: Can be safely re-run without side effects
//! - Fault-tolerant: Handle errors gracefully and log failures
//! - Observable: Provide detailed logging for monitoring
//!
//! Each job is registered with the job scheduler and executed on a defined schedule.

pub mod market_history_job;
