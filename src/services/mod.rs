pub mod clock;
pub mod job_scheduler_service;
pub mod market_service;
pub mod quote_cache;
pub mod reconciler;
pub mod reserve_service;
pub mod user_service;
