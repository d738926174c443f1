pub(crate) mod auth;
pub(crate) mod cron;
pub(crate) mod health;
pub(crate) mod market;
pub(crate) mod reserves;
