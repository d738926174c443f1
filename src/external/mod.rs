pub mod awesome_api;
pub mod hg_brasil;
pub mod multi_provider;
pub mod quote_provider;
