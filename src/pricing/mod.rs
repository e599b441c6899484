mod cache;
mod db;
mod provider;
mod resolver;
mod types;

pub(crate) use db::PricingDb;
pub(crate) use types::PricingSource;
