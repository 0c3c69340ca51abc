pub(crate) mod config;
pub(crate) mod context;
pub(crate) mod driver;
