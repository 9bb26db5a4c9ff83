pub mod cache;
pub mod currency;
pub mod field;
pub mod income;
pub mod listing;
pub mod money;
pub mod settings;
