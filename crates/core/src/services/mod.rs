pub mod income_service;
pub mod listing_service;
pub mod rate_service;
