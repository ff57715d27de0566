pub mod aggregator;
pub mod projection;
pub mod salary_service;
pub mod trunk_service;
