// Utility modules: scoring models, ingestion and reporting

pub mod catalog;
pub mod metrics;
pub mod regret;
pub mod satisfaction;
pub mod similarity;
pub mod skyline;
pub mod utility;
