//! Services for dataset aggregation and caching

pub mod aggregator;
pub mod cache;
pub mod data_loader;
pub mod normalizer;

pub use aggregator::Aggregator;
pub use cache::WorkbookCache;
pub use data_loader::DashboardLoader;
pub use normalizer::normalize_date_cell;
