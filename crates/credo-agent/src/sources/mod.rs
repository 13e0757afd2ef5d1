//! Concrete observation sources.

mod disk;
mod http;
mod sensor;

pub use disk::DiskUsageSource;
pub use http::HttpProbeSource;
pub use sensor::SensorCommandSource;
