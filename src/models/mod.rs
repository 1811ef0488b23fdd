//! Data models

pub mod stop;
pub mod metrics;
pub mod insight;
pub mod likelihood;

pub use stop::*;
pub use metrics::*;
pub use insight::*;
pub use likelihood::*;
