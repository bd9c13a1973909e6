mod health;
mod metrics;
mod updated_at;
mod visits;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use updated_at::updated_at_handler;
pub use visits::{get_visits, post_visits};
