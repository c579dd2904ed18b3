pub mod model;
pub mod worker;

pub use model::{Activity, ActivityEntry};
pub use worker::start_activity_worker;
