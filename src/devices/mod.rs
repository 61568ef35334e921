//! Device drivers using platform abstraction

pub mod relay_feedback;
