pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Fetch, Health, Serve, State, Status, Upload, Version};
