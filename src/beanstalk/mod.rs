pub mod client;
pub mod manager;

pub use client::{Client, Stats};
pub use manager::BeanstalkManager;
