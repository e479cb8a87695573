pub mod api;
pub mod config;
pub mod map;
pub mod scheduler;
pub mod selection;
pub mod view;

pub use config::Config;
