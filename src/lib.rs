pub mod builder;
pub mod config;
pub mod database;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod priority;

pub use builder::DictionaryBuilder;
pub use config::Config;
pub use models::*;
