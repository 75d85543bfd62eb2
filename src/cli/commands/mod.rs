pub mod bulk;
pub mod config;
pub mod generate;
pub mod providers;
pub mod translate;
