pub mod app;
pub mod cache;
pub mod charts;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod prepare;
pub mod render;
pub mod server;
pub mod view;
