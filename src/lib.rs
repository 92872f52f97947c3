pub mod app;
pub mod config;
pub mod dom;
pub mod errors;
pub mod events;
pub mod fetch;
pub mod github;
pub mod links;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod server;
pub mod service;
pub mod template;
pub mod view;
