pub mod app;
pub mod assets;
pub mod config;
pub mod environment;
pub mod interaction;
pub mod placement;
pub mod render;
pub mod scene;
pub mod ui;
