pub mod cli;
pub mod commands;
pub mod config;
pub mod dimensions;
pub mod engine;
pub mod files;
mod menu;
pub mod operations;
pub mod presets;

pub use cli::VideoCommands;
pub use commands::handle_video_command;
pub use config::VideoToolConfig;
