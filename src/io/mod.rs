pub mod config_io;
pub mod lock;
pub mod name_codec;
pub mod state;
pub mod timeline_io;
pub mod watcher;
