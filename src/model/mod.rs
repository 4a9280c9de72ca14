pub mod archetype;
pub mod config;
pub mod event;
pub mod media;
pub mod timeline;
pub mod track;

pub use archetype::*;
pub use config::*;
pub use event::*;
pub use media::*;
pub use timeline::*;
pub use track::*;
