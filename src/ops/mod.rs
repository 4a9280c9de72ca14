pub mod check;
pub mod layout;
pub mod menu;
pub mod names;
pub mod navigate;
pub mod track_ops;
