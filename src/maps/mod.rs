//! The location picker: library loading, map lifecycle, marker synchronization and the
//! coordinate the user is choosing.

pub mod backend;
pub mod consts;
pub mod coords;
pub mod document;
pub mod geolocation;
pub mod library;
pub mod lifecycle;
pub mod markers;
pub mod models;
