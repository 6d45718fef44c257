pub mod consts;
pub mod handlers;
pub mod message_types;
pub mod models;
pub mod reaper;
pub mod requests;
pub mod responses;
pub mod services;
