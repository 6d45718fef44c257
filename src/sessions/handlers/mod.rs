pub mod points;
pub mod selection;
pub mod session;
pub mod ws;
