pub mod errors;
pub mod events;
pub mod models;
pub mod parser;
pub mod scheduler;
pub mod stage;
pub mod state;
