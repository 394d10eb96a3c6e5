pub mod audit;
pub mod layout;
