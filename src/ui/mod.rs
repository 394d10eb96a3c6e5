pub mod console;
pub mod printer;
pub mod progress;
pub mod table;
