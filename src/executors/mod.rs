pub mod command;
pub mod toolchain;

#[cfg(test)]
pub mod testing;
