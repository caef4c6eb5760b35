pub mod console;
pub mod writer;
