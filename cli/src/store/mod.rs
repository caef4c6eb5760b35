pub mod discovery;
pub mod path_store;
