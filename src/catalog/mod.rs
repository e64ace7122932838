pub mod entry;
pub mod nicify;
pub mod registry;
