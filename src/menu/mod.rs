pub mod search;
pub mod session;
pub mod tree;
