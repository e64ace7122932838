pub mod catalog;
pub mod graph_utils;
pub mod gui;
pub mod menu;
pub mod persistence;
