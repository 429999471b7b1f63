pub mod catalog;
pub mod lead;
pub mod selection;
