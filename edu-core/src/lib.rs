pub mod catalog;
pub mod demographics;
pub mod filters;
pub mod selection;
