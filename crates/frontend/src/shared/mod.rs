pub mod api;
pub mod months;
