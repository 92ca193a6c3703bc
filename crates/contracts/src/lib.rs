pub mod amo;
pub mod reports;
