pub mod enrollment;
pub mod payment;
