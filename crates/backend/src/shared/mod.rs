pub mod amocrm;
pub mod config;
