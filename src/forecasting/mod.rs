pub mod config;
pub mod optimization;
pub mod processor;
pub mod processor_enums;
pub mod sarima;
pub mod series;
