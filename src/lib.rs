pub mod clean;
pub mod dataset;
pub mod kpis;
pub mod persist;
pub mod sample;
