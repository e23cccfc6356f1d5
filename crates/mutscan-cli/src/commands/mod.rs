pub mod generate;
pub mod partition;
