pub mod fees;
pub mod investment;
