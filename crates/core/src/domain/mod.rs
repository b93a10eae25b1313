pub mod ingredient;
pub mod money;
pub mod plan;
pub mod quote;
