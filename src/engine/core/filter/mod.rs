pub mod engine;
pub mod expression;

pub use engine::filter_feature_table;
pub use expression::{CompareOp, FilterExpression};

#[cfg(test)]
mod engine_test;
#[cfg(test)]
mod expression_test;
