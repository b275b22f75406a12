//! The filter AST: one predicate per item, combined into nested sets.

pub mod operator;
pub mod set;
pub mod value;

pub use operator::FilterOperator;
pub use set::{Conjunction, FilterItem, FilterNode, FilterSet};
pub use value::{FilterValue, Literal};
