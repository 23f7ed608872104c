pub mod criteria;
pub mod order;
pub mod validate;
