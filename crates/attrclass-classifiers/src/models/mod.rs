pub mod builder;
pub mod classifier_trait;
pub mod factory;
pub mod j48;
pub mod zero_r;
