pub mod confidence_matrix;
pub mod summary;

pub use confidence_matrix::ConfidenceMatrix;
pub use summary::SelfCheckSummary;
