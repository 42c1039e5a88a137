// Normalization pipeline and the canonical table it produces

pub mod normalize;
pub mod table;

pub use normalize::RecordNormalizer;
pub use table::{CanonicalTable, Cell, EmployeeRow, NormalizationReport};
