//! Data source implementations.

pub mod datagov;
pub mod file;
pub mod synthetic;

pub use datagov::DataGovSource;
pub use file::FileSource;
pub use synthetic::SyntheticSource;
