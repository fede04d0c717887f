pub mod deadline;
pub mod errors;
pub mod validations;

pub use deadline::with_deadline;
pub use errors::*;
pub use validations::*;
