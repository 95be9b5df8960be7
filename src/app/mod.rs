pub mod apex_delegate;
pub mod crud_engine;

pub use apex_delegate::{ApexCall, ApexDelegate};
pub use crud_engine::{CrudEngine, Outcome, Served};
