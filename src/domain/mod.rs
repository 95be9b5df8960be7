//! Domain types for the CRM record tables.

pub mod delegate;
pub mod error;
pub mod ids;
pub mod record;
pub mod table;
pub mod validation;

pub use delegate::{DelegationMode, DelegationPolicy, RemoteDelegate};
pub use error::{CrmError, CrmResult};
pub use ids::{IdGenerator, IdStrategy};
pub use record::{NewRecord, Record, RecordPatch};
pub use table::{Table, TableName, TableRegistry};
pub use validation::{Command, OperationKind, ValidationOptions};
