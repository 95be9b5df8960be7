pub mod app;
pub mod domain;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{ApexDelegate, CrudEngine, Outcome, Served};
pub use domain::{
    Command, CrmError, CrmResult, DelegationMode, DelegationPolicy, OperationKind, Record,
    RemoteDelegate, TableName, TableRegistry,
};
pub use infra::config::AppConfig;
pub use infra::salesforce::{RemoteApi, SalesforceClient};
