//! TableRegistry for mapping table names to their in-memory stores.

use crate::domain::table::{seed, Table, TableName};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to one table. Writers serialize on the lock.
pub type SharedTable = Arc<RwLock<Table>>;

/// A registry that maps table names to their stores. Fixed after startup.
#[derive(Default)]
pub struct TableRegistry {
    tables: BTreeMap<TableName, SharedTable>,
}

impl TableRegistry {
    /// Creates a new empty TableRegistry.
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Builds a registry with an empty table for each name, seeding `contact`
    /// with the demo rows when `seed_demo_data` is set.
    pub fn with_tables(names: &[TableName], seed_demo_data: bool) -> Self {
        let mut reg = Self::new();
        for &name in names {
            let table = if seed_demo_data && name == TableName::Contact {
                Table::with_records(seed::demo_contacts())
            } else {
                Table::new()
            };
            reg.register(name, table);
        }
        reg
    }

    /// Registers a table, replacing any previous store under the same name.
    pub fn register(&mut self, name: TableName, table: Table) {
        self.tables.insert(name, Arc::new(RwLock::new(table)));
    }

    /// Exact, case-sensitive lookup. `None` for names that are unknown or not registered.
    pub fn lookup(&self, name: &str) -> Option<(TableName, SharedTable)> {
        let parsed: TableName = name.parse().ok()?;
        self.get(parsed).map(|t| (parsed, t))
    }

    pub fn get(&self, name: TableName) -> Option<SharedTable> {
        self.tables.get(&name).cloned()
    }

    pub fn contains(&self, name: TableName) -> bool {
        self.tables.contains_key(&name)
    }

    /// Returns all registered table names in a stable order.
    pub fn list_tables(&self) -> Vec<TableName> {
        self.tables.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_distinguishes_unknown_from_empty() {
        let reg = TableRegistry::with_tables(&[TableName::Contact, TableName::Lead], true);

        let (name, contact) = reg.lookup("contact").expect("contact registered");
        assert_eq!(name, TableName::Contact);
        assert_eq!(contact.read().await.len(), 3);

        let (_, lead) = reg.lookup("lead").expect("lead registered");
        assert!(lead.read().await.is_empty());

        assert!(reg.lookup("account").is_none());
        assert!(reg.lookup("opportunity").is_none());
        assert!(reg.lookup("CONTACT").is_none());
    }

    #[test]
    fn lists_in_declaration_order() {
        let reg = TableRegistry::with_tables(&[TableName::Lead, TableName::Contact], false);
        assert_eq!(reg.list_tables(), vec![TableName::Contact, TableName::Lead]);
    }
}
