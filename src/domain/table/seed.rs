use crate::domain::record::{NewRecord, Record};

fn contact(id: &str, first: &str, last: &str, email: &str) -> Record {
    Record::new(
        id,
        NewRecord {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
        },
    )
}

/// The three demo contacts the mock service has always started with.
pub fn demo_contacts() -> Vec<Record> {
    vec![
        contact("001", "John", "Doe", "john@example.com"),
        contact("002", "Jane", "Smith", "jane@example.com"),
        contact("003", "Sam", "Wilson", "sam@example.com"),
    ]
}
