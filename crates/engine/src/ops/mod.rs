use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod expenses;
mod options;
mod references;

pub use expenses::{ExpenseFilter, ExpensePage};
pub use options::ReferenceOptions;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Expense ids are UUIDs; anything else cannot name a stored record.
fn parse_expense_id(id: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| EngineError::KeyNotFound(format!("expense {id}")))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
