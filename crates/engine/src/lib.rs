pub use error::EngineError;
pub use expenses::Expense;
pub use ops::{Engine, EngineBuilder, ExpenseFilter, ExpensePage, ReferenceOptions};
pub use report::{ExpenseReport, REPORT_HEADERS, ReportRow};
pub use validation::{ExpenseFields, NumericInput, derive_total};

mod clients;
mod error;
mod expenses;
mod locations;
mod ops;
mod report;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;
