pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod router;
pub mod server;
pub mod service;
pub mod store;

pub use config::ServerConfig;
pub use error::{ApiError, Result, StoreError};
pub use models::{Document, Expense};
pub use router::create_router;
pub use server::{bind_listener, init_tracing, run_server};
pub use service::ExpenseService;
pub use store::{ExpenseStore, FileExpenseStore};
