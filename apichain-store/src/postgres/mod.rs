mod events;
mod history;
mod migrate;
mod store;
mod workflows;

pub use migrate::run_migrations;
pub use store::PostgresStore;
