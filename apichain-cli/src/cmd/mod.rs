pub mod common;
pub mod history;
pub mod migrate;
pub mod run;
pub mod save;
pub mod validate;
