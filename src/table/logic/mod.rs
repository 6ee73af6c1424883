// src/table/logic/mod.rs
//! Mutating controller operations, one file per operation.

pub mod add_row;
pub mod commit;
pub mod delete_rows;
pub mod revert;
pub mod settle;
pub mod update_cell;

pub use commit::CommitSummary;
pub use delete_rows::DeleteOutcome;
