pub mod check;
pub mod import;
pub mod move_ops;
pub mod search;
pub mod sheet_ops;
pub mod stats;
pub mod undo;
