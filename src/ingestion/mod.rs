pub mod rows;

pub use rows::{normalize_rows, RawTradeRow, REQUIRED_COLUMNS, WALLET_TRADES_SCHEMA_VERSION};
