//! Text protocol spoken with the market-data server.
//!
//! Requests are `verb|argument` strings; replies are JSON objects told apart
//! by their top-level key, or a JSON array for symbol search.

mod command;
mod message;
mod wire;

pub use command::{Command, RequestKind, Symbol};
pub use message::{ChartSnapshot, SearchResults, ServerMessage, UNCODED_PATTERN, decode_message};
