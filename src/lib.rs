//! candleview: headless candlestick chart layout engine and market-data
//! client core.
//!
//! The crate is split bottom-up: `core` holds pure coordinate math and the
//! data model, `api` composes a frame layout and render frame, `render`
//! draws it, and `protocol`/`session`/`transport`/`client` keep the series
//! in sync with the server.

pub mod api;
pub mod client;
pub mod core;
pub mod error;
pub mod interaction;
pub mod protocol;
pub mod render;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use api::{ChartView, FrameLayout, LayoutConfig, RenderStyle};
pub use client::{ChartClient, ClientConfig};
pub use error::{ChartError, ChartResult};
pub use session::{ChartSession, ConnectionStatus, SessionConfig};
