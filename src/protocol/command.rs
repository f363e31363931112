use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Instrument identifier sent as `EXCHANGE:SECURITY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub exchange: String,
    pub security: String,
}

impl Symbol {
    pub fn new(exchange: impl Into<String>, security: impl Into<String>) -> ChartResult<Self> {
        let symbol = Self {
            exchange: exchange.into(),
            security: security.into(),
        };
        symbol.validate()?;
        Ok(symbol)
    }

    /// Parses `"EXCHANGE:SECURITY"`; surrounding whitespace is ignored.
    pub fn parse(input: &str) -> ChartResult<Self> {
        let (exchange, security) = input.trim().split_once(':').ok_or_else(|| {
            ChartError::InvalidData(format!("symbol `{input}` must be EXCHANGE:SECURITY"))
        })?;
        Self::new(exchange.trim(), security.trim())
    }

    fn validate(&self) -> ChartResult<()> {
        for (name, part) in [("exchange", &self.exchange), ("security", &self.security)] {
            if part.is_empty() {
                return Err(ChartError::InvalidData(format!(
                    "symbol {name} must not be empty"
                )));
            }
            if part.contains(['|', ':']) || part.chars().any(char::is_whitespace) {
                return Err(ChartError::InvalidData(format!(
                    "symbol {name} `{part}` contains a reserved character"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.exchange, self.security)
    }
}

impl FromStr for Symbol {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Request category; used to match a reply to the outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Init,
    Latest,
    Analysis,
    Search,
}

impl RequestKind {
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Latest => "latest",
            Self::Analysis => "analysis",
            Self::Search => "search",
        }
    }
}

/// Plaintext command sent to the server as `verb|argument`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Full candle series.
    Init(Symbol),
    /// Most recent candle.
    Latest(Symbol),
    /// Analysis overlay.
    Analysis(Symbol),
    /// Symbol lookup by prefix.
    Search(String),
}

impl Command {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Init(_) => RequestKind::Init,
            Self::Latest(_) => RequestKind::Latest,
            Self::Analysis(_) => RequestKind::Analysis,
            Self::Search(_) => RequestKind::Search,
        }
    }

    /// Builds the command of `kind` for `symbol`; `None` for search.
    #[must_use]
    pub fn for_symbol(kind: RequestKind, symbol: &Symbol) -> Option<Self> {
        match kind {
            RequestKind::Init => Some(Self::Init(symbol.clone())),
            RequestKind::Latest => Some(Self::Latest(symbol.clone())),
            RequestKind::Analysis => Some(Self::Analysis(symbol.clone())),
            RequestKind::Search => None,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Init(symbol) | Self::Latest(symbol) | Self::Analysis(symbol) => Some(symbol),
            Self::Search(_) => None,
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let verb = self.kind().verb();
        match self {
            Self::Init(symbol) | Self::Latest(symbol) | Self::Analysis(symbol) => {
                format!("{verb}|{symbol}")
            }
            Self::Search(query) => format!("{verb}|{query}"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
