//! Compiles free-text Vietnamese lottery wager messages into priced bets
//! and settles them against draw results.
//!
//! The pipeline is pure and synchronous: [`normalizer`] cleans the text,
//! [`parser`] reads statements, [`expander`] fans them out into atomic
//! bets, [`pricing`] charges them and [`settlement`] pays them out.
//! Registry, rates and draw results are read-only inputs passed by
//! reference into every call.

pub mod error;
pub mod expander;
pub mod message;
pub mod normalizer;
pub mod parser;
pub mod pricing;
pub mod prize;
pub mod rates;
pub mod registry;
pub mod settlement;
pub mod types;
pub mod utils;

pub use error::{ParseError, ParseErrorKind, Result, XosoError};
pub use message::{MessageCompiler, ParseOutcome, parse_message};
pub use prize::{DrawResultMap, HeadTier, PrizeMap, PrizeTier};
pub use rates::{RateCategory, RateSettings, RateTable};
pub use registry::Registry;
pub use settlement::{
    DaScope, PairWinPolicy, Settlement, SettlementOptions, TicketSettlement, settle_bet,
    settle_bet_with, settle_ticket,
};
pub use types::{BetKind, BetType, ParsedBet, Point, Province, Region};
