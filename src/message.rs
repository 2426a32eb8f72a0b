//! End-to-end compilation of a wager message: normalize, parse, expand,
//! price.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::expander::expand;
use crate::normalizer::Normalizer;
use crate::parser::{ParseContext, Parser};
use crate::pricing::price_bet;
use crate::rates::RateSettings;
use crate::registry::Registry;
use crate::types::{ParsedBet, Region};

/// Priced bets plus every statement-level problem found on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub bets: Vec<ParsedBet>,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn total_amount(&self) -> i64 {
        self.bets.iter().map(|b| b.amount).sum()
    }

    /// At least one bet made it through.
    pub fn has_bets(&self) -> bool {
        !self.bets.is_empty()
    }
}

/// Compiles messages against one registry and rate snapshot. Alias tables
/// are built once and reused across messages.
pub struct MessageCompiler<'a> {
    registry: &'a Registry,
    rates: &'a RateSettings,
    normalizer: Normalizer,
}

impl<'a> MessageCompiler<'a> {
    pub fn new(registry: &'a Registry, rates: &'a RateSettings) -> Self {
        Self {
            registry,
            rates,
            normalizer: Normalizer::new(registry.provinces(), registry.bet_types()),
        }
    }

    pub fn compile(&self, raw: &str, region: Region, draw_date: NaiveDate) -> ParseOutcome {
        let ctx = ParseContext::for_draw(self.registry, region, draw_date);
        let normalized = self.normalizer.normalize(raw, &ctx.stations);
        let parsed = Parser::new(&ctx).parse(&normalized);

        let mut outcome = ParseOutcome {
            bets: Vec::new(),
            errors: parsed.errors,
        };
        for statement in &parsed.bets {
            let (bets, errors) = expand(statement, &ctx);
            outcome.bets.extend(bets);
            outcome.errors.extend(errors);
        }
        for bet in &mut outcome.bets {
            bet.amount = price_bet(bet, self.rates, region);
        }

        tracing::debug!(
            %region,
            date = %draw_date,
            bets = outcome.bets.len(),
            errors = outcome.errors.len(),
            amount = outcome.total_amount(),
            "message compiled"
        );
        outcome
    }
}

/// One-shot form of [`MessageCompiler::compile`].
pub fn parse_message(
    raw: &str,
    registry: &Registry,
    rates: &RateSettings,
    region: Region,
    draw_date: NaiveDate,
) -> ParseOutcome {
    MessageCompiler::new(registry, rates).compile(raw, region, draw_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::registry::fixtures;
    use crate::types::{BetKind, Point};

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn test_compile_prices_every_bet() {
        let registry = fixtures::registry();
        let rates = RateSettings::default();
        let outcome = parse_message("VL 12 34 dd 1", &registry, &rates, Region::MN, friday());
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.bets.len(), 4);
        assert!(outcome.bets.iter().all(|b| b.amount == 750));
        assert_eq!(outcome.total_amount(), 3000);
    }

    #[test]
    fn test_compile_keeps_good_statements_next_to_errors() {
        let registry = fixtures::registry();
        let rates = RateSettings::default();
        let outcome = parse_message(
            "vl 12 b 2n, bd 123 xc",
            &registry,
            &rates,
            Region::MN,
            friday(),
        );
        assert!(outcome.has_bets());
        assert_eq!(outcome.bets[0].bet_type, BetKind::BaoLo);
        assert_eq!(outcome.bets[0].point, Point::whole(2));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, ParseErrorKind::SyntaxIncomplete);
    }

    #[test]
    fn test_compiler_reused_across_messages() {
        let registry = fixtures::registry();
        let rates = RateSettings::default();
        let compiler = MessageCompiler::new(&registry, &rates);
        let first = compiler.compile("vl 12 b 1", Region::MN, friday());
        let second = compiler.compile("hp 12 b 1", Region::MB, friday());
        assert_eq!(first.bets[0].amount, 13_500);
        assert_eq!(second.bets[0].provinces, vec!["Hải Phòng"]);
        assert_eq!(second.bets[0].amount, 20_250);
    }

    #[test]
    fn test_outcome_serializes_with_wire_names() {
        let registry = fixtures::registry();
        let rates = RateSettings::default();
        let outcome = parse_message("vl 12 dau 1", &registry, &rates, Region::MN, friday());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["bets"][0]["type"], "Đầu");
        assert_eq!(json["bets"][0]["numbers"][0], "12");
        assert_eq!(json["bets"][0]["amount"], 750);
        assert!(json["bets"][0].get("winCount").is_none());
    }
}
