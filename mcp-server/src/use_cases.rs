use anyhow::Result;
use chrono::Datelike;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use xoso_engine::pricing::price_bet;
use xoso_engine::{MessageCompiler, ParsedBet, SettlementOptions, settle_bet_with, settle_ticket};

use crate::loader::Snapshots;
use crate::types::{ProvinceSummary, SettledTicket};
use crate::utils::{draw_date, region, required, required_str};

fn settlement_options(
    arguments: &HashMap<String, Value>,
    defaults: SettlementOptions,
) -> Result<SettlementOptions> {
    let mut options = defaults;
    if let Some(policy) = arguments.get("pair_policy").and_then(|v| v.as_str()) {
        options.pair_policy = policy.parse()?;
    }
    if let Some(scope) = arguments.get("da_scope").and_then(|v| v.as_str()) {
        options.da_scope = scope.parse()?;
    }
    if let Some(head) = arguments.get("head_tier").and_then(|v| v.as_str()) {
        options.head_tier = head.parse()?;
    }
    Ok(options)
}

pub struct BetUseCase {
    snapshots: Arc<Snapshots>,
}

impl BetUseCase {
    pub fn new(snapshots: Arc<Snapshots>) -> Self {
        Self { snapshots }
    }

    pub async fn parse_message(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let message = required_str(arguments, "message")?;
        let date = draw_date(arguments)?;
        let region = region(arguments)?;

        let compiler = MessageCompiler::new(&self.snapshots.registry, &self.snapshots.rates);
        let outcome = compiler.compile(message, region, date);

        Ok(json!({
            "success": outcome.has_bets(),
            "total_amount": outcome.total_amount(),
            "bets": outcome.bets,
            "errors": outcome.errors
        })
        .to_string())
    }

    pub async fn quote_bet(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let bet: ParsedBet = serde_json::from_value(required(arguments, "bet")?.clone())?;
        let region = region(arguments)?;

        let amount = price_bet(&bet, &self.snapshots.rates, region);

        Ok(json!({
            "success": true,
            "amount": amount
        })
        .to_string())
    }
}

pub struct SettlementUseCase {
    snapshots: Arc<Snapshots>,
    options: SettlementOptions,
}

impl SettlementUseCase {
    pub fn new(snapshots: Arc<Snapshots>, options: SettlementOptions) -> Self {
        Self { snapshots, options }
    }

    pub async fn settle_bet(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let bet: ParsedBet = serde_json::from_value(required(arguments, "bet")?.clone())?;
        let date = draw_date(arguments)?;
        let region = region(arguments)?;
        let options = settlement_options(arguments, self.options)?;

        let draws = self.snapshots.draws(date, region)?;
        let settlement = settle_bet_with(&bet, &draws, &self.snapshots.rates, region, options);

        Ok(json!({
            "success": true,
            "final": !draws.is_empty(),
            "winCount": settlement.win_count,
            "winAmount": settlement.win_amount
        })
        .to_string())
    }

    pub async fn settle_ticket(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let mut bets: Vec<ParsedBet> =
            serde_json::from_value(required(arguments, "bets")?.clone())?;
        let date = draw_date(arguments)?;
        let region = region(arguments)?;
        let options = settlement_options(arguments, self.options)?;

        let draws = self.snapshots.draws(date, region)?;
        let totals = settle_ticket(&mut bets, &draws, &self.snapshots.rates, region, options);

        let ticket = SettledTicket {
            bets,
            totals,
            is_final: !draws.is_empty(),
        };
        Ok(json!({
            "success": true,
            "ticket": ticket
        })
        .to_string())
    }
}

pub struct RegistryUseCase {
    snapshots: Arc<Snapshots>,
}

impl RegistryUseCase {
    pub fn new(snapshots: Arc<Snapshots>) -> Self {
        Self { snapshots }
    }

    pub async fn list_provinces(&self, arguments: &HashMap<String, Value>) -> Result<String> {
        let date = draw_date(arguments)?;
        let region = region(arguments)?;
        let weekday = date.weekday().num_days_from_sunday() as u8;

        let provinces: Vec<ProvinceSummary> = self
            .snapshots
            .registry
            .provinces_for_day(region, date)
            .into_iter()
            .filter_map(|p| {
                p.ordering_on(weekday)
                    .map(|ordering| ProvinceSummary::new(p, ordering))
            })
            .collect();

        Ok(json!({
            "success": true,
            "region": region,
            "date": date.format("%Y-%m-%d").to_string(),
            "provinces": provinces
        })
        .to_string())
    }
}
