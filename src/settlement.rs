//! Settles bets against published draw results.
//!
//! Head, tail and lô bets count exact matches of each number among the
//! digits their prize tiers yield. Đá pays for pairs of numbers that both
//! came out. Đá xiên pools every station of the bet and pays the largest
//! combination first, then smaller combinations only out of what that
//! largest one left over.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::XosoError;
use crate::pricing::UNIT;
use crate::prize::{DrawResultMap, HeadTier, PrizeMap, digits_for, lo_digits};
use crate::rates::{RateCategory, RateSettings};
use crate::types::{BetKind, ParsedBet, Region};
use crate::utils::compact_key;

/// Payout multiplier for a Đá xiên pair. Triples pay twice this, quads
/// four times.
// TODO: switch to the configured `windx` rate once product confirms the
// fixed figure is unintended.
pub const DA_XIEN_BASE_RATE: f64 = 550.0;

/// How a winning Đá pair is counted from its two frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairWinPolicy {
    /// `min(c1, c2)`
    #[default]
    MinCount,
    /// `0.5 * c1 + 0.5 * c2`
    HalfCount,
}

impl PairWinPolicy {
    /// Count for one pair; zero unless both numbers came out.
    pub fn pair_count(self, c1: u32, c2: u32) -> f64 {
        if c1 == 0 || c2 == 0 {
            return 0.0;
        }
        match self {
            PairWinPolicy::MinCount => f64::from(c1.min(c2)),
            PairWinPolicy::HalfCount => 0.5 * f64::from(c1) + 0.5 * f64::from(c2),
        }
    }
}

impl FromStr for PairWinPolicy {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_key(s).as_str() {
            "min" | "mincount" => Ok(PairWinPolicy::MinCount),
            "half" | "halfcount" => Ok(PairWinPolicy::HalfCount),
            _ => Err(XosoError::InvalidOption(s.to_string())),
        }
    }
}

/// Which draws a Đá bet's pairs are looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DaScope {
    /// Each station on its own; wins add up.
    #[default]
    PerProvince,
    /// All stations of the bet pooled into one frequency map.
    Combined,
}

impl FromStr for DaScope {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_key(s).as_str() {
            "province" | "perprovince" => Ok(DaScope::PerProvince),
            "combined" | "global" => Ok(DaScope::Combined),
            _ => Err(XosoError::InvalidOption(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementOptions {
    pub pair_policy: PairWinPolicy,
    pub da_scope: DaScope,
    pub head_tier: HeadTier,
}

impl SettlementOptions {
    /// Multi-station settlement of a whole result day.
    pub fn global() -> Self {
        Self {
            pair_policy: PairWinPolicy::MinCount,
            da_scope: DaScope::Combined,
            ..Self::default()
        }
    }

    /// Per-ticket batch settlement.
    pub fn batch() -> Self {
        Self {
            pair_policy: PairWinPolicy::HalfCount,
            da_scope: DaScope::PerProvince,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settlement {
    #[serde(rename = "winCount")]
    pub win_count: f64,
    #[serde(rename = "winAmount")]
    pub win_amount: i64,
}

impl Settlement {
    pub fn is_win(&self) -> bool {
        self.win_count > 0.0
    }
}

/// Totals over a settled ticket.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TicketSettlement {
    #[serde(rename = "winCount")]
    pub win_count: f64,
    #[serde(rename = "winAmount")]
    pub win_amount: i64,
    #[serde(rename = "winningBets")]
    pub winning_bets: usize,
}

/// Unrounded count and payout, summed before the single rounding.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    count: f64,
    amount: f64,
}

impl Tally {
    fn add(&mut self, other: Tally) {
        self.count += other.count;
        self.amount += other.amount;
    }

    fn settle(self) -> Settlement {
        Settlement {
            win_count: self.count,
            win_amount: self.amount.round() as i64,
        }
    }
}

fn station_draws<'d>(bet: &ParsedBet, draws: &'d DrawResultMap) -> Vec<&'d PrizeMap> {
    bet.provinces
        .iter()
        .filter_map(|name| {
            let prizes = draws.province(name);
            if prizes.is_none() {
                tracing::debug!(province = %name, "no draw result for station");
            }
            prizes
        })
        .collect()
}

type Frequencies = HashMap<String, u32>;

fn frequencies<'p>(stations: impl IntoIterator<Item = &'p PrizeMap>) -> Frequencies {
    let mut counts = Frequencies::new();
    for prizes in stations {
        for digits in lo_digits(prizes, 2) {
            *counts.entry(digits).or_insert(0) += 1;
        }
    }
    counts
}

fn frequency(counts: &Frequencies, number: &str) -> u32 {
    counts.get(number).copied().unwrap_or(0)
}

/// Settles with [`SettlementOptions::default`].
pub fn settle_bet(
    bet: &ParsedBet,
    draws: &DrawResultMap,
    rates: &RateSettings,
    region: Region,
) -> Settlement {
    settle_bet_with(bet, draws, rates, region, SettlementOptions::default())
}

pub fn settle_bet_with(
    bet: &ParsedBet,
    draws: &DrawResultMap,
    rates: &RateSettings,
    region: Region,
    options: SettlementOptions,
) -> Settlement {
    let stations = station_draws(bet, draws);
    let point = bet.point.as_f64();
    let matches = |kind| settle_matches(kind, bet, &stations, rates, region, options.head_tier);
    let tally = match bet.bet_type {
        BetKind::Da | BetKind::DaThang => settle_kick(bet, &stations, rates, region, options),
        BetKind::DaXien => settle_crossed(bet, &stations),
        BetKind::DauDuoi => {
            let mut tally = matches(BetKind::Dau);
            tally.add(matches(BetKind::Duoi));
            tally
        }
        BetKind::XiuChu | BetKind::XiuChuDao => {
            let mut tally = matches(BetKind::XiuChuDau);
            tally.add(matches(BetKind::XiuChuDuoi));
            tally
        }
        BetKind::XiuChuDaoDau => matches(BetKind::XiuChuDau),
        BetKind::XiuChuDaoDuoi => matches(BetKind::XiuChuDuoi),
        BetKind::BaoDao => matches(BetKind::BaoLo),
        BetKind::Dau
        | BetKind::Duoi
        | BetKind::BaoLo
        | BetKind::XiuChuDau
        | BetKind::XiuChuDuoi => matches(bet.bet_type),
    };
    let settlement = Tally {
        count: tally.count,
        amount: tally.amount * point * UNIT,
    }
    .settle();
    if settlement.is_win() {
        tracing::debug!(
            bet_type = %bet.bet_type,
            numbers = ?bet.numbers,
            win_count = settlement.win_count,
            win_amount = settlement.win_amount,
            "bet won"
        );
    }
    settlement
}

/// Exact matches of every number. `amount` is per unit point.
fn settle_matches(
    kind: BetKind,
    bet: &ParsedBet,
    stations: &[&PrizeMap],
    rates: &RateSettings,
    region: Region,
    head: HeadTier,
) -> Tally {
    let mut tally = Tally::default();
    for number in &bet.numbers {
        let Some(category) = RateCategory::for_bet(kind, number.len()) else {
            continue;
        };
        let tier = head.tier(region, number.len());
        let hits = stations
            .iter()
            .map(|prizes| {
                digits_for(kind, number.len(), prizes, tier)
                    .iter()
                    .filter(|digits| *digits == number)
                    .count()
            })
            .sum::<usize>() as f64;
        tally.add(Tally {
            count: hits,
            amount: hits * rates.win(region, category),
        });
    }
    tally
}

fn kick_pairs(numbers: &[String], counts: &Frequencies, policy: PairWinPolicy) -> f64 {
    let mut total = 0.0;
    for (i, first) in numbers.iter().enumerate() {
        for second in &numbers[i + 1..] {
            total += policy.pair_count(frequency(counts, first), frequency(counts, second));
        }
    }
    total
}

fn settle_kick(
    bet: &ParsedBet,
    stations: &[&PrizeMap],
    rates: &RateSettings,
    region: Region,
    options: SettlementOptions,
) -> Tally {
    let count = match options.da_scope {
        DaScope::Combined => {
            let counts = frequencies(stations.iter().copied());
            kick_pairs(&bet.numbers, &counts, options.pair_policy)
        }
        DaScope::PerProvince => stations
            .iter()
            .map(|prizes| kick_pairs(&bet.numbers, &frequencies([*prizes]), options.pair_policy))
            .sum(),
    };
    Tally {
        count,
        amount: count * rates.win(region, RateCategory::Da),
    }
}

/// Index subsets of `0..n` with exactly `size` members.
fn subsets(n: usize, size: usize) -> Vec<Vec<usize>> {
    (0u32..(1 << n))
        .filter(|mask| mask.count_ones() as usize == size)
        .map(|mask| (0..n).filter(|i| mask & (1 << i) != 0).collect())
        .collect()
}

/// Rate for a winning combination of `size` numbers.
fn crossed_rate(size: usize) -> f64 {
    DA_XIEN_BASE_RATE * f64::from(1u32 << (size - 2))
}

fn settle_crossed(bet: &ParsedBet, stations: &[&PrizeMap]) -> Tally {
    let n = bet.numbers.len();
    if !(2..=4).contains(&n) {
        tracing::debug!(numbers = n, "crossed bet outside 2 to 4 numbers, nothing to settle");
        return Tally::default();
    }

    let counts = frequencies(stations.iter().copied());
    let freq: Vec<u32> = bet.numbers.iter().map(|num| frequency(&counts, num)).collect();

    let full = freq.iter().copied().min().unwrap_or(0);
    let mut tally = Tally {
        count: f64::from(full),
        amount: f64::from(full) * crossed_rate(n),
    };

    // Smaller combinations only ride on what the full one left over, but
    // pay on the original frequencies.
    let remainders: Vec<u32> = freq.iter().map(|c| c - full).collect();
    for size in (2..n).rev() {
        for subset in subsets(n, size) {
            if subset.iter().any(|&i| remainders[i] == 0) {
                continue;
            }
            let won = subset.iter().map(|&i| freq[i]).min().unwrap_or(0);
            tally.add(Tally {
                count: f64::from(won),
                amount: f64::from(won) * crossed_rate(size),
            });
        }
    }
    tally
}

/// Settles every bet of a ticket in place and returns the totals.
pub fn settle_ticket(
    bets: &mut [ParsedBet],
    draws: &DrawResultMap,
    rates: &RateSettings,
    region: Region,
    options: SettlementOptions,
) -> TicketSettlement {
    let mut totals = TicketSettlement::default();
    if draws.is_empty() {
        tracing::warn!(%region, "settling against an empty draw result");
    }
    for bet in bets.iter_mut() {
        let settlement = settle_bet_with(bet, draws, rates, region, options);
        bet.win_count = Some(settlement.win_count);
        bet.win_amount = Some(settlement.win_amount);
        totals.win_count += settlement.win_count;
        totals.win_amount += settlement.win_amount;
        if settlement.is_win() {
            totals.winning_bets += 1;
        }
    }
    tracing::info!(
        bets = bets.len(),
        winning = totals.winning_bets,
        win_amount = totals.win_amount,
        "ticket settled"
    );
    totals
}
