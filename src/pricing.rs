//! What the player owes for a bet.
//!
//! Face value is built from the point (thousands), the number of lô slots
//! a bet covers and the number of stations, then multiplied by the
//! category's price percentage. Rounding happens once, on the total.

use crate::rates::{RateCategory, RateSettings};
use crate::types::{BetKind, ParsedBet, Point, Region};
use crate::utils::pair_count;

/// Money per point.
pub const UNIT: f64 = 1000.0;

/// Number of lô slots in a draw for `digits`-long numbers.
pub fn lo_count(digits: usize, region: Region) -> u32 {
    match (digits, region) {
        (2, Region::MB) => 27,
        (3, Region::MB) => 23,
        (4, Region::MB) => 20,
        (2, _) => 18,
        (3, _) => 17,
        (4, _) => 16,
        _ => 0,
    }
}

fn station_multiplier(province_count: usize) -> f64 {
    match province_count {
        0..=2 => 1.0,
        3 => 3.0,
        _ => 6.0,
    }
}

/// Price percent of `category` as a fraction.
fn rate(rates: &RateSettings, region: Region, category: RateCategory) -> f64 {
    rates.price(region, category) / 100.0
}

/// Charged value of a single head/tail leg on one number, unrounded.
fn single_leg(
    kind: BetKind,
    number: &str,
    point: Point,
    stations: f64,
    rates: &RateSettings,
    region: Region,
) -> f64 {
    match RateCategory::for_bet(kind, number.len()) {
        Some(category) => point.as_f64() * UNIT * stations * rate(rates, region, category),
        None => 0.0,
    }
}

/// Base face value of one đá pair: both numbers across every 2-digit slot.
fn kick_base(region: Region) -> f64 {
    UNIT * f64::from(lo_count(2, region)) * 2.0
}

fn face_value(
    kind: BetKind,
    numbers: &[String],
    point: Point,
    province_count: usize,
    rates: &RateSettings,
    region: Region,
) -> f64 {
    let stations = province_count as f64;
    match kind {
        BetKind::Da | BetKind::DaThang => {
            let combinations = pair_count(numbers.len()) as f64;
            kick_base(region)
                * combinations
                * point.as_f64()
                * stations
                * rate(rates, region, RateCategory::Da)
        }
        BetKind::DaXien => {
            let combinations = pair_count(numbers.len()) as f64;
            kick_base(region)
                * combinations
                * 2.0
                * point.as_f64()
                * station_multiplier(province_count)
                * rate(rates, region, RateCategory::Dx)
        }
        BetKind::BaoLo | BetKind::BaoDao => numbers
            .iter()
            .map(|number| {
                let digits = number.len();
                match RateCategory::for_bet(kind, digits) {
                    Some(category) => {
                        point.as_f64()
                            * UNIT
                            * f64::from(lo_count(digits, region))
                            * stations
                            * rate(rates, region, category)
                    }
                    None => 0.0,
                }
            })
            .sum(),
        BetKind::DauDuoi => numbers
            .iter()
            .map(|n| {
                single_leg(BetKind::Dau, n, point, stations, rates, region)
                    + single_leg(BetKind::Duoi, n, point, stations, rates, region)
            })
            .sum(),
        BetKind::XiuChu | BetKind::XiuChuDao => numbers
            .iter()
            .map(|n| {
                single_leg(BetKind::XiuChuDau, n, point, stations, rates, region)
                    + single_leg(BetKind::XiuChuDuoi, n, point, stations, rates, region)
            })
            .sum(),
        BetKind::Dau
        | BetKind::Duoi
        | BetKind::XiuChuDau
        | BetKind::XiuChuDuoi
        | BetKind::XiuChuDaoDau
        | BetKind::XiuChuDaoDuoi => numbers
            .iter()
            .map(|n| single_leg(kind, n, point, stations, rates, region))
            .sum(),
    }
}

/// Amount owed for `numbers` bet as `kind` on `province_count` stations.
pub fn price(
    kind: BetKind,
    numbers: &[String],
    point: Point,
    province_count: usize,
    rates: &RateSettings,
    region: Region,
) -> i64 {
    face_value(kind, numbers, point, province_count, rates, region).round() as i64
}

pub fn price_bet(bet: &ParsedBet, rates: &RateSettings, region: Region) -> i64 {
    price(
        bet.bet_type,
        &bet.numbers,
        bet.point,
        bet.provinces.len(),
        rates,
        region,
    )
}
