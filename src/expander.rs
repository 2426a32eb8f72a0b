//! Fans a parsed statement out into atomic bets.

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::ParseContext;
use crate::rates::RateCategory;
use crate::types::{BetKind, ParsedBet, Province, RawBet, Region};
use crate::utils::permutations;

/// Stations a Đá xiên must cover.
const CROSSED_STATIONS: usize = 2;

#[derive(Debug, Default)]
struct Expansion {
    bets: Vec<ParsedBet>,
    errors: Vec<ParseError>,
}

impl Expansion {
    fn emit(&mut self, raw: &RawBet, kind: BetKind, numbers: Vec<String>) {
        self.bets
            .push(ParsedBet::new(numbers, kind, raw.point, raw.provinces.clone()));
    }

    fn reject(&mut self, raw: &RawBet, kind: ParseErrorKind, message: String) {
        tracing::debug!(bet_type = %raw.bet_type, ?kind, reason = %message, "statement rejected");
        self.errors.push(
            ParseError::new(kind, message)
                .with_bet_type(raw.bet_type)
                .with_numbers(&raw.numbers)
                .with_provinces(&raw.provinces),
        );
    }

    /// Keeps the numbers `accepts` allows; every other one is a
    /// cardinality error.
    fn filter_lengths<'r>(
        &mut self,
        raw: &'r RawBet,
        accepts: impl Fn(usize) -> bool,
    ) -> Vec<&'r String> {
        let mut valid = Vec::with_capacity(raw.numbers.len());
        for number in &raw.numbers {
            if accepts(number.len()) {
                valid.push(number);
            } else {
                self.reject(
                    raw,
                    ParseErrorKind::CardinalityViolation,
                    format!(
                        "{} does not accept {}-digit number {}",
                        raw.bet_type,
                        number.len(),
                        number
                    ),
                );
            }
        }
        valid
    }
}

fn accepts(kind: BetKind) -> impl Fn(usize) -> bool {
    move |digits| RateCategory::for_bet(kind, digits).is_some()
}

/// Expands one statement. Stations are the names the parser collected;
/// `ctx.stations` supplies the Đá xiên auto-fill order.
pub fn expand(raw: &RawBet, ctx: &ParseContext<'_>) -> (Vec<ParsedBet>, Vec<ParseError>) {
    let mut out = Expansion::default();

    if raw.bet_type.is_crossed() {
        expand_crossed(raw, ctx.region, &ctx.stations, &mut out);
        return (out.bets, out.errors);
    }

    if raw.provinces.is_empty() {
        tracing::debug!(bet_type = %raw.bet_type, "no station for statement, dropped");
        return (out.bets, out.errors);
    }

    match raw.bet_type {
        BetKind::DauDuoi => {
            for number in out.filter_lengths(raw, accepts(BetKind::Dau)) {
                out.emit(raw, BetKind::Dau, vec![number.clone()]);
                out.emit(raw, BetKind::Duoi, vec![number.clone()]);
            }
        }
        BetKind::XiuChu => {
            for number in out.filter_lengths(raw, |d| d == 3) {
                out.emit(raw, BetKind::XiuChuDau, vec![number.clone()]);
                out.emit(raw, BetKind::XiuChuDuoi, vec![number.clone()]);
            }
        }
        BetKind::XiuChuDao | BetKind::XiuChuDaoDau | BetKind::XiuChuDaoDuoi => {
            let halves: &[BetKind] = match raw.bet_type {
                BetKind::XiuChuDaoDau => &[BetKind::XiuChuDau],
                BetKind::XiuChuDaoDuoi => &[BetKind::XiuChuDuoi],
                _ => &[BetKind::XiuChuDau, BetKind::XiuChuDuoi],
            };
            for number in out.filter_lengths(raw, |d| d == 3) {
                for permutation in permutations(number) {
                    for half in halves {
                        out.emit(raw, *half, vec![permutation.clone()]);
                    }
                }
            }
        }
        BetKind::BaoDao => {
            for number in out.filter_lengths(raw, accepts(BetKind::BaoLo)) {
                for permutation in permutations(number) {
                    out.emit(raw, BetKind::BaoLo, vec![permutation]);
                }
            }
        }
        BetKind::Da | BetKind::DaThang => {
            if raw.numbers.len() < 2 {
                out.reject(
                    raw,
                    ParseErrorKind::CardinalityViolation,
                    format!("{} requires at least 2 numbers", raw.bet_type),
                );
            } else if raw.numbers.iter().any(|n| n.len() != 2) {
                out.reject(
                    raw,
                    ParseErrorKind::CardinalityViolation,
                    format!("{} takes 2-digit numbers only", raw.bet_type),
                );
            } else {
                out.emit(raw, raw.bet_type, raw.numbers.clone());
            }
        }
        BetKind::Dau
        | BetKind::Duoi
        | BetKind::BaoLo
        | BetKind::XiuChuDau
        | BetKind::XiuChuDuoi
        | BetKind::DaXien => {
            for number in out.filter_lengths(raw, accepts(raw.bet_type)) {
                out.emit(raw, raw.bet_type, vec![number.clone()]);
            }
        }
    }

    (out.bets, out.errors)
}

fn expand_crossed(raw: &RawBet, region: Region, priority: &[&Province], out: &mut Expansion) {
    if region == Region::MB {
        out.reject(
            raw,
            ParseErrorKind::RegionViolation,
            format!("{} is not offered in {}", raw.bet_type, region),
        );
        return;
    }
    if !(2..=4).contains(&raw.numbers.len()) {
        out.reject(
            raw,
            ParseErrorKind::CardinalityViolation,
            format!("{} requires 2 to 4 numbers, got {}", raw.bet_type, raw.numbers.len()),
        );
        return;
    }
    if raw.numbers.iter().any(|n| n.len() != 2) {
        out.reject(
            raw,
            ParseErrorKind::CardinalityViolation,
            format!("{} takes 2-digit numbers only", raw.bet_type),
        );
        return;
    }

    let mut provinces = raw.provinces.clone();
    for station in priority {
        if provinces.len() >= CROSSED_STATIONS {
            break;
        }
        if !provinces.contains(&station.name) {
            tracing::debug!(station = %station.name, "auto-assigning station to crossed bet");
            provinces.push(station.name.clone());
        }
    }
    if provinces.len() < CROSSED_STATIONS {
        out.reject(
            raw,
            ParseErrorKind::ResourceShortage,
            format!(
                "{} needs {} stations, only {} available",
                raw.bet_type,
                CROSSED_STATIONS,
                provinces.len()
            ),
        );
        return;
    }

    out.bets.push(ParsedBet::new(
        raw.numbers.clone(),
        raw.bet_type,
        raw.point,
        provinces,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures;
    use crate::types::Point;
    use chrono::NaiveDate;

    fn raw(kind: BetKind, numbers: &[&str], provinces: &[&str]) -> RawBet {
        RawBet {
            numbers: numbers.iter().map(|n| n.to_string()).collect(),
            bet_type: kind,
            point: Point::whole(1),
            provinces: provinces.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn expand_on(raw: &RawBet, region: Region) -> (Vec<ParsedBet>, Vec<ParseError>) {
        let registry = fixtures::registry();
        let friday = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let ctx = ParseContext::for_draw(&registry, region, friday);
        expand(raw, &ctx)
    }

    fn kinds_and_numbers(bets: &[ParsedBet]) -> Vec<(BetKind, String)> {
        bets.iter()
            .map(|b| (b.bet_type, b.numbers.join(",")))
            .collect()
    }

    #[test]
    fn test_dau_duoi_splits_per_number() {
        let (bets, errors) = expand_on(
            &raw(BetKind::DauDuoi, &["12", "34"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert!(errors.is_empty());
        assert_eq!(
            kinds_and_numbers(&bets),
            vec![
                (BetKind::Dau, "12".to_string()),
                (BetKind::Duoi, "12".to_string()),
                (BetKind::Dau, "34".to_string()),
                (BetKind::Duoi, "34".to_string()),
            ]
        );
        assert!(bets.iter().all(|b| b.provinces == vec!["Vĩnh Long"]));
    }

    #[test]
    fn test_xiu_chu_requires_three_digits() {
        let (bets, errors) = expand_on(
            &raw(BetKind::XiuChu, &["123", "45"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].bet_type, BetKind::XiuChuDau);
        assert_eq!(bets[1].bet_type, BetKind::XiuChuDuoi);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::CardinalityViolation);
    }

    #[test]
    fn test_xiu_chu_dao_permutes() {
        let (bets, _) = expand_on(&raw(BetKind::XiuChuDao, &["123"], &["Vĩnh Long"]), Region::MN);
        assert_eq!(bets.len(), 12);
        let (bets, _) = expand_on(
            &raw(BetKind::XiuChuDaoDau, &["112"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert_eq!(bets.len(), 3);
        assert!(bets.iter().all(|b| b.bet_type == BetKind::XiuChuDau));
        let (bets, _) = expand_on(
            &raw(BetKind::XiuChuDaoDuoi, &["111"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert_eq!(kinds_and_numbers(&bets), vec![(BetKind::XiuChuDuoi, "111".to_string())]);
    }

    #[test]
    fn test_bao_dao_reemits_bao_lo() {
        let (bets, errors) = expand_on(&raw(BetKind::BaoDao, &["12"], &["Vĩnh Long"]), Region::MN);
        assert!(errors.is_empty());
        assert_eq!(
            kinds_and_numbers(&bets),
            vec![(BetKind::BaoLo, "12".to_string()), (BetKind::BaoLo, "21".to_string())]
        );
        let (bets, _) = expand_on(&raw(BetKind::BaoDao, &["1234"], &["Vĩnh Long"]), Region::MN);
        assert_eq!(bets.len(), 24);
    }

    #[test]
    fn test_da_needs_two_numbers() {
        let (bets, errors) = expand_on(&raw(BetKind::Da, &["12"], &["Vĩnh Long"]), Region::MN);
        assert!(bets.is_empty());
        assert_eq!(errors[0].kind, ParseErrorKind::CardinalityViolation);
        assert!(errors[0].message.contains("at least 2 numbers"));

        let (bets, errors) = expand_on(
            &raw(BetKind::DaThang, &["12", "34", "56"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert!(errors.is_empty());
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].numbers.len(), 3);
    }

    #[test]
    fn test_atomic_kinds_one_bet_per_number() {
        let (bets, errors) = expand_on(
            &raw(BetKind::BaoLo, &["12", "345", "6789"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert!(errors.is_empty());
        assert_eq!(bets.len(), 3);

        let (bets, errors) = expand_on(
            &raw(BetKind::Dau, &["12", "3456"], &["Vĩnh Long"]),
            Region::MN,
        );
        assert_eq!(bets.len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_no_station_drops_silently() {
        let (bets, errors) = expand_on(&raw(BetKind::BaoLo, &["12"], &[]), Region::MN);
        assert!(bets.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_crossed_blocked_in_north() {
        let (bets, errors) = expand_on(
            &raw(BetKind::DaXien, &["11", "66"], &["Hải Phòng"]),
            Region::MB,
        );
        assert!(bets.is_empty());
        assert_eq!(errors[0].kind, ParseErrorKind::RegionViolation);
    }

    #[test]
    fn test_crossed_number_count() {
        let (_, errors) = expand_on(
            &raw(BetKind::DaXien, &["11"], &["Vĩnh Long", "Bình Dương"]),
            Region::MN,
        );
        assert_eq!(errors[0].kind, ParseErrorKind::CardinalityViolation);
        let five = ["11", "22", "33", "44", "55"];
        let (_, errors) = expand_on(
            &raw(BetKind::DaXien, &five, &["Vĩnh Long", "Bình Dương"]),
            Region::MN,
        );
        assert_eq!(errors[0].kind, ParseErrorKind::CardinalityViolation);
    }

    #[test]
    fn test_crossed_auto_fill() {
        let (bets, errors) = expand_on(&raw(BetKind::DaXien, &["11", "66"], &[]), Region::MN);
        assert!(errors.is_empty());
        assert_eq!(bets[0].provinces, vec!["Vĩnh Long", "Bình Dương"]);

        let (bets, _) = expand_on(
            &raw(BetKind::DaXien, &["11", "66"], &["Bình Dương"]),
            Region::MN,
        );
        assert_eq!(bets[0].provinces, vec!["Bình Dương", "Vĩnh Long"]);

        let (bets, _) = expand_on(
            &raw(BetKind::DaXien, &["11", "66"], &["Trà Vinh", "Vĩnh Long", "Bình Dương"]),
            Region::MN,
        );
        assert_eq!(bets[0].provinces.len(), 3);
    }

    #[test]
    fn test_crossed_resource_shortage() {
        let registry = fixtures::registry();
        let friday = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let stations = registry.provinces_for_day(Region::MN, friday);
        let ctx = ParseContext::new(&registry, Region::MN, stations.into_iter().take(1).collect());
        let (bets, errors) = expand(&raw(BetKind::DaXien, &["11", "66"], &[]), &ctx);
        assert!(bets.is_empty());
        assert_eq!(errors[0].kind, ParseErrorKind::ResourceShortage);
    }
}
