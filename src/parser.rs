//! Left-to-right statement parser over a normalized message.
//!
//! A message is a run of statements of the shape
//! `stations* numbers* bet-type point`. The parser keeps one accumulator
//! (current stations, current numbers) and a [`PartKind`] remembering what
//! the previous token was; the pair decides whether a token starts a new
//! set or extends the current one.

use chrono::NaiveDate;

use crate::error::{ParseError, ParseErrorKind};
use crate::registry::{Registry, find_province};
use crate::types::{BetKind, Point, Province, RawBet, Region};
use crate::utils::is_digits;

/// Everything a parse needs besides the text.
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    pub registry: &'a Registry,
    pub region: Region,
    /// Stations drawing on the draw date, by ascending ordering. Station
    /// tokens resolve against this list only; it is also the auto-fill
    /// priority list for Đá xiên.
    pub stations: Vec<&'a Province>,
}

impl<'a> ParseContext<'a> {
    pub fn new(registry: &'a Registry, region: Region, stations: Vec<&'a Province>) -> Self {
        Self {
            registry,
            region,
            stations,
        }
    }

    pub fn for_draw(registry: &'a Registry, region: Region, date: NaiveDate) -> Self {
        Self::new(registry, region, registry.provinces_for_day(region, date))
    }
}

/// What the previous token contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    None,
    Province,
    Number,
    BetType,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Province,
    Number,
    BetType,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartProvinces,
    AppendProvince,
    StartNumbers,
    AppendNumber,
    ReadPoint,
    Ignore,
}

impl PartKind {
    /// Transition table:
    ///
    /// | token    | after            | action          |
    /// |----------|------------------|-----------------|
    /// | province | province         | append province |
    /// | province | anything else    | start provinces |
    /// | number   | number, none     | append number   |
    /// | number   | anything else    | start numbers   |
    /// | bet type | any              | read point      |
    /// | other    | any              | ignore → none   |
    ///
    /// A successful point read moves on to [`PartKind::Point`].
    pub fn transition(self, class: TokenClass) -> (Action, PartKind) {
        match (class, self) {
            (TokenClass::Province, PartKind::Province) => {
                (Action::AppendProvince, PartKind::Province)
            }
            (TokenClass::Province, _) => (Action::StartProvinces, PartKind::Province),
            (TokenClass::Number, PartKind::Number | PartKind::None) => {
                (Action::AppendNumber, PartKind::Number)
            }
            (TokenClass::Number, _) => (Action::StartNumbers, PartKind::Number),
            (TokenClass::BetType, _) => (Action::ReadPoint, PartKind::BetType),
            (TokenClass::Other, _) => (Action::Ignore, PartKind::None),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Token<'t, 'a> {
    Province(&'a Province),
    Number(&'t str),
    BetType(BetKind),
    Other,
}

impl Token<'_, '_> {
    fn class(&self) -> TokenClass {
        match self {
            Token::Province(_) => TokenClass::Province,
            Token::Number(_) => TokenClass::Number,
            Token::BetType(_) => TokenClass::BetType,
            Token::Other => TokenClass::Other,
        }
    }
}

/// Statements read off a message, before fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub bets: Vec<RawBet>,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Default)]
struct Statement {
    provinces: Vec<String>,
    numbers: Vec<String>,
}

fn is_bet_number(token: &str) -> bool {
    is_digits(token) && (2..=4).contains(&token.len())
}

/// Reads the point following a bet type: a bare integer, or an integer
/// below ten followed by a single digit ("1 5" is 1.5, "0 5" is 0.5).
/// Returns the point and the number of tokens consumed, or `None` when
/// no point follows or the stake is too large to hold.
pub fn read_point(tokens: &[&str]) -> Option<(Point, usize)> {
    let first = tokens.first().filter(|t| is_digits(t))?;
    let whole: u32 = first.parse().ok()?;
    let fraction = tokens
        .get(1)
        .filter(|t| t.len() == 1 && is_digits(t) && whole < 10)
        .and_then(|t| t.parse::<u32>().ok());
    match fraction {
        Some(tenth) => Some((Point::from_tenths(whole * 10 + tenth), 2)),
        None => Point::checked_whole(whole).map(|point| (point, 1)),
    }
}

pub struct Parser<'c, 'a> {
    ctx: &'c ParseContext<'a>,
}

impl<'c, 'a> Parser<'c, 'a> {
    pub fn new(ctx: &'c ParseContext<'a>) -> Self {
        Self { ctx }
    }

    fn classify<'t>(&self, token: &'t str, last: PartKind) -> Token<'t, 'a> {
        if is_digits(token) {
            return if is_bet_number(token) {
                Token::Number(token)
            } else {
                Token::Other
            };
        }
        let province = find_province(&self.ctx.stations, token);
        let bet_type = self.ctx.registry.lookup_bet_type(token).map(|b| b.name);
        match (province, bet_type) {
            // Shared alias: right after numbers it closes the statement.
            (Some(_), Some(kind)) if last == PartKind::Number => Token::BetType(kind),
            (Some(province), _) => Token::Province(province),
            (None, Some(kind)) => Token::BetType(kind),
            (None, None) => Token::Other,
        }
    }

    /// A message naming no station is dropped unless it has a Đá xiên,
    /// whose stations can be auto-assigned.
    fn worth_parsing(&self, tokens: &[&str]) -> bool {
        let names_station = tokens
            .iter()
            .any(|t| !is_digits(t) && find_province(&self.ctx.stations, t).is_some());
        let has_crossed = tokens.iter().any(|t| {
            self.ctx
                .registry
                .lookup_bet_type(t)
                .is_some_and(|b| b.name.is_crossed())
        });
        names_station || has_crossed
    }

    pub fn parse(&self, normalized: &str) -> ParseOutput {
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let mut output = ParseOutput::default();
        if !self.worth_parsing(&tokens) {
            tracing::debug!(text = normalized, "no station mentioned, nothing to parse");
            return output;
        }

        let mut statement = Statement::default();
        let mut last = PartKind::None;
        let mut i = 0;
        while i < tokens.len() {
            let token = self.classify(tokens[i], last);
            let (action, next) = last.transition(token.class());
            last = next;
            match (action, token) {
                (Action::StartProvinces, Token::Province(p)) => {
                    statement.provinces = vec![p.name.clone()];
                }
                (Action::AppendProvince, Token::Province(p)) => {
                    if !statement.provinces.contains(&p.name) {
                        statement.provinces.push(p.name.clone());
                    }
                }
                (Action::StartNumbers, Token::Number(n)) => {
                    statement.numbers = vec![n.to_string()];
                }
                (Action::AppendNumber, Token::Number(n)) => {
                    statement.numbers.push(n.to_string());
                }
                (Action::ReadPoint, Token::BetType(kind)) => match read_point(&tokens[i + 1..]) {
                    Some((point, consumed)) => {
                        i += consumed;
                        last = PartKind::Point;
                        self.close_statement(&statement, kind, point, &mut output);
                    }
                    None => {
                        output.errors.push(
                            ParseError::new(
                                ParseErrorKind::SyntaxIncomplete,
                                format!("missing point after bet type {}", kind),
                            )
                            .with_bet_type(kind)
                            .with_numbers(&statement.numbers)
                            .with_provinces(&statement.provinces),
                        );
                        statement.numbers.clear();
                    }
                },
                _ => {}
            }
            i += 1;
        }

        output
    }

    fn close_statement(
        &self,
        statement: &Statement,
        kind: BetKind,
        point: Point,
        output: &mut ParseOutput,
    ) {
        if statement.numbers.is_empty() {
            output.errors.push(
                ParseError::new(
                    ParseErrorKind::CardinalityViolation,
                    format!("no numbers before bet type {}", kind),
                )
                .with_bet_type(kind)
                .with_provinces(&statement.provinces),
            );
            return;
        }
        tracing::debug!(
            bet_type = %kind,
            point = %point,
            numbers = ?statement.numbers,
            provinces = ?statement.provinces,
            "statement parsed"
        );
        output.bets.push(RawBet {
            numbers: statement.numbers.clone(),
            bet_type: kind,
            point,
            provinces: statement.provinces.clone(),
        });
    }
}

pub fn parse(normalized: &str, ctx: &ParseContext<'_>) -> ParseOutput {
    Parser::new(ctx).parse(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::fixtures;

    fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn parse_friday(text: &str) -> ParseOutput {
        let registry = fixtures::registry();
        let ctx = ParseContext::for_draw(&registry, Region::MN, friday());
        parse(text, &ctx)
    }

    fn nums(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_transition_table() {
        use Action::*;
        let cases = [
            (PartKind::Province, TokenClass::Province, AppendProvince, PartKind::Province),
            (PartKind::Point, TokenClass::Province, StartProvinces, PartKind::Province),
            (PartKind::BetType, TokenClass::Province, StartProvinces, PartKind::Province),
            (PartKind::None, TokenClass::Province, StartProvinces, PartKind::Province),
            (PartKind::Number, TokenClass::Number, AppendNumber, PartKind::Number),
            (PartKind::None, TokenClass::Number, AppendNumber, PartKind::Number),
            (PartKind::Point, TokenClass::Number, StartNumbers, PartKind::Number),
            (PartKind::BetType, TokenClass::Number, StartNumbers, PartKind::Number),
            (PartKind::Province, TokenClass::Number, StartNumbers, PartKind::Number),
            (PartKind::Number, TokenClass::BetType, ReadPoint, PartKind::BetType),
            (PartKind::Number, TokenClass::Other, Ignore, PartKind::None),
        ];
        for (from, class, action, to) in cases {
            assert_eq!(from.transition(class), (action, to), "{:?} + {:?}", from, class);
        }
    }

    #[test]
    fn test_read_point() {
        assert_eq!(read_point(&["1"]), Some((Point::whole(1), 1)));
        assert_eq!(read_point(&["1", "5"]), Some((Point::from_tenths(15), 2)));
        assert_eq!(read_point(&["0", "5"]), Some((Point::from_tenths(5), 2)));
        assert_eq!(read_point(&["10", "5"]), Some((Point::whole(10), 1)));
        assert_eq!(read_point(&["2", "34"]), Some((Point::whole(2), 1)));
        assert_eq!(read_point(&["b", "1"]), None);
        assert_eq!(read_point(&["429496729"]), Some((Point::whole(429_496_729), 1)));
        assert_eq!(read_point(&["500000000"]), None);
        assert_eq!(read_point(&["99999999999"]), None);
        assert_eq!(read_point(&[]), None);
    }

    #[test]
    fn test_single_statement() {
        let output = parse_friday("vl 12 34 dd 1");
        assert!(output.errors.is_empty());
        assert_eq!(
            output.bets,
            vec![RawBet {
                numbers: nums(&["12", "34"]),
                bet_type: BetKind::DauDuoi,
                point: Point::whole(1),
                provinces: vec!["Vĩnh Long".to_string()],
            }]
        );
    }

    #[test]
    fn test_missing_point_is_syntax_incomplete() {
        let output = parse_friday("vl dd");
        assert!(output.bets.is_empty());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ParseErrorKind::SyntaxIncomplete);
    }

    #[test]
    fn test_oversized_point_is_missing() {
        let output = parse_friday("vl 12 dd 500000000");
        assert!(output.bets.is_empty());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ParseErrorKind::SyntaxIncomplete);
        assert_eq!(output.errors[0].numbers, Some(nums(&["12"])));

        let output = parse_friday("vl 12 dd 500000000 34 b 1");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.bets.len(), 1);
        assert_eq!(output.bets[0].numbers, nums(&["34"]));
    }

    #[test]
    fn test_ignored_token_after_point_keeps_numbers() {
        // "5" is not a bet number; the state falls back to none, so 34
        // joins the numbers still held from the previous statement
        let output = parse_friday("vl 12 dd 10 5 34 b 1");
        assert!(output.errors.is_empty());
        assert_eq!(output.bets.len(), 2);
        assert_eq!(output.bets[0].numbers, nums(&["12"]));
        assert_eq!(output.bets[0].point, Point::whole(10));
        assert_eq!(output.bets[1].bet_type, BetKind::BaoLo);
        assert_eq!(output.bets[1].numbers, nums(&["12", "34"]));
    }

    #[test]
    fn test_missing_point_drops_statement_and_continues() {
        let output = parse_friday("vl 12 dd bd 34 b 2");
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].numbers, Some(nums(&["12"])));
        assert_eq!(output.bets.len(), 1);
        assert_eq!(output.bets[0].numbers, nums(&["34"]));
        assert_eq!(output.bets[0].provinces, vec!["Bình Dương"]);
    }

    #[test]
    fn test_decimal_point() {
        let output = parse_friday("vl 12 dd 1 5");
        assert_eq!(output.bets[0].point, Point::from_tenths(15));
        let output = parse_friday("vl 12 dd 0 5");
        assert_eq!(output.bets[0].point, Point::from_tenths(5));
    }

    #[test]
    fn test_numbers_reused_by_following_bet_type() {
        let output = parse_friday("vl 12 34 dd 1 b 2");
        assert_eq!(output.bets.len(), 2);
        assert_eq!(output.bets[1].bet_type, BetKind::BaoLo);
        assert_eq!(output.bets[1].numbers, nums(&["12", "34"]));
        assert_eq!(output.bets[1].point, Point::whole(2));
    }

    #[test]
    fn test_new_numbers_after_point() {
        let output = parse_friday("vl 12 dd 1 56 78 b 3");
        assert_eq!(output.bets.len(), 2);
        assert_eq!(output.bets[1].numbers, nums(&["56", "78"]));
        assert_eq!(output.bets[1].provinces, vec!["Vĩnh Long"]);
    }

    #[test]
    fn test_station_replaced_after_point() {
        let output = parse_friday("vl 12 dd 1 bd 34 dd 2");
        assert_eq!(output.bets.len(), 2);
        assert_eq!(output.bets[1].provinces, vec!["Bình Dương"]);
        assert_eq!(output.bets[1].numbers, nums(&["34"]));
    }

    #[test]
    fn test_multi_station_list() {
        let output = parse_friday("vl bd vl 12 b 1");
        assert_eq!(output.bets[0].provinces, vec!["Vĩnh Long", "Bình Dương"]);
    }

    #[test]
    fn test_station_not_drawing_today_ignored() {
        // Tiền Giang draws on Sunday
        let output = parse_friday("vl tg 12 b 1");
        assert_eq!(output.bets[0].provinces, vec!["Vĩnh Long"]);
    }

    #[test]
    fn test_no_station_no_crossed_bet_is_empty() {
        let output = parse_friday("12 34 dd 1");
        assert_eq!(output, ParseOutput::default());
    }

    #[test]
    fn test_no_station_with_crossed_bet_proceeds() {
        let output = parse_friday("11 66 dx 5");
        assert_eq!(output.bets.len(), 1);
        assert_eq!(output.bets[0].bet_type, BetKind::DaXien);
        assert!(output.bets[0].provinces.is_empty());
    }

    #[test]
    fn test_bet_type_without_numbers() {
        let output = parse_friday("vl dd 1");
        assert!(output.bets.is_empty());
        assert_eq!(output.errors[0].kind, ParseErrorKind::CardinalityViolation);
    }

    #[test]
    fn test_odd_digit_runs_ignored() {
        let output = parse_friday("vl 12 5 12345 34 b 1");
        assert_eq!(output.bets[0].numbers, nums(&["12", "34"]));
    }

    #[test]
    fn test_shared_alias_reads_as_bet_type_after_numbers() {
        let json = r#"{
            "provinces": [{"id": 1, "name": "Bạc Liêu", "region": "MN", "aliases": "bl",
                           "schedule": [{"dayOfWeek": 2, "ordering": 1}]}],
            "betTypes": [{"id": 1, "name": "Bao lô", "aliases": "bl,b"}]
        }"#;
        let registry = Registry::from_json(json).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let ctx = ParseContext::for_draw(&registry, Region::MN, tuesday);
        let output = parse("bl 12 bl 1", &ctx);
        assert_eq!(output.bets.len(), 1);
        assert_eq!(output.bets[0].bet_type, BetKind::BaoLo);
        assert_eq!(output.bets[0].provinces, vec!["Bạc Liêu"]);
    }
}
