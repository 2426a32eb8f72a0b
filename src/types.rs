use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::XosoError;
use crate::utils::{compact_key, split_alias_list};

/// Lottery region: Southern, Central or Northern draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    MN,
    MT,
    MB,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Region::MN => "MN",
            Region::MT => "MT",
            Region::MB => "MB",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Region {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_key(s).as_str() {
            "mn" | "miennam" => Ok(Region::MN),
            "mt" | "mientrung" => Ok(Region::MT),
            "mb" | "mienbac" => Ok(Region::MB),
            _ => Err(XosoError::InvalidRegion(s.to_string())),
        }
    }
}

/// A weekly draw slot. `day_of_week` counts from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: u8,
    pub ordering: u32,
}

/// One drawing station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: i64,
    pub name: String,
    pub region: Region,
    #[serde(deserialize_with = "deserialize_aliases")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<ScheduleSlot>,
}

impl Province {
    pub fn matches_alias(&self, key: &str) -> bool {
        let key = compact_key(key);
        compact_key(&self.name) == key || self.aliases.iter().any(|a| compact_key(a) == key)
    }

    /// Ordering of the station on the given weekday, if it draws that day.
    pub fn ordering_on(&self, day_of_week: u8) -> Option<u32> {
        self.schedule
            .iter()
            .find(|slot| slot.day_of_week == day_of_week)
            .map(|slot| slot.ordering)
    }

    /// The token used when a station-count shorthand expands to this station.
    pub fn short_alias(&self) -> String {
        self.aliases
            .iter()
            .map(|a| compact_key(a))
            .find(|a| !a.is_empty())
            .unwrap_or_else(|| compact_key(&self.name))
    }
}

/// Canonical bet types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum BetKind {
    #[serde(rename = "Đầu")]
    Dau,
    #[serde(rename = "Đuôi")]
    Duoi,
    #[serde(rename = "Đầu đuôi")]
    DauDuoi,
    #[serde(rename = "Bao lô")]
    BaoLo,
    #[serde(rename = "Bao đảo")]
    BaoDao,
    #[serde(rename = "Xỉu chủ")]
    XiuChu,
    #[serde(rename = "Xỉu chủ đầu")]
    XiuChuDau,
    #[serde(rename = "Xỉu chủ đuôi")]
    XiuChuDuoi,
    #[serde(rename = "Xỉu chủ đảo")]
    XiuChuDao,
    #[serde(rename = "Xỉu chủ đảo đầu")]
    XiuChuDaoDau,
    #[serde(rename = "Xỉu chủ đảo đuôi")]
    XiuChuDaoDuoi,
    #[serde(rename = "Đá")]
    Da,
    #[serde(rename = "Đá thẳng")]
    DaThang,
    #[serde(rename = "Đá xiên")]
    DaXien,
}

impl BetKind {
    pub const ALL: [BetKind; 14] = [
        BetKind::Dau,
        BetKind::Duoi,
        BetKind::DauDuoi,
        BetKind::BaoLo,
        BetKind::BaoDao,
        BetKind::XiuChu,
        BetKind::XiuChuDau,
        BetKind::XiuChuDuoi,
        BetKind::XiuChuDao,
        BetKind::XiuChuDaoDau,
        BetKind::XiuChuDaoDuoi,
        BetKind::Da,
        BetKind::DaThang,
        BetKind::DaXien,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BetKind::Dau => "Đầu",
            BetKind::Duoi => "Đuôi",
            BetKind::DauDuoi => "Đầu đuôi",
            BetKind::BaoLo => "Bao lô",
            BetKind::BaoDao => "Bao đảo",
            BetKind::XiuChu => "Xỉu chủ",
            BetKind::XiuChuDau => "Xỉu chủ đầu",
            BetKind::XiuChuDuoi => "Xỉu chủ đuôi",
            BetKind::XiuChuDao => "Xỉu chủ đảo",
            BetKind::XiuChuDaoDau => "Xỉu chủ đảo đầu",
            BetKind::XiuChuDaoDuoi => "Xỉu chủ đảo đuôi",
            BetKind::Da => "Đá",
            BetKind::DaThang => "Đá thẳng",
            BetKind::DaXien => "Đá xiên",
        }
    }

    pub fn is_crossed(&self) -> bool {
        matches!(self, BetKind::DaXien)
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BetKind {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = compact_key(s);
        BetKind::ALL
            .into_iter()
            .find(|kind| compact_key(kind.label()) == key)
            .ok_or_else(|| XosoError::InvalidBetKind(s.to_string()))
    }
}

impl TryFrom<String> for BetKind {
    type Error = XosoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Registry entry mapping shorthand aliases to a canonical bet type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetType {
    pub id: i64,
    pub name: BetKind,
    #[serde(deserialize_with = "deserialize_aliases")]
    pub aliases: Vec<String>,
}

impl BetType {
    pub fn matches_alias(&self, key: &str) -> bool {
        let key = compact_key(key);
        compact_key(self.name.label()) == key || self.aliases.iter().any(|a| compact_key(a) == key)
    }
}

/// Stake in thousands, kept to one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point(u32);

impl Point {
    pub fn from_tenths(tenths: u32) -> Self {
        Point(tenths)
    }

    pub fn whole(value: u32) -> Self {
        Point(value * 10)
    }

    /// `None` when the stake does not fit.
    pub fn checked_whole(value: u32) -> Option<Self> {
        value.checked_mul(10).map(Point)
    }

    pub fn tenths(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

impl TryFrom<f64> for Point {
    type Error = XosoError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let tenths = (value * 10.0).round();
        if !tenths.is_finite() || tenths < 0.0 || tenths > f64::from(u32::MAX) {
            return Err(XosoError::InvalidPoint(value.to_string()));
        }
        Ok(Point(tenths as u32))
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Point::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// A statement read off the message, before type-specific fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBet {
    pub numbers: Vec<String>,
    pub bet_type: BetKind,
    pub point: Point,
    pub provinces: Vec<String>,
}

/// An atomic, priced wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBet {
    #[serde(deserialize_with = "deserialize_numbers")]
    pub numbers: Vec<String>,
    #[serde(rename = "type")]
    pub bet_type: BetKind,
    pub point: Point,
    pub provinces: Vec<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(rename = "winCount", default, skip_serializing_if = "Option::is_none")]
    pub win_count: Option<f64>,
    #[serde(rename = "winAmount", default, skip_serializing_if = "Option::is_none")]
    pub win_amount: Option<i64>,
}

impl ParsedBet {
    pub fn new(
        numbers: Vec<String>,
        bet_type: BetKind,
        point: Point,
        provinces: Vec<String>,
    ) -> Self {
        Self {
            numbers,
            bet_type,
            point,
            provinces,
            amount: 0,
            win_count: None,
            win_amount: None,
        }
    }

    /// Digit length shared by every number of the bet.
    pub fn digit_length(&self) -> usize {
        self.numbers.first().map(|n| n.len()).unwrap_or(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_aliases<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(list) => split_alias_list(&list),
        OneOrMany::Many(items) => items
            .iter()
            .flat_map(|item| split_alias_list(item))
            .collect(),
    })
}

fn deserialize_numbers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(number) => vec![number],
        OneOrMany::Many(numbers) => numbers,
    })
}
