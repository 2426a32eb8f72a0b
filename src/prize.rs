//! Draw results and winning-digit extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::XosoError;
use crate::types::{BetKind, Region};
use crate::utils::{compact_key, last_digits};

/// Prize tiers, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PrizeTier {
    #[serde(rename = "G.ĐB")]
    Special,
    #[serde(rename = "G.1")]
    G1,
    #[serde(rename = "G.2")]
    G2,
    #[serde(rename = "G.3")]
    G3,
    #[serde(rename = "G.4")]
    G4,
    #[serde(rename = "G.5")]
    G5,
    #[serde(rename = "G.6")]
    G6,
    #[serde(rename = "G.7")]
    G7,
    #[serde(rename = "G.8")]
    G8,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 9] = [
        PrizeTier::Special,
        PrizeTier::G1,
        PrizeTier::G2,
        PrizeTier::G3,
        PrizeTier::G4,
        PrizeTier::G5,
        PrizeTier::G6,
        PrizeTier::G7,
        PrizeTier::G8,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PrizeTier::Special => "G.ĐB",
            PrizeTier::G1 => "G.1",
            PrizeTier::G2 => "G.2",
            PrizeTier::G3 => "G.3",
            PrizeTier::G4 => "G.4",
            PrizeTier::G5 => "G.5",
            PrizeTier::G6 => "G.6",
            PrizeTier::G7 => "G.7",
            PrizeTier::G8 => "G.8",
        }
    }

    /// Tiers whose numbers count as lô slots for `digits`-long bets.
    fn eligible_for_lo(&self, digits: usize) -> bool {
        match digits {
            2 => true,
            3 => *self <= PrizeTier::G7,
            4 => *self <= PrizeTier::G6,
            _ => false,
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PrizeTier {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = compact_key(s);
        let key = key.strip_prefix('g').unwrap_or(&key);
        match key {
            "db" | "dacbiet" => Ok(PrizeTier::Special),
            "1" => Ok(PrizeTier::G1),
            "2" => Ok(PrizeTier::G2),
            "3" => Ok(PrizeTier::G3),
            "4" => Ok(PrizeTier::G4),
            "5" => Ok(PrizeTier::G5),
            "6" => Ok(PrizeTier::G6),
            "7" => Ok(PrizeTier::G7),
            "8" => Ok(PrizeTier::G8),
            _ => Err(XosoError::InvalidTier(s.to_string())),
        }
    }
}

impl TryFrom<String> for PrizeTier {
    type Error = XosoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One station's draw: tier → winning numbers.
pub type PrizeMap = BTreeMap<PrizeTier, Vec<String>>;

/// Draw results for one date and region, keyed by province name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawResultMap(BTreeMap<String, PrizeMap>);

impl DrawResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn insert(&mut self, province: impl Into<String>, prizes: PrizeMap) {
        self.0.insert(province.into(), prizes);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact name match first, then case/diacritic-insensitive.
    pub fn province(&self, name: &str) -> Option<&PrizeMap> {
        self.0.get(name).or_else(|| {
            let key = compact_key(name);
            self.0
                .iter()
                .find(|(candidate, _)| compact_key(candidate) == key)
                .map(|(_, prizes)| prizes)
        })
    }
}

fn tier_digits(prizes: &PrizeMap, tier: PrizeTier, n: usize) -> Vec<String> {
    prizes
        .get(&tier)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| last_digits(v, n))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Last `n` digits of every lô slot eligible for an `n`-digit bet.
pub fn lo_digits(prizes: &PrizeMap, n: usize) -> Vec<String> {
    prizes
        .iter()
        .filter(|(tier, _)| tier.eligible_for_lo(n))
        .flat_map(|(_, values)| values.iter().filter_map(|v| last_digits(v, n)))
        .map(str::to_string)
        .collect()
}

/// Which tiers head bets read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeadTier {
    /// G.8 for two digits, G.7 for three, in every region.
    #[default]
    Fixed,
    /// As [`HeadTier::Fixed`] in the South and Centre; Northern draws have
    /// no G.8 and read G.7 for two digits, G.6 for three.
    Regional,
}

impl HeadTier {
    pub fn tier(self, region: Region, digits: usize) -> PrizeTier {
        match (self, region, digits) {
            (HeadTier::Regional, Region::MB, 2) => PrizeTier::G7,
            (HeadTier::Regional, Region::MB, _) => PrizeTier::G6,
            (_, _, 2) => PrizeTier::G8,
            _ => PrizeTier::G7,
        }
    }
}

impl FromStr for HeadTier {
    type Err = XosoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match compact_key(s).as_str() {
            "fixed" => Ok(HeadTier::Fixed),
            "regional" | "region" => Ok(HeadTier::Regional),
            _ => Err(XosoError::InvalidOption(s.to_string())),
        }
    }
}

fn tail_digits(prizes: &PrizeMap, n: usize) -> Vec<String> {
    tier_digits(prizes, PrizeTier::Special, n)
}

/// Candidate winning digit strings for a bet of `kind` with `digits`-long
/// numbers. `head` is the tier head bets read, see [`HeadTier::tier`].
pub fn digits_for(kind: BetKind, digits: usize, prizes: &PrizeMap, head: PrizeTier) -> Vec<String> {
    match kind {
        BetKind::Dau | BetKind::XiuChuDau | BetKind::XiuChuDaoDau => {
            tier_digits(prizes, head, digits)
        }
        BetKind::Duoi | BetKind::XiuChuDuoi | BetKind::XiuChuDaoDuoi => {
            tail_digits(prizes, digits)
        }
        BetKind::DauDuoi | BetKind::XiuChu | BetKind::XiuChuDao => {
            let mut all = tier_digits(prizes, head, digits);
            all.extend(tail_digits(prizes, digits));
            all
        }
        BetKind::BaoLo
        | BetKind::BaoDao
        | BetKind::Da
        | BetKind::DaThang
        | BetKind::DaXien => lo_digits(prizes, digits),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn tier(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    /// A full 18-slot southern draw.
    pub fn southern_draw() -> PrizeMap {
        let mut prizes = PrizeMap::new();
        prizes.insert(PrizeTier::G8, tier(&["12"]));
        prizes.insert(PrizeTier::G7, tier(&["345"]));
        prizes.insert(PrizeTier::G6, tier(&["4512", "7788", "0934"]));
        prizes.insert(PrizeTier::G5, tier(&["6021"]));
        prizes.insert(
            PrizeTier::G4,
            tier(&["12345", "67890", "11223", "44556", "77889", "99001", "23456"]),
        );
        prizes.insert(PrizeTier::G3, tier(&["34567", "89012"]));
        prizes.insert(PrizeTier::G2, tier(&["45678"]));
        prizes.insert(PrizeTier::G1, tier(&["56789"]));
        prizes.insert(PrizeTier::Special, tier(&["123456"]));
        prizes
    }

    /// A full 27-slot northern draw.
    pub fn northern_draw() -> PrizeMap {
        let mut prizes = PrizeMap::new();
        prizes.insert(PrizeTier::G7, tier(&["12", "34", "56", "78"]));
        prizes.insert(PrizeTier::G6, tier(&["123", "456", "789"]));
        prizes.insert(
            PrizeTier::G5,
            tier(&["1111", "2222", "3333", "4444", "5555", "6666"]),
        );
        prizes.insert(PrizeTier::G4, tier(&["1234", "2345", "3456", "4567"]));
        prizes.insert(
            PrizeTier::G3,
            tier(&["11111", "22222", "33333", "44444", "55555", "66666"]),
        );
        prizes.insert(PrizeTier::G2, tier(&["77777", "88888"]));
        prizes.insert(PrizeTier::G1, tier(&["99999"]));
        prizes.insert(PrizeTier::Special, tier(&["24680"]));
        prizes
    }
}
