//! Per-region pricing and payout rates.
//!
//! A rate table holds two figures per bet category: `price`, the percent
//! of face value charged to the player, and `win`, the multiplier applied
//! to a winning point. Tables are flat JSON objects keyed `price2dau`,
//! `win2lo`, ... Missing entries fall back to the house defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::XosoError;
use crate::types::{BetKind, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RateCategory {
    Dau2,
    Duoi2,
    Lo2,
    Dau3,
    Duoi3,
    Lo3,
    Duoi4,
    Lo4,
    Da,
    Dx,
}

impl RateCategory {
    pub const ALL: [RateCategory; 10] = [
        RateCategory::Dau2,
        RateCategory::Duoi2,
        RateCategory::Lo2,
        RateCategory::Dau3,
        RateCategory::Duoi3,
        RateCategory::Lo3,
        RateCategory::Duoi4,
        RateCategory::Lo4,
        RateCategory::Da,
        RateCategory::Dx,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RateCategory::Dau2 => "2dau",
            RateCategory::Duoi2 => "2duoi",
            RateCategory::Lo2 => "2lo",
            RateCategory::Dau3 => "3dau",
            RateCategory::Duoi3 => "3duoi",
            RateCategory::Lo3 => "3lo",
            RateCategory::Duoi4 => "4duoi",
            RateCategory::Lo4 => "4lo",
            RateCategory::Da => "da",
            RateCategory::Dx => "dx",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        RateCategory::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn default_price(&self) -> f64 {
        75.0
    }

    pub fn default_win(&self) -> f64 {
        match self {
            RateCategory::Dau2 | RateCategory::Duoi2 | RateCategory::Lo2 => 75.0,
            RateCategory::Dau3 | RateCategory::Duoi3 | RateCategory::Lo3 => 650.0,
            RateCategory::Duoi4 | RateCategory::Lo4 => 5500.0,
            RateCategory::Da => 650.0,
            RateCategory::Dx => 550.0,
        }
    }

    /// The single category of an atomic bet kind at a digit length.
    /// Compound kinds (Đầu đuôi, Xỉu chủ, Xỉu chủ đảo) have none.
    pub fn for_bet(kind: BetKind, digits: usize) -> Option<Self> {
        match (kind, digits) {
            (BetKind::Dau, 2) => Some(RateCategory::Dau2),
            (BetKind::Dau, 3) => Some(RateCategory::Dau3),
            (BetKind::Duoi, 2) => Some(RateCategory::Duoi2),
            (BetKind::Duoi, 3) => Some(RateCategory::Duoi3),
            (BetKind::Duoi, 4) => Some(RateCategory::Duoi4),
            (BetKind::BaoLo | BetKind::BaoDao, 2) => Some(RateCategory::Lo2),
            (BetKind::BaoLo | BetKind::BaoDao, 3) => Some(RateCategory::Lo3),
            (BetKind::BaoLo | BetKind::BaoDao, 4) => Some(RateCategory::Lo4),
            (BetKind::XiuChuDau | BetKind::XiuChuDaoDau, 3) => Some(RateCategory::Dau3),
            (BetKind::XiuChuDuoi | BetKind::XiuChuDaoDuoi, 3) => Some(RateCategory::Duoi3),
            (BetKind::XiuChuDuoi | BetKind::XiuChuDaoDuoi, 4) => Some(RateCategory::Duoi4),
            (BetKind::Da | BetKind::DaThang, 2) => Some(RateCategory::Da),
            (BetKind::DaXien, 2) => Some(RateCategory::Dx),
            _ => None,
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct RateTable {
    price: BTreeMap<RateCategory, f64>,
    win: BTreeMap<RateCategory, f64>,
}

impl RateTable {
    pub fn with_price(mut self, category: RateCategory, percent: f64) -> Self {
        self.price.insert(category, percent);
        self
    }

    pub fn with_win(mut self, category: RateCategory, multiplier: f64) -> Self {
        self.win.insert(category, multiplier);
        self
    }

    /// Percent of face value charged, in [0, 100].
    pub fn price(&self, category: RateCategory) -> f64 {
        self.price
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_price())
    }

    pub fn win(&self, category: RateCategory) -> f64 {
        self.win
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_win())
    }
}

impl TryFrom<BTreeMap<String, f64>> for RateTable {
    type Error = XosoError;

    fn try_from(entries: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut table = RateTable::default();
        for (key, value) in entries {
            let (target, category) = if let Some(rest) = key.strip_prefix("price") {
                (&mut table.price, RateCategory::from_key(rest))
            } else if let Some(rest) = key.strip_prefix("win") {
                (&mut table.win, RateCategory::from_key(rest))
            } else {
                (&mut table.price, None)
            };
            let Some(category) = category else {
                tracing::debug!(key = %key, "ignoring unknown rate key");
                continue;
            };
            if !value.is_finite() || value <= 0.0 {
                return Err(XosoError::InvalidRate { key, value });
            }
            target.insert(category, value);
        }
        Ok(table)
    }
}

impl From<RateTable> for BTreeMap<String, f64> {
    fn from(table: RateTable) -> Self {
        let prices = table
            .price
            .into_iter()
            .map(|(c, v)| (format!("price{}", c.key()), v));
        let wins = table
            .win
            .into_iter()
            .map(|(c, v)| (format!("win{}", c.key()), v));
        prices.chain(wins).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawRateSettings {
    #[serde(rename = "MN")]
    mn: Option<RateTable>,
    #[serde(rename = "MT")]
    mt: Option<RateTable>,
    #[serde(rename = "MB")]
    mb: Option<RateTable>,
    #[serde(default)]
    kiruoi: bool,
    #[serde(flatten)]
    flat: BTreeMap<String, serde_json::Value>,
}

/// Rate tables for one agent or player. The MN table doubles as the
/// default for regions without their own entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateSettings")]
pub struct RateSettings {
    #[serde(rename = "MN")]
    pub mn: RateTable,
    #[serde(rename = "MT", skip_serializing_if = "Option::is_none")]
    pub mt: Option<RateTable>,
    #[serde(rename = "MB", skip_serializing_if = "Option::is_none")]
    pub mb: Option<RateTable>,
    /// Half-stake rounding mode. Accepted and carried, not applied.
    #[serde(default)]
    pub kiruoi: bool,
}

impl TryFrom<RawRateSettings> for RateSettings {
    type Error = XosoError;

    fn try_from(raw: RawRateSettings) -> Result<Self, Self::Error> {
        let mn = match raw.mn {
            Some(table) => table,
            None => {
                let flat: BTreeMap<String, f64> = raw
                    .flat
                    .iter()
                    .filter_map(|(k, v)| v.as_f64().map(|v| (k.clone(), v)))
                    .collect();
                RateTable::try_from(flat)?
            }
        };
        if raw.kiruoi {
            tracing::warn!("kiruoi rounding is configured but not applied by the engine");
        }
        Ok(RateSettings {
            mn,
            mt: raw.mt,
            mb: raw.mb,
            kiruoi: raw.kiruoi,
        })
    }
}

impl RateSettings {
    pub fn uniform(table: RateTable) -> Self {
        Self {
            mn: table,
            ..Default::default()
        }
    }

    pub fn from_json(raw: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn table(&self, region: Region) -> &RateTable {
        let specific = match region {
            Region::MN => None,
            Region::MT => self.mt.as_ref(),
            Region::MB => self.mb.as_ref(),
        };
        specific.unwrap_or(&self.mn)
    }

    pub fn price(&self, region: Region, category: RateCategory) -> f64 {
        self.table(region).price(category)
    }

    pub fn win(&self, region: Region, category: RateCategory) -> f64 {
        self.table(region).win(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rates = RateSettings::default();
        assert_eq!(rates.win(Region::MN, RateCategory::Lo2), 75.0);
        assert_eq!(rates.win(Region::MN, RateCategory::Lo3), 650.0);
        assert_eq!(rates.win(Region::MB, RateCategory::Lo4), 5500.0);
        assert_eq!(rates.win(Region::MT, RateCategory::Da), 650.0);
        assert_eq!(rates.win(Region::MN, RateCategory::Dx), 550.0);
        for category in RateCategory::ALL {
            assert!(rates.price(Region::MN, category) > 0.0);
            assert!(rates.win(Region::MN, category) > 0.0);
        }
    }

    #[test]
    fn test_flat_settings_apply_to_every_region() {
        let rates = RateSettings::from_json(r#"{"price2dau": 80, "win2lo": 70}"#).unwrap();
        assert_eq!(rates.price(Region::MN, RateCategory::Dau2), 80.0);
        assert_eq!(rates.price(Region::MB, RateCategory::Dau2), 80.0);
        assert_eq!(rates.win(Region::MT, RateCategory::Lo2), 70.0);
        assert_eq!(rates.price(Region::MN, RateCategory::Duoi2), 75.0);
    }

    #[test]
    fn test_region_specific_override() {
        let json = r#"{"MN": {"win2lo": 75}, "MB": {"win2lo": 80, "price2lo": 72.5}}"#;
        let rates = RateSettings::from_json(json).unwrap();
        assert_eq!(rates.win(Region::MB, RateCategory::Lo2), 80.0);
        assert_eq!(rates.price(Region::MB, RateCategory::Lo2), 72.5);
        assert_eq!(rates.win(Region::MT, RateCategory::Lo2), 75.0);
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        assert!(RateSettings::from_json(r#"{"win2lo": 0}"#).is_err());
        assert!(RateSettings::from_json(r#"{"MN": {"pricedx": -5}}"#).is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let rates = RateSettings::from_json(r#"{"price9xyz": 1, "note": "vip"}"#).unwrap();
        assert_eq!(rates, RateSettings::default());
    }

    #[test]
    fn test_kiruoi_is_carried() {
        let rates = RateSettings::from_json(r#"{"kiruoi": true}"#).unwrap();
        assert!(rates.kiruoi);
    }

    #[test]
    fn test_category_for_bet() {
        assert_eq!(RateCategory::for_bet(BetKind::Dau, 2), Some(RateCategory::Dau2));
        assert_eq!(RateCategory::for_bet(BetKind::BaoLo, 4), Some(RateCategory::Lo4));
        assert_eq!(RateCategory::for_bet(BetKind::XiuChuDaoDuoi, 4), Some(RateCategory::Duoi4));
        assert_eq!(RateCategory::for_bet(BetKind::XiuChuDau, 2), None);
        assert_eq!(RateCategory::for_bet(BetKind::DauDuoi, 2), None);
        assert_eq!(RateCategory::for_bet(BetKind::Da, 3), None);
    }

    #[test]
    fn test_table_serializes_flat() {
        let table = RateTable::default()
            .with_price(RateCategory::Dau2, 80.0)
            .with_win(RateCategory::Dx, 560.0);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["price2dau"], 80.0);
        assert_eq!(json["windx"], 560.0);
    }
}
