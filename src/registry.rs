//! Province and bet-type registry.
//!
//! Read-only lookup tables handed to every parse. Aliases compare
//! case- and diacritic-insensitively.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{BetType, Province, Region};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    provinces: Vec<Province>,
    #[serde(rename = "betTypes")]
    bet_types: Vec<BetType>,
}

impl Registry {
    pub fn new(provinces: Vec<Province>, bet_types: Vec<BetType>) -> Self {
        Self {
            provinces,
            bet_types,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn bet_types(&self) -> &[BetType] {
        &self.bet_types
    }

    pub fn lookup_province(&self, alias: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.matches_alias(alias))
    }

    pub fn lookup_bet_type(&self, alias: &str) -> Option<&BetType> {
        self.bet_types.iter().find(|b| b.matches_alias(alias))
    }

    /// Stations of `region` drawing on `date`, by ascending schedule ordering.
    pub fn provinces_for_day(&self, region: Region, date: NaiveDate) -> Vec<&Province> {
        let day = date.weekday().num_days_from_sunday() as u8;
        let mut drawing: Vec<(u32, &Province)> = self
            .provinces
            .iter()
            .filter(|p| p.region == region)
            .filter_map(|p| p.ordering_on(day).map(|ordering| (ordering, p)))
            .collect();
        drawing.sort_by_key(|(ordering, p)| (*ordering, p.id));
        drawing.into_iter().map(|(_, p)| p).collect()
    }
}

/// Alias lookup restricted to an already-filtered station list.
pub fn find_province<'a>(provinces: &[&'a Province], alias: &str) -> Option<&'a Province> {
    provinces.iter().copied().find(|p| p.matches_alias(alias))
}
