use serde::{Deserialize, Serialize};
use xoso_engine::{ParsedBet, Province, Region, TicketSettlement};

/// A station drawing on the requested day.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvinceSummary {
    pub id: i64,
    pub name: String,
    pub region: Region,
    pub ordering: u32,
    pub aliases: Vec<String>,
}

impl ProvinceSummary {
    pub fn new(province: &Province, ordering: u32) -> Self {
        Self {
            id: province.id,
            name: province.name.clone(),
            region: province.region,
            ordering,
            aliases: province.aliases.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettledTicket {
    pub bets: Vec<ParsedBet>,
    pub totals: TicketSettlement,
    /// False while no draw results were found for the day.
    #[serde(rename = "final")]
    pub is_final: bool,
}
