//! Rewrites a raw wager message into a canonical, space-delimited token
//! stream. Pure and idempotent.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::{BetType, Province};
use crate::utils::{compact_key, strip_diacritics};

static MONEY_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)(ngan|nghin|ngh|ng|n)\b").unwrap());
static STATION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([234])(dai|d)\b").unwrap());
static JOINED_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)[./\-](\d)").unwrap());
static COMMA_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d),(\d)").unwrap());
static LETTER_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").unwrap());
static DIGIT_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\p{N})(\p{L})").unwrap());
static LETTER_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\p{L})(\p{N})").unwrap());
static NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Alias tables prepared once per registry.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Province aliases, longest first.
    province_aliases: Vec<String>,
    /// Every province and bet-type alias.
    known: HashSet<String>,
}

impl Normalizer {
    pub fn new(provinces: &[Province], bet_types: &[BetType]) -> Self {
        let mut province_aliases: Vec<String> = provinces
            .iter()
            .flat_map(|p| p.aliases.iter().map(|a| compact_key(a)))
            .filter(|a| !a.is_empty())
            .collect();
        province_aliases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        province_aliases.dedup();

        let mut known: HashSet<String> = province_aliases.iter().cloned().collect();
        for bet_type in bet_types {
            known.insert(compact_key(bet_type.name.label()));
            known.extend(bet_type.aliases.iter().map(|a| compact_key(a)));
        }

        Self {
            province_aliases,
            known,
        }
    }

    pub fn normalize(&self, raw: &str, priority: &[&Province]) -> String {
        let text = strip_diacritics(raw);
        let text = self.strip_money_units(&text);
        let text = expand_station_count(&text, priority);
        let text = replace_until_stable(&JOINED_DIGITS, text);
        let text = self.split_province_aliases(&text);
        let text = DIGIT_LETTER.replace_all(&text, "$1 $2").into_owned();
        let text = LETTER_DIGIT.replace_all(&text, "$1 $2").into_owned();
        let text = replace_until_stable(&COMMA_DIGITS, text);
        let normalized = NOISE.replace_all(&text, " ").trim().to_string();
        tracing::trace!(raw, normalized = %normalized, "normalized message");
        normalized
    }

    /// Drops `n`/`ng`/`ngan`/`nghin`/`ngh` glued to a number, unless the
    /// suffix is itself a known alias.
    fn strip_money_units(&self, text: &str) -> String {
        MONEY_UNIT
            .replace_all(text, |caps: &Captures| {
                if self.known.contains(&caps[2]) {
                    caps[0].to_string()
                } else {
                    caps[1].to_string()
                }
            })
            .into_owned()
    }

    /// "vlbt" -> "vl bt": peel province aliases off the front of each
    /// letter run, longest alias first.
    fn split_province_aliases(&self, text: &str) -> String {
        LETTER_RUN
            .replace_all(text, |caps: &Captures| self.split_run(&caps[0]))
            .into_owned()
    }

    fn split_run(&self, run: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = run;
        while !rest.is_empty() {
            if self.known.contains(rest) {
                parts.push(rest);
                break;
            }
            let prefix = self
                .province_aliases
                .iter()
                .find(|alias| rest.len() > alias.len() && rest.starts_with(alias.as_str()));
            match prefix {
                Some(alias) => {
                    let (head, tail) = rest.split_at(alias.len());
                    parts.push(head);
                    rest = tail;
                }
                None => {
                    parts.push(rest);
                    break;
                }
            }
        }
        parts.join(" ")
    }
}

/// "2d"/"3dai"/"4d" -> the first N stations of the day. Expands to
/// whatever is available when the day has fewer stations.
fn expand_station_count(text: &str, priority: &[&Province]) -> String {
    STATION_COUNT
        .replace_all(text, |caps: &Captures| {
            let wanted: usize = caps[1].parse().unwrap_or(0);
            let expanded: Vec<String> = priority
                .iter()
                .take(wanted)
                .map(|p| p.short_alias())
                .collect();
            if expanded.len() < wanted {
                tracing::debug!(
                    wanted,
                    available = expanded.len(),
                    "station shorthand short of stations"
                );
            }
            format!(" {} ", expanded.join(" "))
        })
        .into_owned()
}

fn replace_until_stable(pattern: &Regex, mut text: String) -> String {
    while pattern.is_match(&text) {
        text = pattern.replace_all(&text, "$1 $2").into_owned();
    }
    text
}

/// One-shot form of [`Normalizer::normalize`].
pub fn normalize(
    raw: &str,
    provinces: &[Province],
    bet_types: &[BetType],
    priority: &[&Province],
) -> String {
    Normalizer::new(provinces, bet_types).normalize(raw, priority)
}
