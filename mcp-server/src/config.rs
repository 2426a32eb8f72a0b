use anyhow::Result;
use std::env;
use std::path::PathBuf;
use xoso_engine::{DaScope, HeadTier, PairWinPolicy, SettlementOptions};

#[derive(Debug, Clone)]
pub struct Config {
    pub registry_path: PathBuf,
    pub rates_path: PathBuf,
    pub draws_dir: PathBuf,
    pub settlement: SettlementOptions,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn load() -> Result<Config> {
    let registry_path = var_or("XOSO_REGISTRY_PATH", "data/registry.json").into();
    let rates_path = var_or("XOSO_RATES_PATH", "data/rates.json").into();
    let draws_dir = var_or("XOSO_DRAWS_DIR", "data/draws").into();

    let pair_policy: PairWinPolicy = var_or("XOSO_PAIR_POLICY", "min")
        .parse()
        .map_err(|e| anyhow::anyhow!("XOSO_PAIR_POLICY: {}", e))?;
    let da_scope: DaScope = var_or("XOSO_DA_SCOPE", "province")
        .parse()
        .map_err(|e| anyhow::anyhow!("XOSO_DA_SCOPE: {}", e))?;
    let head_tier: HeadTier = var_or("XOSO_HEAD_TIER", "fixed")
        .parse()
        .map_err(|e| anyhow::anyhow!("XOSO_HEAD_TIER: {}", e))?;

    Ok(Config {
        registry_path,
        rates_path,
        draws_dir,
        settlement: SettlementOptions {
            pair_policy,
            da_scope,
            head_tier,
        },
    })
}
