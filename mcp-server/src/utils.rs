use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use xoso_engine::Region;

pub fn draw_file_name(date: NaiveDate, region: Region) -> String {
    format!("{}-{}.json", date.format("%Y-%m-%d"), region)
}

pub fn required_str<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing {} parameter", key))
}

pub fn required<'a>(arguments: &'a HashMap<String, Value>, key: &str) -> Result<&'a Value> {
    arguments
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing {} parameter", key))
}

/// `date` in YYYY-MM-DD.
pub fn draw_date(arguments: &HashMap<String, Value>) -> Result<NaiveDate> {
    let date = required_str(arguments, "date")?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date {}: {}", date, e))
}

/// `region`, defaulting to MN.
pub fn region(arguments: &HashMap<String, Value>) -> Result<Region> {
    match arguments.get("region").and_then(|v| v.as_str()) {
        Some(region) => Ok(region.parse()?),
        None => Ok(Region::MN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_draw_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(draw_file_name(date, Region::MB), "2024-05-10-MB.json");
    }

    #[test]
    fn test_draw_date() {
        let date = draw_date(&args(json!({"date": "2024-05-10"}))).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(draw_date(&args(json!({"date": "10/05/2024"}))).is_err());
        let err = draw_date(&args(json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "Missing date parameter");
    }

    #[test]
    fn test_region_defaults_to_south() {
        assert_eq!(region(&args(json!({}))).unwrap(), Region::MN);
        assert_eq!(region(&args(json!({"region": "mb"}))).unwrap(), Region::MB);
        assert!(region(&args(json!({"region": "xx"}))).is_err());
    }
}
