use crate::errors::{Result, ReportError};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// 板块当日涨幅/跌幅最大的个股
///
/// Either field may be missing when the page listed no mover for the sector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub equity: Option<String>,
    #[serde(default)]
    pub change: Option<f64>,
}

impl Mover {
    pub fn new(equity: &str, change: f64) -> Self {
        Self {
            equity: Some(equity.to_string()),
            change: Some(change),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Name and change, only when both are known.
    pub fn identified(&self) -> Option<(&str, f64)> {
        match (&self.equity, self.change) {
            (Some(equity), Some(change)) => Some((equity.as_str(), change)),
            _ => None,
        }
    }
}

// 旧数据中缺失的个股以空字符串保存
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// 单个板块的当日数据
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRecord {
    pub name: String,
    pub change: f64,
    pub biggest_gainer: Mover,
    pub biggest_loser: Mover,
}

impl SectorRecord {
    pub fn new(name: &str, change: f64, biggest_gainer: Mover, biggest_loser: Mover) -> Self {
        Self {
            name: name.to_string(),
            change,
            biggest_gainer,
            biggest_loser,
        }
    }

    /// Gainer first, then loser.
    pub fn movers(&self) -> [&Mover; 2] {
        [&self.biggest_gainer, &self.biggest_loser]
    }
}

/// Sectors of one day, in document order, unique by name.
///
/// Stored on disk as a JSON object keyed by sector name. Key order is kept
/// on both read and write, so "first sector" always means the first one the
/// source page listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorSet {
    sectors: Vec<SectorRecord>,
    // 索引用于按名称快速查找
    name_index: HashMap<String, usize>,
}

impl SectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SectorRecord>) -> Result<Self> {
        let mut set = Self::new();
        for record in records {
            set.push(record)?;
        }
        Ok(set)
    }

    pub fn push(&mut self, record: SectorRecord) -> Result<()> {
        if self.name_index.contains_key(&record.name) {
            return Err(ReportError::DataError(format!(
                "Duplicate sector name: {}",
                record.name
            )));
        }
        self.name_index.insert(record.name.clone(), self.sectors.len());
        self.sectors.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SectorRecord> {
        self.name_index.get(name).map(|&idx| &self.sectors[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectorRecord> {
        self.sectors.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sectors.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl<'a> IntoIterator for &'a SectorSet {
    type Item = &'a SectorRecord;
    type IntoIter = std::slice::Iter<'a, SectorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Serialize)]
struct SectorBodyRef<'a> {
    change: f64,
    biggest_gainer: &'a Mover,
    biggest_loser: &'a Mover,
}

#[derive(Deserialize)]
struct SectorBody {
    change: f64,
    #[serde(default)]
    biggest_gainer: Mover,
    #[serde(default)]
    biggest_loser: Mover,
}

impl Serialize for SectorSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.sectors.len()))?;
        for sector in &self.sectors {
            let body = SectorBodyRef {
                change: sector.change,
                biggest_gainer: &sector.biggest_gainer,
                biggest_loser: &sector.biggest_loser,
            };
            map.serialize_entry(&sector.name, &body)?;
        }
        map.end()
    }
}

struct SectorSetVisitor;

impl<'de> Visitor<'de> for SectorSetVisitor {
    type Value = SectorSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of sector name to sector data")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<SectorSet, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut set = SectorSet::new();
        while let Some((name, body)) = access.next_entry::<String, SectorBody>()? {
            set.push(SectorRecord {
                name,
                change: body.change,
                biggest_gainer: body.biggest_gainer,
                biggest_loser: body.biggest_loser,
            })
            .map_err(<A::Error as de::Error>::custom)?;
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for SectorSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SectorSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_keeps_document_order() {
        let json = r#"{
            "Utilities": {"change": 0.4, "biggest_gainer": {"equity": "DUK", "change": 1.1}, "biggest_loser": {"equity": "SO", "change": -0.7}},
            "Energy": {"change": -3.1, "biggest_gainer": {"equity": null, "change": null}, "biggest_loser": {"equity": "XOM", "change": -4.2}},
            "Basic Materials": {"change": 1.0, "biggest_gainer": {"equity": "DOW", "change": 2.0}, "biggest_loser": {"equity": "NEM", "change": -0.2}}
        }"#;

        let set: SectorSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.names(), vec!["Utilities", "Energy", "Basic Materials"]);
        assert_eq!(set.get("Energy").unwrap().change, -3.1);
        assert_eq!(set.get("Energy").unwrap().biggest_gainer, Mover::none());
    }

    #[test]
    fn legacy_empty_equity_reads_as_missing() {
        let json = r#"{"Technology": {"change": 2.5, "biggest_gainer": {"equity": "", "change": null}, "biggest_loser": {"equity": "INTC", "change": -1.5}}}"#;

        let set: SectorSet = serde_json::from_str(json).unwrap();
        let tech = set.get("Technology").unwrap();

        assert_eq!(tech.biggest_gainer.equity, None);
        assert_eq!(tech.biggest_gainer.identified(), None);
        assert_eq!(tech.biggest_loser.identified(), Some(("INTC", -1.5)));
    }

    #[test]
    fn duplicate_sector_names_are_rejected() {
        let json = r#"{"Energy": {"change": 1.0}, "Energy": {"change": 2.0}}"#;
        assert!(serde_json::from_str::<SectorSet>(json).is_err());

        let mut set = SectorSet::new();
        set.push(SectorRecord::new("Energy", 1.0, Mover::none(), Mover::none()))
            .unwrap();
        let err = set
            .push(SectorRecord::new("Energy", 2.0, Mover::none(), Mover::none()))
            .unwrap_err();
        assert!(matches!(err, ReportError::DataError(_)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn serialize_writes_object_keyed_by_name() {
        let set = SectorSet::from_records(vec![
            SectorRecord::new("Technology", 2.5, Mover::new("AAPL", 4.0), Mover::none()),
            SectorRecord::new("Energy", -3.1, Mover::none(), Mover::new("XOM", -5.0)),
        ])
        .unwrap();

        let json = serde_json::to_string(&set).unwrap();

        assert!(json.starts_with(r#"{"Technology":{"change":2.5"#));
        assert!(json.contains(r#""biggest_gainer":{"equity":null,"change":null}"#));
        let back: SectorSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
