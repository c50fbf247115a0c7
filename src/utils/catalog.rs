// Trail catalog: ingestion, normalization and caller-side filtering

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Difficulty, Trail, TrailType};

/// Top of the rating scale
pub const MAX_RATING: f64 = 5.0;

/// Catalog ingestion error
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog root must be an array or an object with `trails` or `items`")]
    UnsupportedLayout,

    #[error("trail record without an id")]
    MissingId,

    #[error("trail {trail_id}: missing {field}")]
    MissingField {
        trail_id: String,
        field: &'static str,
    },

    #[error("trail {trail_id}: invalid {field} value {value:?}")]
    InvalidNumber {
        trail_id: String,
        field: &'static str,
        value: String,
    },

    #[error("trail {trail_id}: unknown difficulty {label:?}")]
    UnknownDifficulty { trail_id: String, label: String },

    #[error("trail {trail_id}: unknown trail type {label:?}")]
    UnknownTrailType { trail_id: String, label: String },
}

/// Numeric field as found in source records: a number or text such as "1,200"
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

/// Tag field as found in source records: a list or comma-separated text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<String>),
    Text(String),
}

impl RawTags {
    fn into_list(self) -> Vec<String> {
        let items = match self {
            RawTags::List(items) => items,
            RawTags::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A trail record before normalization. Unknown source fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrail {
    #[serde(alias = "trail_id")]
    pub id: Option<String>,
    #[serde(alias = "trail_name")]
    pub name: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<String>,
    pub distance_km: Option<RawNumber>,
    pub estimated_time_hours: Option<RawNumber>,
    pub elevation_gain_m: Option<RawNumber>,
    pub rating: Option<RawNumber>,
    pub scenery_types: Option<RawTags>,
    pub trail_type: Option<String>,
}

fn parse_number(raw: Option<&RawNumber>, trail_id: &str, field: &'static str) -> Result<Option<f64>, CatalogError> {
    let invalid = |value: String| CatalogError::InvalidNumber {
        trail_id: trail_id.to_string(),
        field,
        value,
    };

    let value = match raw {
        None => return Ok(None),
        Some(RawNumber::Number(n)) => *n,
        Some(RawNumber::Text(text)) => {
            let cleaned = text.replace(',', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned.parse::<f64>().map_err(|_| invalid(text.clone()))?
        }
    };

    if !value.is_finite() || value < 0.0 {
        return Err(invalid(value.to_string()));
    }
    Ok(Some(value))
}

fn required_number(raw: Option<&RawNumber>, trail_id: &str, field: &'static str) -> Result<f64, CatalogError> {
    parse_number(raw, trail_id, field)?.ok_or_else(|| CatalogError::MissingField {
        trail_id: trail_id.to_string(),
        field,
    })
}

/// Maps a free-form difficulty label; an empty label means Moderate
pub fn parse_difficulty(label: &str) -> Option<Difficulty> {
    let lower = label.trim().to_lowercase();
    if lower.is_empty() {
        Some(Difficulty::Moderate)
    } else if lower.contains("easy") {
        Some(Difficulty::Easy)
    } else if lower.contains("moderate") {
        Some(Difficulty::Moderate)
    } else if lower.contains("hard") {
        Some(Difficulty::Hard)
    } else {
        None
    }
}

/// Maps a free-form trail type label; an empty label means Loop
pub fn parse_trail_type(label: &str) -> Option<TrailType> {
    let compact: String = label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if compact.is_empty() || compact.contains("loop") {
        Some(TrailType::Loop)
    } else if compact.contains("outandback") || compact.contains("outback") {
        Some(TrailType::OutAndBack)
    } else if compact.contains("pointtopoint") || compact.contains("p2p") {
        Some(TrailType::PointToPoint)
    } else {
        None
    }
}

impl RawTrail {
    /// Converts the record into a typed trail.
    ///
    /// Missing distance, time or elevation is an error; a missing rating
    /// stays unknown.
    pub fn normalize(self) -> Result<Trail, CatalogError> {
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(CatalogError::MissingId)?;

        let difficulty_label = self.difficulty.unwrap_or_default();
        let difficulty = parse_difficulty(&difficulty_label).ok_or_else(|| {
            CatalogError::UnknownDifficulty {
                trail_id: id.clone(),
                label: difficulty_label.clone(),
            }
        })?;

        let type_label = self.trail_type.unwrap_or_default();
        let trail_type = parse_trail_type(&type_label).ok_or_else(|| CatalogError::UnknownTrailType {
            trail_id: id.clone(),
            label: type_label.clone(),
        })?;

        let distance_km = required_number(self.distance_km.as_ref(), &id, "distance_km")?;
        let estimated_time_hours =
            required_number(self.estimated_time_hours.as_ref(), &id, "estimated_time_hours")?;
        let elevation = required_number(self.elevation_gain_m.as_ref(), &id, "elevation_gain_m")?.round();
        if elevation > f64::from(u32::MAX) {
            return Err(CatalogError::InvalidNumber {
                trail_id: id,
                field: "elevation_gain_m",
                value: elevation.to_string(),
            });
        }

        let rating = parse_number(self.rating.as_ref(), &id, "rating")?;
        if let Some(rating) = rating.filter(|r| *r > MAX_RATING) {
            return Err(CatalogError::InvalidNumber {
                trail_id: id,
                field: "rating",
                value: rating.to_string(),
            });
        }

        Ok(Trail {
            name: self.name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            difficulty,
            distance_km,
            estimated_time_hours,
            elevation_gain_m: elevation as u32,
            rating,
            scenery_types: self.scenery_types.map(RawTags::into_list).unwrap_or_default(),
            trail_type,
            id,
        })
    }
}

/// Caller-side candidate filter. Unset criteria match every trail.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrailFilter {
    pub difficulty: Option<Difficulty>,
    pub max_distance: Option<f64>,
    pub max_time: Option<f64>,
    pub max_elevation: Option<u32>,
    pub trail_type: Option<TrailType>,
    /// Keeps trails with at least one scenery tag containing any of these
    pub scenery_types: Vec<String>,
    /// Trails with an unknown rating fail this criterion
    pub min_rating: Option<f64>,
    /// Case-insensitive text searched in name and location
    pub search: Option<String>,
}

impl TrailFilter {
    pub fn matches(&self, trail: &Trail) -> bool {
        if let Some(search) = self.search.as_deref().map(str::to_lowercase) {
            if !search.is_empty()
                && !trail.name.to_lowercase().contains(&search)
                && !trail.location.to_lowercase().contains(&search)
            {
                return false;
            }
        }

        if self.difficulty.is_some_and(|d| d != trail.difficulty) {
            return false;
        }
        if self.max_distance.is_some_and(|max| trail.distance_km > max) {
            return false;
        }
        if self.max_time.is_some_and(|max| trail.estimated_time_hours > max) {
            return false;
        }
        if self.max_elevation.is_some_and(|max| trail.elevation_gain_m > max) {
            return false;
        }
        if self.trail_type.is_some_and(|t| t != trail.trail_type) {
            return false;
        }

        if !self.scenery_types.is_empty() {
            let wanted: Vec<String> = self.scenery_types.iter().map(|s| s.to_lowercase()).collect();
            let has_match = trail.scenery_types.iter().any(|tag| {
                let tag = tag.to_lowercase();
                wanted.iter().any(|w| tag.contains(w.as_str()))
            });
            if !has_match {
                return false;
            }
        }

        if let Some(min) = self.min_rating {
            match trail.rating {
                Some(rating) if rating >= min => {}
                _ => return false,
            }
        }

        true
    }
}

/// Summary statistics of a catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_trails: usize,
    pub difficulties: BTreeMap<Difficulty, usize>,
    pub trail_types: BTreeMap<TrailType, usize>,
    /// Mean over trails with a known rating
    pub average_rating: Option<f64>,
    pub average_distance: Option<f64>,
    pub average_time: Option<f64>,
    pub average_elevation: Option<f64>,
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Normalized trail records in source order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    trails: Vec<Trail>,
    skipped: usize,
}

impl Catalog {
    pub fn new(trails: Vec<Trail>) -> Self {
        Self { trails, skipped: 0 }
    }

    /// Normalizes raw records, skipping and logging the invalid ones
    pub fn from_raw(records: Vec<RawTrail>) -> Self {
        let mut trails = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (index, record) in records.into_iter().enumerate() {
            match record.normalize() {
                Ok(trail) => trails.push(trail),
                Err(e) => {
                    warn!(event = "trail_skipped", record = index, reason = %e);
                    skipped += 1;
                }
            }
        }
        Self { trails, skipped }
    }

    /// Parses a JSON array, an object holding `trails` or `items`, or
    /// newline-delimited JSON records
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<RawTrail> = match serde_json::from_str::<serde_json::Value>(json.trim()) {
            Ok(items @ serde_json::Value::Array(_)) => serde_json::from_value(items)?,
            Ok(serde_json::Value::Object(mut root)) => {
                match root.remove("trails").or_else(|| root.remove("items")) {
                    Some(items @ serde_json::Value::Array(_)) => serde_json::from_value(items)?,
                    Some(_) => return Err(CatalogError::UnsupportedLayout),
                    // A lone object is a single-record NDJSON file
                    None => vec![serde_json::from_value(serde_json::Value::Object(root))?],
                }
            }
            Ok(_) => return Err(CatalogError::UnsupportedLayout),
            Err(_) => json
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str::<RawTrail>)
                .collect::<Result<_, _>>()?,
        };

        let catalog = Self::from_raw(records);
        info!(
            event = "catalog_loaded",
            trails = catalog.len(),
            skipped = catalog.skipped()
        );
        Ok(catalog)
    }

    /// Parses CSV with a header row. Rows that do not deserialize are
    /// skipped and counted like records that fail normalization.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        reader.headers()?;

        let mut records = Vec::new();
        let mut unreadable = 0;
        for (index, row) in reader.deserialize::<RawTrail>().enumerate() {
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(event = "trail_skipped", record = index, reason = %e);
                    unreadable += 1;
                }
            }
        }

        let mut catalog = Self::from_raw(records);
        catalog.skipped += unreadable;
        info!(
            event = "catalog_loaded",
            format = "csv",
            trails = catalog.len(),
            skipped = catalog.skipped()
        );
        Ok(catalog)
    }

    pub fn from_csv_str(csv: &str) -> Result<Self, CatalogError> {
        Self::from_csv_reader(csv.as_bytes())
    }

    /// Loads a catalog file: `.csv` as CSV, anything else as JSON or NDJSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(File::open(path)?)
        } else {
            let contents = fs::read_to_string(path)?;
            Self::from_json_str(&contents)
        }
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Number of records rejected during normalization
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, id: &str) -> Option<&Trail> {
        self.trails.iter().find(|t| t.id == id)
    }

    /// Candidate pool matching `filter`, in catalog order
    pub fn filter(&self, filter: &TrailFilter) -> Vec<Trail> {
        self.trails
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Distinct scenery tags, sorted
    pub fn scenery_types(&self) -> Vec<String> {
        self.trails
            .iter()
            .flat_map(|t| t.scenery_types.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut difficulties = BTreeMap::new();
        let mut trail_types = BTreeMap::new();
        for trail in &self.trails {
            *difficulties.entry(trail.difficulty).or_insert(0) += 1;
            *trail_types.entry(trail.trail_type).or_insert(0) += 1;
        }

        CatalogStats {
            total_trails: self.trails.len(),
            difficulties,
            trail_types,
            average_rating: mean(self.trails.iter().filter_map(|t| t.rating)),
            average_distance: mean(self.trails.iter().map(|t| t.distance_km)),
            average_time: mean(self.trails.iter().map(|t| t.estimated_time_hours)),
            average_elevation: mean(self.trails.iter().map(|t| f64::from(t.elevation_gain_m))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "trail_id": "BC_001",
            "trail_name": "Alice Lake",
            "location": "Squamish, BC",
            "difficulty": "easy",
            "distance_km": 4.5,
            "estimated_time_hours": "2.0",
            "elevation_gain_m": "150",
            "rating": 4.4,
            "scenery_types": "Lake, Forest",
            "trail_type": "Loop"
        },
        {
            "trail_id": "BC_061",
            "trail_name": "Garibaldi Lake",
            "location": "Whistler, BC",
            "difficulty": "Hard",
            "distance_km": 18.0,
            "estimated_time_hours": 8.0,
            "elevation_gain_m": "1,200",
            "scenery_types": ["Lake", "Mountain views", "Alpine"],
            "trail_type": "Out and Back"
        },
        {
            "trail_id": "BROKEN",
            "difficulty": "Easy",
            "estimated_time_hours": 1.0,
            "elevation_gain_m": 10
        }
    ]"#;

    #[test]
    fn test_load_and_normalize() {
        let catalog = Catalog::from_json_str(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.skipped(), 1);

        let alice = catalog.get("BC_001").unwrap();
        assert_eq!(alice.difficulty, Difficulty::Easy);
        assert_eq!(alice.estimated_time_hours, 2.0);
        assert_eq!(alice.elevation_gain_m, 150);
        assert_eq!(alice.scenery_types, vec!["Lake", "Forest"]);

        let garibaldi = catalog.get("BC_061").unwrap();
        assert_eq!(garibaldi.elevation_gain_m, 1200);
        assert_eq!(garibaldi.rating, None);
        assert_eq!(garibaldi.trail_type, TrailType::OutAndBack);
    }

    #[test]
    fn test_missing_distance_is_not_zero() {
        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "X", "estimated_time_hours": 1, "elevation_gain_m": 0}"#,
        )
        .unwrap();
        match raw.normalize() {
            Err(CatalogError::MissingField { trail_id, field }) => {
                assert_eq!(trail_id, "X");
                assert_eq!(field, "distance_km");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(parse_difficulty("Moderate/Hard"), Some(Difficulty::Moderate));
        assert_eq!(parse_difficulty(""), Some(Difficulty::Moderate));
        assert_eq!(parse_difficulty("extreme"), None);
        assert_eq!(parse_trail_type("Out & Back"), Some(TrailType::OutAndBack));
        assert_eq!(parse_trail_type("point to point"), Some(TrailType::PointToPoint));
        assert_eq!(parse_trail_type("P2P"), Some(TrailType::PointToPoint));
        assert_eq!(parse_trail_type(""), Some(TrailType::Loop));
        assert_eq!(parse_trail_type("lollipop"), None);
    }

    #[test]
    fn test_negative_number_rejected() {
        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "N", "distance_km": -2, "estimated_time_hours": 1, "elevation_gain_m": 0}"#,
        )
        .unwrap();
        assert!(matches!(
            raw.normalize(),
            Err(CatalogError::InvalidNumber { field: "distance_km", .. })
        ));
    }

    #[test]
    fn test_rating_above_scale_rejected() {
        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "R", "rating": 47, "distance_km": 2, "estimated_time_hours": 1, "elevation_gain_m": 0}"#,
        )
        .unwrap();
        assert!(matches!(
            raw.normalize(),
            Err(CatalogError::InvalidNumber { field: "rating", .. })
        ));

        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "R", "rating": "5.0", "distance_km": 2, "estimated_time_hours": 1, "elevation_gain_m": 0}"#,
        )
        .unwrap();
        assert_eq!(raw.normalize().unwrap().rating, Some(MAX_RATING));
    }

    #[test]
    fn test_elevation_rounded_and_range_checked() {
        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "E", "distance_km": 2, "estimated_time_hours": 1, "elevation_gain_m": "1,200.9"}"#,
        )
        .unwrap();
        assert_eq!(raw.normalize().unwrap().elevation_gain_m, 1201);

        let raw: RawTrail = serde_json::from_str(
            r#"{"trail_id": "E", "distance_km": 2, "estimated_time_hours": 1, "elevation_gain_m": 5e10}"#,
        )
        .unwrap();
        assert!(matches!(
            raw.normalize(),
            Err(CatalogError::InvalidNumber { field: "elevation_gain_m", .. })
        ));
    }

    #[test]
    fn test_csv_catalog() {
        let csv = "\
trail_id,trail_name,location,difficulty,distance_km,estimated_time_hours,elevation_gain_m,rating,scenery_types,trail_type,alltrails_url
BC_001,Alice Lake,\"Squamish, BC\",Easy,4.5,2.0,150,4.4,\"Lake, Forest\",Loop,https://example.org/a
BC_061,Garibaldi Lake,\"Whistler, BC\",Hard,18.0,8.0,\"1,200\",,\"Lake, Alpine\",Out & Back,
BROKEN,No Distance,Nowhere,Easy,,1.0,10,,,Loop,
";
        let catalog = Catalog::from_csv_str(csv).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.skipped(), 1);

        let alice = catalog.get("BC_001").unwrap();
        assert_eq!(alice.location, "Squamish, BC");
        assert_eq!(alice.distance_km, 4.5);
        assert_eq!(alice.rating, Some(4.4));
        assert_eq!(alice.scenery_types, vec!["Lake", "Forest"]);

        let garibaldi = catalog.get("BC_061").unwrap();
        assert_eq!(garibaldi.elevation_gain_m, 1200);
        assert_eq!(garibaldi.rating, None);
        assert_eq!(garibaldi.trail_type, TrailType::OutAndBack);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = std::env::temp_dir().join(format!("group_trails_catalog_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let csv_path = dir.join("trails.CSV");
        fs::write(
            &csv_path,
            "trail_id,distance_km,estimated_time_hours,elevation_gain_m\nA,1,1,1\nB,2,1,1\n",
        )
        .unwrap();
        assert_eq!(Catalog::load(&csv_path).unwrap().len(), 2);

        let json_path = dir.join("trails.json");
        fs::write(&json_path, SAMPLE).unwrap();
        assert_eq!(Catalog::load(&json_path).unwrap().len(), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_wrapped_and_ndjson_layouts() {
        let wrapped = r#"{"trails": [{"trail_id": "A", "distance_km": 1, "estimated_time_hours": 1, "elevation_gain_m": 1}]}"#;
        assert_eq!(Catalog::from_json_str(wrapped).unwrap().len(), 1);

        let ndjson = "{\"trail_id\": \"A\", \"distance_km\": 1, \"estimated_time_hours\": 1, \"elevation_gain_m\": 1}\n\
                      {\"trail_id\": \"B\", \"distance_km\": 2, \"estimated_time_hours\": 1, \"elevation_gain_m\": 1}\n";
        let catalog = Catalog::from_json_str(ndjson).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.trails()[1].id, "B");

        assert!(matches!(
            Catalog::from_json_str("42"),
            Err(CatalogError::UnsupportedLayout)
        ));
    }

    #[test]
    fn test_filter() {
        let catalog = Catalog::from_json_str(SAMPLE).unwrap();

        let filter = TrailFilter {
            max_distance: Some(10.0),
            ..TrailFilter::default()
        };
        assert_eq!(catalog.filter(&filter).len(), 1);

        let filter = TrailFilter {
            scenery_types: vec!["alpine".to_string()],
            ..TrailFilter::default()
        };
        assert_eq!(catalog.filter(&filter)[0].id, "BC_061");

        let filter = TrailFilter {
            min_rating: Some(4.0),
            ..TrailFilter::default()
        };
        assert_eq!(catalog.filter(&filter)[0].id, "BC_001");
        assert_eq!(catalog.filter(&filter).len(), 1);

        let filter = TrailFilter {
            search: Some("whistler".to_string()),
            ..TrailFilter::default()
        };
        assert_eq!(catalog.filter(&filter)[0].id, "BC_061");

        assert_eq!(catalog.filter(&TrailFilter::default()).len(), 2);
    }

    #[test]
    fn test_stats_and_scenery() {
        let catalog = Catalog::from_json_str(SAMPLE).unwrap();
        let stats = catalog.stats();
        assert_eq!(stats.total_trails, 2);
        assert_eq!(stats.difficulties.get(&Difficulty::Easy), Some(&1));
        assert_eq!(stats.average_rating, Some(4.4));
        assert_eq!(stats.average_distance, Some((4.5 + 18.0) / 2.0));
        assert_eq!(
            catalog.scenery_types(),
            vec!["Alpine", "Forest", "Lake", "Mountain views"]
        );

        assert_eq!(Catalog::default().stats().average_distance, None);
    }
}
