// City name to coordinate lookup.
//
// The dataset is a CSV with a header row and at least these columns:
// city, city_ascii, lat, lng, country, iso2, iso3, admin_name. Keys are
// "city, admin_name, country".

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use crate::error::CoreError;

const MIN_COLUMNS: usize = 8;

/// Anything that can resolve a city key to `(longitude, latitude)`.
pub trait CityLookup: Send + Sync {
    fn coordinates(&self, key: &str) -> Option<(f64, f64)>;
}

/// An in-memory city table.
#[derive(Debug, Clone, Default)]
pub struct CityTable {
    by_key: HashMap<String, (f64, f64)>,
}

impl CityTable {
    /// Parse a dataset. Short rows and rows with unparseable coordinates
    /// are skipped; a malformed CSV stream is an error.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::default();
        for record in csv.records() {
            let record = record?;
            if record.len() < MIN_COLUMNS {
                continue;
            }
            let field = |i: usize| record.get(i).map_or("", str::trim);
            let key = format!("{}, {}, {}", field(0), field(7), field(4));
            match (field(2).parse::<f64>(), field(3).parse::<f64>()) {
                (Ok(lat), Ok(lon)) => table.insert(key, lon, lat),
                _ => debug!(%key, "skipping city with unparseable coordinates"),
            }
        }
        Ok(table)
    }

    /// Load a dataset from disk.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let dataset_error = |message: String| CoreError::CityDataset {
            path: path.display().to_string(),
            message,
        };
        let file = std::fs::File::open(path).map_err(|e| dataset_error(e.to_string()))?;
        Self::from_reader(file).map_err(|e| dataset_error(e.to_string()))
    }

    pub fn insert(&mut self, key: impl Into<String>, longitude: f64, latitude: f64) {
        self.by_key.insert(key.into(), (longitude, latitude));
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl CityLookup for CityTable {
    fn coordinates(&self, key: &str) -> Option<(f64, f64)> {
        self.by_key.get(key).copied()
    }
}

// ── Process-wide table ───────────────────────────────────────────────

static CITIES: OnceLock<CityTable> = OnceLock::new();

/// Lookup backed by one table shared by the whole process.
///
/// The table is read from `dataset` on the first lookup and never reloaded.
/// A dataset that cannot be read leaves an empty table behind, so every
/// later lookup misses.
#[derive(Debug, Clone)]
pub struct ProcessCities {
    dataset: PathBuf,
}

impl ProcessCities {
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    fn table(&self) -> &'static CityTable {
        CITIES.get_or_init(|| match CityTable::load(&self.dataset) {
            Ok(table) => {
                info!(cities = table.len(), path = %self.dataset.display(), "city table loaded");
                table
            }
            Err(e) => {
                warn!(error = %e, "city table unavailable, coordinate fallback disabled");
                CityTable::default()
            }
        })
    }
}

impl CityLookup for ProcessCities {
    fn coordinates(&self, key: &str) -> Option<(f64, f64)> {
        self.table().coordinates(key)
    }
}
