// ── Geographic placement ──
//
// Latitude/longitude to display coordinates, and the city-name table used
// when an inventory record carries no coordinates of its own.

mod cities;
mod projection;

pub use cities::{CityLookup, CityTable, ProcessCities};
pub use projection::{NULL_ISLAND, project};
