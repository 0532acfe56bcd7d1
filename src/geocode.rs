//! Static commune geocoder.
//!
//! Coordinates are urban reference points for the commune, not facility
//! locations. Only used for communes when per-record coordinates are missing.
use crate::util::normalize_name;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How many unresolved commune names are shown before truncating.
pub const UNRESOLVED_DISPLAY_LIMIT: usize = 15;

static COMMUNE_COORDINATES: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("arica", (-18.4783, -70.3126)),
        ("iquique", (-20.2141, -70.1524)),
        ("alto hospicio", (-20.2706, -70.1010)),
        ("antofagasta", (-23.6509, -70.3975)),
        ("calama", (-22.4544, -68.9294)),
        ("copiapo", (-27.3668, -70.3323)),
        ("la serena", (-29.9027, -71.2520)),
        ("coquimbo", (-29.9533, -71.3436)),
        ("valparaiso", (-33.0472, -71.6127)),
        ("vina del mar", (-33.0245, -71.5518)),
        ("santiago", (-33.4489, -70.6693)),
        ("puente alto", (-33.6117, -70.5758)),
        ("maipu", (-33.5106, -70.7572)),
        ("la florida", (-33.5227, -70.5983)),
        ("las condes", (-33.4080, -70.5670)),
        ("nunoa", (-33.4569, -70.5977)),
        ("providencia", (-33.4314, -70.6093)),
        ("san bernardo", (-33.5922, -70.6996)),
        ("rancagua", (-34.1701, -70.7444)),
        ("curico", (-34.9828, -71.2394)),
        ("talca", (-35.4264, -71.6554)),
        ("chillan", (-36.6066, -72.1034)),
        ("concepcion", (-36.8270, -73.0503)),
        ("talcahuano", (-36.7249, -73.1168)),
        ("los angeles", (-37.4697, -72.3537)),
        ("temuco", (-38.7359, -72.5904)),
        ("valdivia", (-39.8142, -73.2459)),
        ("osorno", (-40.5740, -73.1336)),
        ("puerto montt", (-41.4689, -72.9411)),
        ("coyhaique", (-45.5712, -72.0685)),
        ("punta arenas", (-53.1638, -70.9171)),
    ])
});

/// Look up a commune's reference point. Case, surrounding whitespace and
/// accents are ignored.
pub fn locate_commune(name: &str) -> Option<(f64, f64)> {
    COMMUNE_COORDINATES
        .get(normalize_name(name).as_str())
        .copied()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocatedCommune {
    pub commune: String,
    pub facilities: usize,
    pub lat: f64,
    pub lon: f64,
}

/// Result of geocoding a set of communes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommuneMap {
    pub located: Vec<LocatedCommune>,
    /// Communes with no entry in the table, in input order.
    pub unresolved: Vec<String>,
}

impl CommuneMap {
    /// Unresolved names to display, plus how many were left out.
    pub fn unresolved_preview(&self, limit: usize) -> (&[String], usize) {
        let shown = self.unresolved.len().min(limit);
        (&self.unresolved[..shown], self.unresolved.len() - shown)
    }
}

/// Geocode commune counts (usually the top N of a region).
pub fn geocode_communes(counts: &[(String, usize)]) -> CommuneMap {
    let mut map = CommuneMap::default();
    for (commune, facilities) in counts {
        match locate_commune(commune) {
            Some((lat, lon)) => map.located.push(LocatedCommune {
                commune: commune.clone(),
                facilities: *facilities,
                lat,
                lon,
            }),
            None => map.unresolved.push(commune.clone()),
        }
    }
    map
}
