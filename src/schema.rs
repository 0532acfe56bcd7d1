//! Column role inference.
//!
//! The published CSV does not have a stable header, so each logical column is
//! located by matching candidate substrings against the (trimmed, lowercased)
//! header names.
use crate::error::{ReportError, Result};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ColumnRole {
    #[strum(to_string = "region code")]
    RegionCode,
    #[strum(to_string = "region name")]
    RegionName,
    #[strum(to_string = "commune name")]
    CommuneName,
    #[strum(to_string = "facility name")]
    FacilityName,
    #[strum(to_string = "latitude")]
    Latitude,
    #[strum(to_string = "longitude")]
    Longitude,
}

/// Candidate substrings for each role.
///
/// Each role has one or more tiers. The first tier holds the names used by
/// the catalog export; later tiers are only consulted when no column matches
/// an earlier one.
pub const ROLE_CANDIDATES: &[(ColumnRole, &[&[&str]])] = &[
    (
        ColumnRole::RegionCode,
        &[
            &["regioncodigo"],
            &[
                "codigoregion",
                "codigo_region",
                "cod_region",
                "region_cod",
                "regioncode",
            ],
        ],
    ),
    (
        ColumnRole::RegionName,
        &[
            &["regionglosa"],
            &["nombre_region", "region_nombre", "region_name", "region"],
        ],
    ),
    (
        ColumnRole::CommuneName,
        &[
            &["comunaglosa"],
            &["nombre_comuna", "comuna_nombre", "comuna", "commune"],
        ],
    ),
    (
        ColumnRole::FacilityName,
        &[
            &["establecimientoglosa"],
            &["nombre_establecimiento", "establecimiento", "estab", "facility"],
        ],
    ),
    (ColumnRole::Latitude, &[&["latitud", "lat"]]),
    (ColumnRole::Longitude, &[&["longitud", "lon", "lng"]]),
];

const REQUIRED_ROLES: [ColumnRole; 4] = [
    ColumnRole::RegionCode,
    ColumnRole::RegionName,
    ColumnRole::CommuneName,
    ColumnRole::FacilityName,
];

impl ColumnRole {
    pub fn candidate_tiers(self) -> &'static [&'static [&'static str]] {
        ROLE_CANDIDATES
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, tiers)| *tiers)
            .unwrap_or_default()
    }
}

/// Find the column for a list of candidate substrings.
///
/// Returns the index of the first column, in header order, that contains any
/// of the candidates, or `None` if no column does.
pub fn find_column(columns: &[String], candidates: &[&str]) -> Option<usize> {
    find_unclaimed(columns, candidates, &[])
}

/// Like [`find_column`], skipping columns already bound to another role.
fn find_unclaimed(columns: &[String], candidates: &[&str], claimed: &[usize]) -> Option<usize> {
    columns.iter().enumerate().find_map(|(idx, col)| {
        let matches = candidates.iter().any(|candidate| col.contains(candidate));
        (matches && !claimed.contains(&idx)).then_some(idx)
    })
}

/// Column indices for each logical role, built once after load.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRoles {
    pub region_code: usize,
    pub region_name: usize,
    pub commune: usize,
    pub facility: usize,
    pub latitude: Option<usize>,
    pub longitude: Option<usize>,
}

impl ColumnRoles {
    /// Resolve every role against the header, failing if a mandatory role is
    /// missing.
    ///
    /// Roles are resolved in order and a column bound to one role is not
    /// offered to the next, so `region` cannot also be taken by `region_code`.
    pub fn resolve(columns: &[String]) -> Result<Self> {
        let mut claimed: Vec<usize> = Vec::new();
        let mut lookup = |role: ColumnRole| {
            let found = role
                .candidate_tiers()
                .iter()
                .find_map(|tier| find_unclaimed(columns, tier, &claimed));
            claimed.extend(found);
            found
        };

        let required: Vec<Option<usize>> = REQUIRED_ROLES.into_iter().map(&mut lookup).collect();
        let latitude = lookup(ColumnRole::Latitude);
        let longitude = lookup(ColumnRole::Longitude);

        let &[Some(region_code), Some(region_name), Some(commune), Some(facility)] =
            required.as_slice()
        else {
            let missing = REQUIRED_ROLES
                .into_iter()
                .zip(&required)
                .filter(|(_, found)| found.is_none())
                .map(|(role, _)| role)
                .collect();
            return Err(ReportError::MissingColumns(missing));
        };

        Ok(ColumnRoles {
            region_code,
            region_name,
            commune,
            facility,
            latitude,
            longitude,
        })
    }

    /// Whether per-record coordinates can be read.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Column name per resolved role, for diagnostics.
    pub fn describe<'a>(&self, columns: &'a [String]) -> Vec<(ColumnRole, &'a str)> {
        let name = |idx: usize| columns.get(idx).map_or("", String::as_str);
        let mut out = vec![
            (ColumnRole::RegionCode, name(self.region_code)),
            (ColumnRole::RegionName, name(self.region_name)),
            (ColumnRole::CommuneName, name(self.commune)),
            (ColumnRole::FacilityName, name(self.facility)),
        ];
        if let Some(idx) = self.latitude {
            out.push((ColumnRole::Latitude, name(idx)));
        }
        if let Some(idx) = self.longitude {
            out.push((ColumnRole::Longitude, name(idx)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_catalog_header() {
        let columns = cols(&[
            "establecimientocodigo",
            "regioncodigo",
            "regionglosa",
            "comunacodigo",
            "comunaglosa",
            "tipoestablecimientoglosa",
            "establecimientoglosa",
            "latitudglosa",
            "longitudglosa",
        ]);
        let roles = ColumnRoles::resolve(&columns).unwrap();
        assert_eq!(roles.region_code, 1);
        assert_eq!(roles.region_name, 2);
        assert_eq!(roles.commune, 4);
        // the type column comes first and contains "establecimientoglosa"
        assert_eq!(roles.facility, 5);
        assert_eq!(roles.latitude, Some(7));
        assert_eq!(roles.longitude, Some(8));
        assert!(roles.has_coordinates());
    }

    #[rstest]
    #[case(&["region_code", "region", "comuna", "estab"])]
    #[case(&["estab", "comuna", "region", "region_code"])]
    #[case(&["codigo_region", "nombre_region", "nombre_comuna", "nombre_establecimiento"])]
    fn test_resolve_any_naming(#[case] names: &[&str]) {
        let columns = cols(names);
        let roles = ColumnRoles::resolve(&columns).unwrap();
        let described = roles.describe(&columns);
        assert_eq!(described.len(), 4);
        assert!(columns[roles.region_code].contains("cod"));
        assert_ne!(roles.region_code, roles.region_name);
        assert!(!roles.has_coordinates());
    }

    #[test]
    fn test_first_matching_column_wins() {
        let columns = cols(&["lat_aprox", "latitud"]);
        assert_eq!(find_column(&columns, &["latitud", "lat"]), Some(0));
        assert_eq!(find_column(&columns, &["latitud"]), Some(1));

        let columns = cols(&["region_code", "region"]);
        assert_eq!(find_column(&columns, &["region"]), Some(0));
    }

    #[test]
    fn test_facility_binds_to_type_column_when_first() {
        let columns = cols(&[
            "regioncodigo",
            "regionglosa",
            "comunaglosa",
            "tipoestablecimientoglosa",
            "establecimientoglosa",
        ]);
        assert_eq!(ColumnRoles::resolve(&columns).unwrap().facility, 3);
    }

    #[test]
    fn test_claimed_column_not_reused() {
        let columns = cols(&["region_code", "region", "comuna", "estab"]);
        let roles = ColumnRoles::resolve(&columns).unwrap();
        assert_eq!(roles.region_code, 0);
        assert_eq!(roles.region_name, 1);
    }

    #[test]
    fn test_fallback_tier_only_without_catalog_name() {
        // "comunacodigo" contains "comuna" but the catalog name is present
        let columns = cols(&[
            "regioncodigo",
            "regionglosa",
            "comunacodigo",
            "comunaglosa",
            "establecimientoglosa",
        ]);
        assert_eq!(ColumnRoles::resolve(&columns).unwrap().commune, 3);
    }

    #[test]
    fn test_not_found() {
        assert_eq!(find_column(&cols(&["a", "b"]), &["comuna"]), None);
        assert_eq!(find_column(&[], &["comuna"]), None);
    }

    #[test]
    fn test_missing_roles_are_reported() {
        let columns = cols(&["regioncodigo", "regionglosa", "direccion"]);
        match ColumnRoles::resolve(&columns) {
            Err(ReportError::MissingColumns(missing)) => assert_eq!(
                missing,
                vec![ColumnRole::CommuneName, ColumnRole::FacilityName]
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
