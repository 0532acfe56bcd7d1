//! Shared test data.
use crate::loader::Dataset;
use crate::types::FacilityRecord;
use rstest::fixture;

pub fn record(code: Option<i64>, region: &str, commune: &str, facility: &str) -> FacilityRecord {
    FacilityRecord {
        region_code: code,
        region: region.to_string(),
        commune: commune.to_string(),
        facility: facility.to_string(),
        lat: None,
        lon: None,
    }
}

/// Seven facilities over three regions, deliberately not in region order.
pub fn sample_records() -> Vec<FacilityRecord> {
    vec![
        record(Some(13), "Metropolitana de Santiago", "Santiago", "Hospital San Juan de Dios"),
        record(Some(1), "Tarapacá", "Iquique", "Posta de Salud Rural Chanavayita"),
        record(Some(13), "Metropolitana de Santiago", "Maipú", "CESFAM Dr. Carlos Godoy"),
        record(Some(8), "Biobío", "Concepción", "Hospital Guillermo Grant Benavente"),
        record(Some(13), "Metropolitana de Santiago", "Santiago", "SAPU Padre Orellana"),
        record(Some(1), "Tarapacá", "Iquique", "CESFAM Cirujano Aguirre"),
        record(Some(13), "Metropolitana de Santiago", "Colina", "Laboratorio Central"),
    ]
}

#[fixture]
pub fn sample_dataset() -> Dataset {
    Dataset::from_records(sample_records(), false, "fixture")
}

/// Semicolon-separated export in the catalog's layout, as UTF-8 text.
pub const SAMPLE_CSV: &str = "\
 RegionCodigo ;RegionGlosa;ComunaGlosa;EstablecimientoGlosa;LatitudGlosa;LongitudGlosa
13;Región Metropolitana de Santiago;Santiago;Hospital San Juan de Dios;-33,4372;-70,6853
13;Región Metropolitana de Santiago;Maipú;CESFAM Dr. Carlos Godoy;-33,5106;-70,7572
1;Región de Tarapacá;Iquique;Posta de Salud Rural Chanavayita;sin dato;
1;Región de Tarapacá;Iquique;CESFAM Cirujano Aguirre;-20,2141;-70,1524;extra
8;Región del Biobío;Concepción;Hospital Guillermo Grant Benavente
";
