//! Static catalog of Amsterdam city offices.
//!
//! Read-only reference data: office ids are the same ids the upstream
//! wait-time feed uses, coordinates are WGS84.

use serde::Serialize;

/// A physical city office with a stable id and coordinates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OfficeLocation {
    pub office_id: i32,
    pub lat: f64,
    pub lon: f64,
    pub address: &'static str,
}

/// All known offices, in catalog order.
pub const OFFICES: &[OfficeLocation] = &[
    OfficeLocation { office_id: 1, lat: 52.3702, lon: 4.9021, address: "Amstel 1, 1011 PN Amsterdam" }, // Centrum
    OfficeLocation { office_id: 2, lat: 52.3912, lon: 4.9340, address: "Buikslotermeerplein 2000, 1025 XL Amsterdam" }, // Noord
    OfficeLocation { office_id: 3, lat: 52.3172, lon: 4.9533, address: "Anton de Komplein 150, 1102 CW Amsterdam" }, // Zuidoost
    OfficeLocation { office_id: 4, lat: 52.3659, lon: 4.9419, address: "Oranje-Vrijstaatplein 2, 1093 NG Amsterdam" }, // Oost
    OfficeLocation { office_id: 5, lat: 52.3722, lon: 4.8650, address: "Jan van Galenstraat, 1056 AA Amsterdam" }, // West
    OfficeLocation { office_id: 6, lat: 52.3581, lon: 4.8038, address: "Osdorpplein 1000, 1068 TG Amsterdam" }, // Nieuw-West
    OfficeLocation { office_id: 7, lat: 52.3475, lon: 4.8732, address: "President Kennedylaan 923, 1079 MZ Amsterdam" }, // Zuid
    OfficeLocation { office_id: 8, lat: 52.3074, lon: 5.0432, address: "Nieuwstraat 70a, 1381 BD Weesp" }, // Weesp
];

/// Look up one office by id.
pub fn office_by_id(office_id: i32) -> Option<&'static OfficeLocation> {
    OFFICES.iter().find(|o| o.office_id == office_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_unique_ids() {
        let mut ids: Vec<i32> = OFFICES.iter().map(|o| o.office_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), OFFICES.len());
    }

    #[test]
    fn lookup_by_id() {
        let weesp = office_by_id(8).unwrap();
        assert!(weesp.address.contains("Weesp"));
        assert!(office_by_id(99).is_none());
    }
}
