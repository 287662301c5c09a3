//! Province directory data tests
//!
//! The shipped directory file is the source of truth for the fan-out, so
//! its invariants are checked here: 81 provinces, unique two-character
//! plate codes, coordinates for every entry.

use std::collections::HashSet;

use serde_json::Value;

use shared::models::Province;

fn load_provinces() -> Vec<Province> {
    let raw = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../data/province_coordinates.json"
    ))
    .expect("province directory file");

    let value: Value = serde_json::from_str(&raw).expect("valid JSON");
    serde_json::from_value(value["provinces"].clone()).expect("province entries")
}

#[test]
fn directory_holds_all_81_provinces() {
    assert_eq!(load_provinces().len(), 81);
}

#[test]
fn plate_codes_are_unique_two_character_strings() {
    let provinces = load_provinces();
    let mut seen = HashSet::new();

    for province in &provinces {
        assert_eq!(
            province.plate_code.len(),
            2,
            "bad plate code for {}",
            province.name
        );
        assert!(
            province.plate_code.chars().all(|c| c.is_ascii_digit()),
            "non-numeric plate code for {}",
            province.name
        );
        assert!(
            seen.insert(province.plate_code.clone()),
            "duplicate plate code {}",
            province.plate_code
        );
    }
}

#[test]
fn every_province_has_coordinates_inside_turkey() {
    for province in load_provinces() {
        let coordinates = province
            .coordinates()
            .unwrap_or_else(|| panic!("{} has no coordinates", province.name));

        // Turkey's bounding box, roughly 35-43N and 25-45E
        assert!(
            (35.0..=43.0).contains(&coordinates.latitude),
            "latitude out of range for {}",
            province.name
        );
        assert!(
            (25.0..=45.5).contains(&coordinates.longitude),
            "longitude out of range for {}",
            province.name
        );
    }
}
