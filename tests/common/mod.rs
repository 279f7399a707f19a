#![allow(dead_code)]

use co2dash::{Row, RowStore};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Small OWID-style table covering every entity category.
pub const SAMPLE_CSV: &str = "\
Entity,Code,Year,Annual CO₂ emissions
World,OWID_WRL,2020,34000000000
World,OWID_WRL,2021,36000000000
Africa,,2020,1300000000
Africa,,2021,1400000000
Africa (GCP),,2021,1450000000
High-income countries,OWID_HIC,2021,12000000000
China,CHN,2020,10900000000
China,CHN,2021,11400000000
Chile,CHL,2020,80000000
Chile,CHL,2021,85000000
Andorra,AND,2021,500000
Andorra,AND,2020,480000
Atlantis,ATL,2020,1000
";

pub fn row(entity: &str, code: Option<&str>, year: i32, co2: f64) -> Row {
    Row::new(entity, code, year, co2)
}

pub fn sample_store() -> RowStore {
    vec![
        row("World", Some("OWID_WRL"), 2020, 34e9),
        row("World", Some("OWID_WRL"), 2021, 36e9),
        row("Africa", None, 2020, 1.3e9),
        row("Africa", None, 2021, 1.4e9),
        row("Africa (GCP)", None, 2021, 1.45e9),
        row("High-income countries", Some("OWID_HIC"), 2021, 12e9),
        row("China", Some("CHN"), 2020, 10.9e9),
        row("China", Some("CHN"), 2021, 11.4e9),
        row("Chile", Some("CHL"), 2020, 8e7),
        row("Chile", Some("CHL"), 2021, 8.5e7),
        row("Andorra", Some("AND"), 2021, 5e5),
        row("Andorra", Some("AND"), 2020, 4.8e5),
        row("Atlantis", Some("ATL"), 2020, 1e3),
    ]
    .into_iter()
    .collect()
}

/// Write `contents` to `name` inside a fresh temp dir.
pub fn write_temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    let mut file = File::create(&path).expect("create file");
    file.write_all(contents).expect("write file");
    (dir, path)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
