mod common;

use co2dash::schema::UnresolvedSchema;
use co2dash::{load_table, CompressionFormat, OpenOptions};
use color_eyre::Result;
use common::{write_temp_file, SAMPLE_CSV};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

#[test]
fn loads_plain_csv() -> Result<()> {
    let (_dir, path) = write_temp_file("co2.csv", SAMPLE_CSV.as_bytes());
    let table = load_table(&path, &OpenOptions::new())?;

    assert_eq!(table.schema.entity, "Entity");
    assert_eq!(table.schema.co2, "Annual CO₂ emissions");
    assert_eq!(table.store.len(), 13);

    let africa = table
        .store
        .rows()
        .iter()
        .find(|r| r.entity == "Africa")
        .expect("Africa row");
    assert!(!africa.has_code());
    assert_eq!(africa.year, Some(2020));
    assert_eq!(africa.co2, 1.3e9);
    Ok(())
}

#[test]
fn loads_gzip_by_extension() -> Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(SAMPLE_CSV.as_bytes())?;
    let compressed = encoder.finish()?;
    let (_dir, path) = write_temp_file("co2.csv.gz", &compressed);

    let table = load_table(&path, &OpenOptions::new())?;
    assert_eq!(table.store.len(), 13);
    Ok(())
}

#[test]
fn explicit_compression_overrides_extension() -> Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(SAMPLE_CSV.as_bytes())?;
    let compressed = encoder.finish()?;
    let (_dir, path) = write_temp_file("co2.data", &compressed);

    let opts = OpenOptions::new().with_compression(CompressionFormat::Gzip);
    let table = load_table(&path, &opts)?;
    assert_eq!(table.store.len(), 13);
    Ok(())
}

#[test]
fn custom_delimiter_and_spanish_headers() -> Result<()> {
    let csv = "País;Código;Año;Emisiones\nChile;CHL;2020;8e7\nChile;CHL;2021.0;8.5e7\n";
    let (_dir, path) = write_temp_file("emisiones.csv", csv.as_bytes());

    let table = load_table(&path, &OpenOptions::new().with_delimiter(b';'))?;
    assert_eq!(table.schema.entity, "País");
    assert_eq!(table.schema.year, "Año");
    let years: Vec<Option<i32>> = table.store.rows().iter().map(|r| r.year).collect();
    assert_eq!(years, vec![Some(2020), Some(2021)]);
    Ok(())
}

#[test]
fn messy_cells_do_not_abort() -> Result<()> {
    let csv = "Entity,Code,Year,CO2\nChile,CHL,n/a,100\nPeru,PER,2020,oops\n";
    let (_dir, path) = write_temp_file("messy.csv", csv.as_bytes());

    let table = load_table(&path, &OpenOptions::new())?;
    let rows = table.store.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, None);
    assert_eq!(rows[0].co2, 100.0);
    assert_eq!(rows[1].year, Some(2020));
    assert_eq!(rows[1].co2, 0.0);
    Ok(())
}

#[test]
fn unknown_headers_are_rejected() {
    let csv = "name_of_thing,when,amount\nA,2020,1\n";
    let (_dir, path) = write_temp_file("bad.csv", csv.as_bytes());

    let err = load_table(&path, &OpenOptions::new()).expect_err("schema should not resolve");
    let schema = err
        .downcast_ref::<UnresolvedSchema>()
        .expect("UnresolvedSchema error");
    assert!(schema.missing.contains(&"year"));
    assert!(schema.missing.contains(&"co2"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = load_table(&dir.path().join("absent.csv"), &OpenOptions::new());
    assert!(result.is_err());
}
