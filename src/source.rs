//! Load an emissions CSV (optionally compressed) into a [`RowStore`].
//!
//! Every column is read as text so that messy cells never abort the load;
//! numeric conversion happens per cell after the schema is resolved.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use crate::config::AppConfig;
use crate::model::{Row, RowStore};
use crate::schema::{resolve_columns, ResolvedSchema};
use crate::{Args, CompressionFormat};

/// Options for reading the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub compression: Option<CompressionFormat>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = Some(compression);
        self
    }

    /// CLI flags take precedence over `[file_loading]` config values.
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Self {
        let mut opts = OpenOptions::new();
        if let Some(delimiter) = args.delimiter.or(config.file_loading.delimiter) {
            opts = opts.with_delimiter(delimiter);
        }
        let compression = args.compression.or_else(|| {
            config
                .file_loading
                .compression
                .as_deref()
                .and_then(CompressionFormat::from_name)
        });
        if let Some(compression) = compression {
            opts = opts.with_compression(compression);
        }
        opts
    }
}

/// Rows plus the header mapping they were extracted with.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub schema: ResolvedSchema,
    pub store: RowStore,
}

/// Read the whole file, decompressing when the format is known.
fn read_source_bytes(path: &Path, compression: Option<CompressionFormat>) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let buffered = BufReader::new(file);
    let mut reader: Box<dyn Read> = match compression {
        Some(CompressionFormat::Gzip) => Box::new(flate2::read::GzDecoder::new(buffered)),
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(buffered)?),
        Some(CompressionFormat::Bzip2) => Box::new(bzip2::read::BzDecoder::new(buffered)),
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(buffered)),
        None => Box::new(buffered),
    };
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Parse CSV bytes with every column typed as String.
pub fn read_csv_bytes(bytes: Vec<u8>, delimiter: Option<u8>) -> Result<DataFrame> {
    let mut read_options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));
    if let Some(delimiter) = delimiter {
        read_options = read_options.map_parse_options(|opts| opts.with_separator(delimiter));
    }
    let df = CsvReader::new(Cursor::new(bytes))
        .with_options(read_options)
        .finish()?;
    Ok(df)
}

/// Integer year, or a float without a fractional part. Anything else is absent.
pub fn parse_year(cell: &str) -> Option<i32> {
    let trimmed = cell.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => {
            Some(v as i32)
        }
        _ => None,
    }
}

/// Emissions in tonnes; unparseable or non-finite cells count as zero.
pub fn parse_co2(cell: &str) -> f64 {
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Resolve the header and convert every record into a typed [`Row`].
pub fn rows_from_dataframe(df: &DataFrame) -> Result<LoadedTable> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let schema = resolve_columns(&headers)?;
    log::info!(
        "Resolved columns: entity={:?} code={:?} year={:?} co2={:?}",
        schema.entity,
        schema.code,
        schema.year,
        schema.co2
    );

    let entities = string_column(df, &schema.entity)?;
    let years = string_column(df, &schema.year)?;
    let co2 = string_column(df, &schema.co2)?;
    let codes = match &schema.code {
        Some(code) => string_column(df, code)?,
        None => vec![None; df.height()],
    };

    let mut skipped_years = 0usize;
    let rows: RowStore = entities
        .into_iter()
        .zip(codes)
        .zip(years)
        .zip(co2)
        .map(|(((entity, code), year), co2)| {
            let year = year.as_deref().and_then(parse_year);
            if year.is_none() {
                skipped_years += 1;
            }
            Row {
                entity: entity.unwrap_or_default(),
                code,
                year,
                co2: co2.as_deref().map(parse_co2).unwrap_or(0.0),
            }
        })
        .collect();

    if skipped_years > 0 {
        log::debug!("{} rows have no usable year", skipped_years);
    }

    Ok(LoadedTable {
        schema,
        store: rows,
    })
}

/// Load and convert a CSV file. Compression is taken from `options`, else
/// detected from the file extension.
pub fn load_table(path: &Path, options: &OpenOptions) -> Result<LoadedTable> {
    if !path.exists() {
        return Err(eyre!("File not found: {}", path.display()));
    }
    let compression = options
        .compression
        .or_else(|| CompressionFormat::from_extension(path));
    let bytes = read_source_bytes(path, compression)?;
    log::debug!(
        "Read {} bytes from {} (compression: {:?})",
        bytes.len(),
        path.display(),
        compression
    );
    let df = read_csv_bytes(bytes, options.delimiter)?;
    let table = rows_from_dataframe(&df)?;
    log::info!("Loaded {} rows from {}", table.store.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_year_accepts_whole_numbers() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 1750 "), Some(1750));
        assert_eq!(parse_year("2021.0"), Some(2021));
        assert_eq!(parse_year("2021.5"), None);
        assert_eq!(parse_year("NaN"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn parse_co2_defaults_to_zero() {
        assert_eq!(parse_co2("3.4e10"), 3.4e10);
        assert_eq!(parse_co2("n/a"), 0.0);
        assert_eq!(parse_co2("inf"), 0.0);
        assert_eq!(parse_co2(""), 0.0);
    }

    #[test]
    fn rows_from_csv_bytes() {
        let csv = "Entity,Code,Year,Annual CO2 emissions\n\
                   World,OWID_WRL,2020,3.4e10\n\
                   Africa,,2020,1.2e9\n\
                   Chile,CHL,bad,5\n";
        let df = read_csv_bytes(csv.as_bytes().to_vec(), None).unwrap();
        let table = rows_from_dataframe(&df).unwrap();
        let rows = table.store.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Row::new("World", Some("OWID_WRL"), 2020, 3.4e10));
        assert_eq!(rows[1].code, None);
        assert_eq!(rows[2].year, None);
        assert_eq!(rows[2].co2, 5.0);
    }

    #[test]
    fn semicolon_delimiter() {
        let csv = "pais;anio;emisiones\nChile;2019;10\n";
        let df = read_csv_bytes(csv.as_bytes().to_vec(), Some(b';')).unwrap();
        let table = rows_from_dataframe(&df).unwrap();
        assert_eq!(table.schema.code, None);
        assert_eq!(table.store.rows()[0].entity, "Chile");
        assert_eq!(table.store.rows()[0].year, Some(2019));
    }

    #[test]
    fn unresolved_schema_is_an_error() {
        let csv = "name,value\nChile,10\n";
        let df = read_csv_bytes(csv.as_bytes().to_vec(), None).unwrap();
        let err = rows_from_dataframe(&df).unwrap_err();
        assert!(err.to_string().contains("Invalid schema"));
    }
}
