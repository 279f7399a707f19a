//! Header auto-detection. Maps raw CSV header names to the canonical
//! entity/code/year/co2 fields once per load.

use std::fmt;
use unicode_normalization::UnicodeNormalization;

const ENTITY_CANDIDATES: &[&str] = &["entity", "country", "pais", "name"];
const CODE_CANDIDATES: &[&str] = &["code", "iso"];
const YEAR_CANDIDATES: &[&str] = &["year", "anio", "ano", "año"];
const CO2_CANDIDATES: &[&str] = &["co2", "co 2", "emision", "emisiones", "emission"];

/// Header names, as written in the file, for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub entity: String,
    pub code: Option<String>,
    pub year: String,
    pub co2: String,
}

/// One or more required columns could not be matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSchema {
    pub missing: Vec<&'static str>,
    pub headers: Vec<String>,
}

impl fmt::Display for UnresolvedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid schema: could not find column(s) {} among headers [{}]",
            self.missing.join(", "),
            self.headers.join(", ")
        )
    }
}

impl std::error::Error for UnresolvedSchema {}

/// Accent-stripped, lowercased, trimmed header. NFKD also folds "₂" into "2".
pub fn normalize_header(s: &str) -> String {
    s.nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// First header (in header order) whose normalized form contains any needle.
fn pick(headers: &[String], normalized: &[String], needles: &[&str]) -> Option<String> {
    normalized
        .iter()
        .position(|h| needles.iter().any(|n| h.contains(n)))
        .map(|i| headers[i].clone())
}

pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> Result<ResolvedSchema, UnresolvedSchema> {
    let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let entity = pick(&headers, &normalized, ENTITY_CANDIDATES);
    let code = pick(&headers, &normalized, CODE_CANDIDATES);
    let year = pick(&headers, &normalized, YEAR_CANDIDATES);
    let co2 = pick(&headers, &normalized, CO2_CANDIDATES);

    match (entity, year, co2) {
        (Some(entity), Some(year), Some(co2)) => Ok(ResolvedSchema {
            entity,
            code,
            year,
            co2,
        }),
        (entity, year, co2) => {
            let mut missing = Vec::new();
            if entity.is_none() {
                missing.push("entity");
            }
            if year.is_none() {
                missing.push("year");
            }
            if co2.is_none() {
                missing.push("co2");
            }
            Err(UnresolvedSchema { missing, headers })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_owid_headers() {
        let schema =
            resolve_columns(&["Entity", "Code", "Year", "Annual CO₂ emissions"]).unwrap();
        assert_eq!(schema.entity, "Entity");
        assert_eq!(schema.code.as_deref(), Some("Code"));
        assert_eq!(schema.year, "Year");
        assert_eq!(schema.co2, "Annual CO₂ emissions");
    }

    #[test]
    fn resolves_spanish_headers() {
        let schema = resolve_columns(&["País", "Código ISO", "Año", "Emisiones (t)"]).unwrap();
        assert_eq!(schema.entity, "País");
        assert_eq!(schema.code.as_deref(), Some("Código ISO"));
        assert_eq!(schema.year, "Año");
        assert_eq!(schema.co2, "Emisiones (t)");
    }

    #[test]
    fn code_is_optional() {
        let schema = resolve_columns(&["country", "year", "co2"]).unwrap();
        assert_eq!(schema.code, None);
    }

    #[test]
    fn missing_columns_are_listed() {
        let err = resolve_columns(&["country", "value"]).unwrap_err();
        assert_eq!(err.missing, vec!["year", "co2"]);
        assert!(err.to_string().contains("year, co2"));
    }

    #[test]
    fn normalize_strips_accents_and_subscripts() {
        assert_eq!(normalize_header("  Emisión CO₂ "), "emision co2");
    }
}
