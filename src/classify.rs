//! Entity categories and the row visibility predicate shared by every
//! filtered derivation.

use serde::Serialize;

use crate::model::{FilterConfig, Row};

/// Category of a reporting entity, as far as the row itself can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    World,
    /// Global Carbon Project group, e.g. "Africa (GCP)".
    GcpGroup,
    /// Aggregate with an `OWID_*` code.
    OwidAggregate,
    /// Region or income bracket without an ISO code.
    Group,
    Country,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::World => "world",
            EntityKind::GcpGroup => "GCP group",
            EntityKind::OwidAggregate => "OWID aggregate",
            EntityKind::Group => "group",
            EntityKind::Country => "country",
        }
    }
}

fn is_world(row: &Row) -> bool {
    row.entity.to_lowercase() == "world"
}

fn is_gcp(row: &Row) -> bool {
    row.entity.to_lowercase().contains("(gcp)")
}

fn is_owid(row: &Row) -> bool {
    row.code
        .as_deref()
        .map(|c| c.starts_with("OWID"))
        .unwrap_or(false)
}

pub fn classify(row: &Row) -> EntityKind {
    if is_world(row) {
        EntityKind::World
    } else if is_gcp(row) {
        EntityKind::GcpGroup
    } else if is_owid(row) {
        EntityKind::OwidAggregate
    } else if !row.has_code() {
        EntityKind::Group
    } else {
        EntityKind::Country
    }
}

/// Category exclusions only; the allowlist is not consulted.
pub fn passes_categories(row: &Row, filter: &FilterConfig) -> bool {
    let has_code = row.has_code();

    if filter.hide_world && is_world(row) {
        return false;
    }
    if filter.hide_groups && !has_code {
        return false;
    }
    if filter.hide_gcp && is_gcp(row) {
        return false;
    }
    if filter.hide_owid && is_owid(row) {
        return false;
    }
    if filter.hide_regular && has_code {
        return false;
    }
    true
}

/// Full predicate: category exclusions, then the allowlist when it is non-empty.
pub fn is_visible(row: &Row, filter: &FilterConfig) -> bool {
    passes_categories(row, filter)
        && (filter.allowlist.is_empty() || filter.allowlist.contains(&row.entity))
}
