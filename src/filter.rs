//! # Filter Predicate Builder
//!
//! Converts the raw, string-typed query parameters of the flat and user
//! listing endpoints into a MongoDB predicate document. Every supported
//! filterable field is statically known here; a parameter that is absent (or
//! an empty string) contributes no clause, so the empty parameter set builds
//! the match-everything predicate.

use mongodb::bson::{Bson, Document, doc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiError;

/// Request-level toggle selecting the semantics of every multi-valued filter
/// field: `any` passes on a non-empty intersection, `all` requires containment
/// of every supplied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Any,
    All,
}

impl MatchMode {
    /// Any value other than `"all"` (including absence) selects [`MatchMode::Any`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("all") => MatchMode::All,
            _ => MatchMode::Any,
        }
    }
}

/// One predicate clause over a statically known field.
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Substring {
        field: &'static str,
        needle: String,
    },
    Range {
        field: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
    Equals {
        field: &'static str,
        value: String,
    },
    ContainsAll {
        field: &'static str,
        values: Vec<String>,
    },
    ContainsAny {
        field: &'static str,
        values: Vec<String>,
    },
}

impl Condition {
    fn clause(self) -> (&'static str, Bson) {
        match self {
            Condition::Substring { field, needle } => (
                field,
                Bson::Document(doc! { "$regex": regex::escape(&needle), "$options": "i" }),
            ),
            Condition::Range { field, min, max } => {
                let mut bounds = Document::new();
                if let Some(min) = min {
                    bounds.insert("$gte", min);
                }
                if let Some(max) = max {
                    bounds.insert("$lte", max);
                }
                (field, Bson::Document(bounds))
            }
            Condition::Equals { field, value } => (field, Bson::String(value)),
            Condition::ContainsAll { field, values } => {
                (field, Bson::Document(doc! { "$all": values }))
            }
            Condition::ContainsAny { field, values } => {
                (field, Bson::Document(doc! { "$in": values }))
            }
        }
    }
}

/// Ordered list of optional condition constructors. Each constructor consumes
/// one named parameter and appends zero or one clause; [`PredicateBuilder::build`]
/// composes the clauses by logical AND.
#[derive(Debug, Default)]
pub struct PredicateBuilder {
    conditions: Vec<Condition>,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive, unanchored substring match. Regex metacharacters in
    /// the input are escaped so they match literally.
    pub fn substring(mut self, field: &'static str, raw: Option<&str>) -> Self {
        if let Some(needle) = raw.filter(|v| !v.is_empty()) {
            self.conditions.push(Condition::Substring {
                field,
                needle: needle.to_string(),
            });
        }
        self
    }

    /// Inclusive numeric range; either bound may be absent, both combine into
    /// one closed range. A non-numeric bound is rejected.
    pub fn range(
        mut self,
        field: &'static str,
        min_raw: Option<&str>,
        max_raw: Option<&str>,
    ) -> Result<Self, ApiError> {
        let min = parse_bound(field, min_raw)?;
        let max = parse_bound(field, max_raw)?;
        if min.is_some() || max.is_some() {
            self.conditions.push(Condition::Range { field, min, max });
        }
        Ok(self)
    }

    /// Exact equality; the value is passed through unmodified, so an invalid
    /// enumeration value simply matches nothing.
    pub fn equals(mut self, field: &'static str, raw: Option<&str>) -> Self {
        if let Some(value) = raw.filter(|v| !v.is_empty()) {
            self.conditions.push(Condition::Equals {
                field,
                value: value.to_string(),
            });
        }
        self
    }

    /// Comma-separated list over an array field. [`MatchMode::All`] requires
    /// every supplied value to be present, [`MatchMode::Any`] at least one.
    pub fn list(mut self, field: &'static str, raw: Option<&str>, mode: MatchMode) -> Self {
        let values = split_list(raw);
        if !values.is_empty() {
            self.conditions.push(match mode {
                MatchMode::All => Condition::ContainsAll { field, values },
                MatchMode::Any => Condition::ContainsAny { field, values },
            });
        }
        self
    }

    /// Assemble the conjunction of every contributed clause.
    pub fn build(self) -> Document {
        let mut predicate = Document::new();
        for condition in self.conditions {
            let (field, clause) = condition.clause();
            predicate.insert(field, clause);
        }
        predicate
    }
}

fn parse_bound(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    raw.filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| ApiError::Validation(format!("{field} bound '{v}' is not a number")))
        })
        .transpose()
}

/// Split on commas and trim each element. Empty elements are kept; an empty
/// input string yields no values at all.
fn split_list(raw: Option<&str>) -> Vec<String> {
    match raw.filter(|v| !v.is_empty()) {
        Some(raw) => raw.split(',').map(|v| v.trim().to_string()).collect(),
        None => Vec::new(),
    }
}

/// Query parameters accepted by `GET /flats/filter`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
pub struct FlatFilterQuery {
    /// Case-insensitive substring match on the flat location
    pub location: Option<String>,
    /// Inclusive lower bound on price
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    /// Inclusive upper bound on price
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    /// Comma-separated amenities the flat must all have
    pub amenities: Option<String>,
    /// Comma-separated preferences the flat must all have
    pub preferences: Option<String>,
}

impl FlatFilterQuery {
    /// Assemble the store predicate. Flat list fields always use containment
    /// ("all") semantics; there is no mode switch.
    pub fn predicate(&self) -> Result<Document, ApiError> {
        Ok(PredicateBuilder::new()
            .substring("location", self.location.as_deref())
            .range(
                "price",
                self.min_price.as_deref(),
                self.max_price.as_deref(),
            )?
            .list("amenities", self.amenities.as_deref(), MatchMode::All)
            .list("preferences", self.preferences.as_deref(), MatchMode::All)
            .build())
    }
}

/// Query parameters accepted by `GET /api/users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
pub struct UserFilterQuery {
    /// Comma-separated lifestyle tags
    pub lifestyle: Option<String>,
    /// Comma-separated preference tags
    pub preferences: Option<String>,
    /// Comma-separated locations
    pub location: Option<String>,
    /// Inclusive lower bound on budget
    #[serde(rename = "minBudget")]
    pub min_budget: Option<String>,
    /// Inclusive upper bound on budget
    #[serde(rename = "maxBudget")]
    pub max_budget: Option<String>,
    /// Exact gender match, passed through unvalidated
    pub gender: Option<String>,
    /// Case-insensitive substring match on the user name
    pub name: Option<String>,
    /// "any" (default) or "all"; applies to every multi-valued field in the request
    #[serde(rename = "matchMode")]
    pub match_mode: Option<String>,
}

impl UserFilterQuery {
    /// Assemble the store predicate. One global `matchMode` toggle governs all
    /// multi-valued fields.
    pub fn predicate(&self) -> Result<Document, ApiError> {
        let mode = MatchMode::parse(self.match_mode.as_deref());

        Ok(PredicateBuilder::new()
            .list("lifestyle", self.lifestyle.as_deref(), mode)
            .list("preferences", self.preferences.as_deref(), mode)
            .list("location", self.location.as_deref(), mode)
            .equals("gender", self.gender.as_deref())
            .substring("name", self.name.as_deref())
            .range(
                "budget",
                self.min_budget.as_deref(),
                self.max_budget.as_deref(),
            )?
            .build())
    }
}
