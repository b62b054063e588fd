//! Query expression evaluation for in-memory document filtering.
//!
//! This module evaluates filter expressions against BSON documents with the same
//! semantics MongoDB applies to the compiled form: numbers compare across integer and
//! float types, comparisons between different types never match, patterns are
//! case-insensitive regular expressions, and geo containment includes the boundary.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, datetime::DateTime};
use regex::{Regex, RegexBuilder};

use sitelayer_core::{
    query::{QueryVisitor, Expr, FieldOp, GeoShape, Position, Sort, SortDirection},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Collinearity tolerance used when testing whether a point sits on a polygon edge.
const EDGE_EPSILON: f64 = 1e-12;

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Resolves a possibly dotted field path (`location.type`) inside a document.
pub(crate) fn lookup<'a>(document: &'a bson::Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;

    for part in parts {
        current = current.as_document()?.get(part)?;
    }

    Some(current)
}

/// Orders two documents by a multi-key sort specification. Incomparable values tie.
pub(crate) fn compare_documents(a: &bson::Document, b: &bson::Document, sort: &[Sort]) -> Ordering {
    for key in sort {
        let left = lookup(a, &key.field).map(Comparable::from).unwrap_or(Comparable::Null);
        let right = lookup(b, &key.field).map(Comparable::from).unwrap_or(Comparable::Null);

        let ordering = match key.direction {
            SortDirection::Asc => left.partial_cmp(&right),
            SortDirection::Desc => right.partial_cmp(&left),
        }
        .unwrap_or(Ordering::Equal);

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Extracts `[lon, lat]` from a GeoJSON point or a legacy coordinate pair.
fn position_of(value: &Bson) -> Option<Position> {
    let coordinates = match value {
        Bson::Document(doc) => doc.get_array("coordinates").ok()?,
        Bson::Array(arr) => arr,
        _ => return None,
    };

    match coordinates.as_slice() {
        [lon, lat] => Some([number(lon)?, number(lat)?]),
        _ => None,
    }
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

fn within_box(point: Position, min: Position, max: Position) -> bool {
    (min[0]..=max[0]).contains(&point[0]) && (min[1]..=max[1]).contains(&point[1])
}

fn on_segment(point: Position, a: Position, b: Position) -> bool {
    let cross = (b[0] - a[0]) * (point[1] - a[1]) - (b[1] - a[1]) * (point[0] - a[0]);

    cross.abs() <= EDGE_EPSILON
        && point[0] >= a[0].min(b[0])
        && point[0] <= a[0].max(b[0])
        && point[1] >= a[1].min(b[1])
        && point[1] <= a[1].max(b[1])
}

/// Even-odd ray casting; points on an edge count as inside.
fn within_polygon(point: Position, ring: &[Position]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);

        if on_segment(point, a, b) {
            return true;
        }

        if (a[1] > point[1]) != (b[1] > point[1])
            && point[0] < (b[0] - a[0]) * (point[1] - a[1]) / (b[1] - a[1]) + a[0]
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// Compiled patterns shared across the documents of one query.
pub(crate) type PatternCache = HashMap<String, Regex>;

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a bson::Document,
    patterns: &'a mut PatternCache,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a bson::Document, patterns: &'a mut PatternCache) -> Self {
        Self { document, patterns }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Returns clones of the documents matching `expr`, in iteration order.
    ///
    /// # Errors
    ///
    /// Fails with [`DocumentStoreError::InvalidQuery`] if a pattern doesn't compile.
    pub fn filter_documents<'d>(
        documents: impl IntoIterator<Item = &'d bson::Document>,
        expr: &Expr,
    ) -> DocumentStoreResult<Vec<bson::Document>> {
        let mut patterns = PatternCache::new();
        let mut matched = Vec::new();

        for doc in documents {
            if DocumentEvaluator::new(doc, &mut patterns).evaluate(expr)? {
                matched.push(doc.clone());
            }
        }

        Ok(matched)
    }

    fn pattern(&mut self, pattern: &str) -> DocumentStoreResult<&Regex> {
        if !self.patterns.contains_key(pattern) {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| DocumentStoreError::InvalidQuery(format!("invalid pattern {pattern:?}: {e}")))?;
            self.patterns.insert(pattern.to_string(), regex);
        }

        self.patterns
            .get(pattern)
            .ok_or_else(|| DocumentStoreError::InvalidQuery(format!("pattern {pattern:?} not compiled")))
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let document = self.document;
        let Some(field_value) = lookup(document, field) else {
            return Ok(false);
        };

        match op {
            FieldOp::Eq => Ok(Comparable::from(field_value) == Comparable::from(value)),
            FieldOp::Matches => {
                let Bson::String(pattern) = value else {
                    return Err(DocumentStoreError::InvalidQuery(
                        "Matches operator requires a string pattern".to_string(),
                    ));
                };
                match field_value {
                    Bson::String(text) => Ok(self.pattern(pattern)?.is_match(text)),
                    _ => Ok(false),
                }
            },
        }
    }

    fn visit_range(&mut self, field: &str, min: Option<&Bson>, max: Option<&Bson>) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = lookup(self.document, field) else {
            return Ok(false);
        };
        let current = Comparable::from(field_value);

        let above_min = match min {
            Some(min) => matches!(
                current.partial_cmp(&Comparable::from(min)),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            None => true,
        };
        let below_max = match max {
            Some(max) => matches!(
                current.partial_cmp(&Comparable::from(max)),
                Some(Ordering::Less | Ordering::Equal)
            ),
            None => true,
        };

        Ok(above_min && below_max)
    }

    fn visit_geo_within(&mut self, field: &str, shape: &GeoShape) -> Result<Self::Output, Self::Error> {
        let Some(point) = lookup(self.document, field).and_then(position_of) else {
            return Ok(false);
        };

        Ok(match shape {
            GeoShape::Box { min, max } => within_box(point, *min, *max),
            GeoShape::Polygon(ring) => within_polygon(point, ring),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;
    use sitelayer_core::query::Filter;

    fn site(name: &str, budget: f64, lon: f64, lat: f64) -> bson::Document {
        doc! {
            "name": name,
            "budget": budget,
            "date_debut": "2024-03-01",
            "location": { "type": "Point", "coordinates": [lon, lat] },
        }
    }

    fn eval(document: &bson::Document, expr: &Expr) -> bool {
        let mut patterns = PatternCache::new();
        DocumentEvaluator::new(document, &mut patterns).evaluate(expr).unwrap()
    }

    #[test]
    fn numbers_compare_across_integer_and_float() {
        let document = doc! { "budget": 250 };

        assert!(eval(&document, &Filter::eq("budget", 250.0)));
        assert!(eval(&document, &Filter::range("budget", Some(Bson::Double(100.0)), Some(Bson::Double(500.0)))));
        assert!(!eval(&document, &Filter::range("budget", Some(Bson::Double(251.0)), None)));
    }

    #[test]
    fn range_bounds_are_inclusive_and_optional() {
        let document = site("a", 100.0, 0.0, 0.0);

        assert!(eval(&document, &Filter::range("budget", Some(Bson::Double(100.0)), None)));
        assert!(eval(&document, &Filter::range("budget", None, Some(Bson::Double(100.0)))));
        assert!(!eval(&document, &Filter::range("budget", None, Some(Bson::Double(99.9)))));
    }

    #[test]
    fn string_ranges_compare_lexicographically() {
        let document = site("a", 1.0, 0.0, 0.0);

        assert!(eval(&document, &Filter::range("date_debut", Some("2024-01-01".into()), Some("2024-12-31".into()))));
        assert!(!eval(&document, &Filter::range("date_debut", Some("2024-03-02".into()), None)));
    }

    #[test]
    fn range_never_matches_other_types_or_missing_fields() {
        let document = doc! { "budget": "cheap", "date_debut": Bson::Null };

        assert!(!eval(&document, &Filter::range("budget", Some(Bson::Double(0.0)), None)));
        assert!(!eval(&document, &Filter::range("date_debut", Some("2000".into()), None)));
        assert!(!eval(&document, &Filter::range("missing", None, None)));
    }

    #[test]
    fn patterns_match_case_insensitive_substrings() {
        let document = site("Grande TOUR Sud", 1.0, 0.0, 0.0);

        assert!(eval(&document, &Filter::matches("name", "tour")));
        assert!(eval(&document, &Filter::matches("name", "^grande")));
        assert!(!eval(&document, &Filter::matches("name", "^tour")));
        assert!(!eval(&document, &Filter::matches("description", "tour")));
    }

    #[test]
    fn invalid_patterns_are_query_errors() {
        let document = site("a", 1.0, 0.0, 0.0);
        let mut patterns = PatternCache::new();

        let result = DocumentEvaluator::new(&document, &mut patterns).evaluate(&Filter::matches("name", "("));

        assert!(matches!(result, Err(DocumentStoreError::InvalidQuery(_))));
    }

    #[test]
    fn box_containment_includes_edges() {
        let inside = site("in", 1.0, 2.35, 48.85);
        let edge = site("edge", 1.0, 2.0, 48.85);
        let outside = site("out", 1.0, 5.37, 43.29);
        let expr = Filter::within_box("location", [2.0, 48.0], [3.0, 49.0]);

        assert!(eval(&inside, &expr));
        assert!(eval(&edge, &expr));
        assert!(!eval(&outside, &expr));
    }

    #[test]
    fn polygon_containment_uses_ray_casting() {
        // L-shaped ring; (1.5, 1.5) sits in the notch.
        let ring = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0], [1.0, 2.0], [0.0, 2.0], [0.0, 0.0]];
        let expr = Filter::within_polygon("location", ring);

        assert!(eval(&site("a", 1.0, 0.5, 1.5), &expr));
        assert!(eval(&site("b", 1.0, 1.5, 0.5), &expr));
        assert!(!eval(&site("c", 1.0, 1.5, 1.5), &expr));
        assert!(eval(&site("d", 1.0, 1.0, 1.5), &expr));
    }

    #[test]
    fn geo_predicates_skip_documents_without_points() {
        let document = doc! { "location": { "type": "Point", "coordinates": ["x", "y"] } };

        assert!(!eval(&document, &Filter::within_box("location", [-180.0, -90.0], [180.0, 90.0])));
        assert!(!eval(&doc! {}, &Filter::within_box("location", [-180.0, -90.0], [180.0, 90.0])));
    }

    #[test]
    fn lookup_follows_dotted_paths() {
        let document = site("a", 1.0, 2.0, 3.0);

        assert_eq!(lookup(&document, "location.type"), Some(&Bson::String("Point".into())));
        assert_eq!(lookup(&document, "location.missing"), None);
    }

    #[test]
    fn filter_documents_keeps_iteration_order() {
        let documents = vec![site("b", 300.0, 0.0, 0.0), site("a", 50.0, 0.0, 0.0), site("c", 400.0, 0.0, 0.0)];

        let matched = DocumentEvaluator::filter_documents(
            &documents,
            &Filter::range("budget", Some(Bson::Double(100.0)), None),
        )
        .unwrap();

        let names: Vec<_> = matched.iter().map(|d| d.get_str("name").unwrap()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}
