//! Query construction and filtering API for document stores.
//!
//! This module provides a tagged filter expression tree, sorting and pagination options,
//! and a visitor trait that lets each backend compile or evaluate the same tree.
//!
//! # Query Building
//!
//! ```ignore
//! use sitelayer_core::query::{Query, Filter, SortDirection};
//!
//! let query = Query::builder()
//!     .maybe_filter(Some(Filter::eq("status", "travaux")))
//!     .limit(10)
//!     .offset(0)
//!     .sort("budget", SortDirection::Desc)
//!     .build();
//! ```
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides static constructors for expressions:
//!
//! - Equality: `eq`
//! - Ranges: `range` (inclusive, either bound optional)
//! - Pattern: `matches` (case-insensitive regular expression)
//! - Geospatial: `within_box`, `within_polygon`
//! - Logical: `and`, `or`

use bson::Bson;

use crate::error::DocumentStoreError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for one field of the query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Case-insensitive regular expression match. The value is the pattern, used verbatim.
    Matches,
}

/// A `[longitude, latitude]` pair.
pub type Position = [f64; 2];

/// Shapes usable in a geo-within predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoShape {
    /// Axis-aligned box given by its lower-left and upper-right corners.
    Box { min: Position, max: Position },
    /// Polygon ring. Callers pass a closed ring (first point repeated last).
    Polygon(Vec<Position>),
}

/// A filter expression for querying documents.
///
/// # Example
///
/// ```ignore
/// use sitelayer_core::query::Filter;
///
/// let expr = Filter::and(vec![
///     Filter::eq("status", "travaux"),
///     Filter::range("budget", Some(100.0.into()), None),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Inclusive range on one field. A missing bound leaves that side open.
    Range {
        field: String,
        min: Option<Bson>,
        max: Option<Bson>,
    },
    /// The point stored in `field` lies inside `shape` (boundary included).
    GeoWithin {
        field: String,
        shape: GeoShape,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }
}

/// A structured query for retrieving and filtering documents.
///
/// Use [`QueryBuilder`] for ergonomic construction.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter expression to match documents.
    pub filter: Option<Expr>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Number of documents to skip (for pagination).
    pub offset: Option<usize>,
    /// Ordering, most significant field first. Empty means store order.
    pub sort: Vec<Sort>,
}

impl Query {
    /// Creates a new empty query with no filters or limits.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper struct for constructing filter expressions.
///
/// All methods accept field names as `Into<String>` and values as `Into<Bson>`.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the specified value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Creates an inclusive range filter. Pass `None` to leave a side open.
    pub fn range(field: impl Into<String>, min: Option<Bson>, max: Option<Bson>) -> Expr {
        Expr::Range { field: field.into(), min, max }
    }

    /// Creates a case-insensitive pattern match.
    ///
    /// The pattern is a regular expression and is not escaped, so `"tow.r"` also matches "tower".
    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Expr {
        Expr::field(field.into(), FieldOp::Matches, Bson::String(pattern.into()))
    }

    /// Matches documents whose point lies within the given box.
    pub fn within_box(field: impl Into<String>, min: Position, max: Position) -> Expr {
        Expr::GeoWithin { field: field.into(), shape: GeoShape::Box { min, max } }
    }

    /// Matches documents whose point lies within the given polygon ring.
    pub fn within_polygon(field: impl Into<String>, ring: Vec<Position>) -> Expr {
        Expr::GeoWithin { field: field.into(), shape: GeoShape::Polygon(ring) }
    }

    /// Combines multiple expressions such that all must match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Combines multiple expressions such that any can match.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets or clears the filter expression.
    pub fn maybe_filter(mut self, filter: Option<Expr>) -> Self {
        self.query.filter = filter;
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Sets the number of documents to skip (for pagination).
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = Some(offset);
        self
    }

    /// Appends a sort key. Keys added first take precedence.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort.push(Sort::new(field, direction));
        self
    }

    /// Replaces the whole sort specification.
    pub fn sort_by(mut self, sort: Vec<Sort>) -> Self {
        self.query.sort = sort;
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks an [`Expr`] tree. Backends implement this to compile or evaluate filters.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_range(
        &mut self,
        field: &str,
        min: Option<&Bson>,
        max: Option<&Bson>,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_geo_within(
        &mut self,
        field: &str,
        shape: &GeoShape,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
            Expr::Range { field, min, max } => self.visit_range(field, min.as_ref(), max.as_ref()),
            Expr::GeoWithin { field, shape } => self.visit_geo_within(field, shape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_accumulates_sort_keys_in_order() {
        let query = Query::builder()
            .sort("status", SortDirection::Asc)
            .sort("budget", SortDirection::Desc)
            .limit(5)
            .offset(10)
            .build();

        assert_eq!(
            query.sort,
            vec![
                Sort::new("status", SortDirection::Asc),
                Sort::new("budget", SortDirection::Desc),
            ]
        );
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.offset, Some(10));
        assert!(query.filter.is_none());
    }
}
