//! Query translation from sitelayer expressions to MongoDB query syntax.
//!
//! This module translates the abstract filter tree into MongoDB BSON documents
//! for execution by the MongoDB query engine.

use bson::{Document, Bson, doc};

use sitelayer_core::{
    query::{QueryVisitor, Expr, FieldOp, GeoShape, Position},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// Compiles an optional filter into the document passed to `find` and `count_documents`.
///
/// `None` compiles to the empty document, which matches everything.
pub fn compile_filter(filter: Option<&Expr>) -> DocumentStoreResult<Document> {
    match filter {
        Some(expr) => MongoQueryTranslator.visit_expr(expr),
        None => Ok(doc! {}),
    }
}

fn position(p: &Position) -> Bson {
    Bson::Array(vec![Bson::Double(p[0]), Bson::Double(p[1])])
}

/// Translates sitelayer query expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    fn visit_all(&mut self, exprs: &[Expr]) -> DocumentStoreResult<Vec<Document>> {
        exprs
            .iter()
            .map(|expr| self.visit_expr(expr))
            .collect()
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        if exprs.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! { "$and": self.visit_all(exprs)? })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        // `$or` rejects empty arrays; an empty disjunction matches nothing.
        if exprs.is_empty() {
            return Ok(doc! { "$expr": false });
        }

        Ok(doc! { "$or": self.visit_all(exprs)? })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Matches => match value {
                    Bson::String(pattern) => doc! { "$regex": pattern, "$options": "i" },
                    _ => return Err(DocumentStoreError::InvalidQuery("Matches operator requires a string pattern".to_string())),
                },
            }
        })
    }

    fn visit_range(&mut self, field: &str, min: Option<&Bson>, max: Option<&Bson>) -> Result<Self::Output, Self::Error> {
        let mut bounds = Document::new();

        if let Some(min) = min {
            bounds.insert("$gte", min.clone());
        }
        if let Some(max) = max {
            bounds.insert("$lte", max.clone());
        }
        if bounds.is_empty() {
            bounds.insert("$exists", true);
        }

        Ok(doc! { field: bounds })
    }

    fn visit_geo_within(&mut self, field: &str, shape: &GeoShape) -> Result<Self::Output, Self::Error> {
        let shape = match shape {
            GeoShape::Box { min, max } => doc! { "$box": [position(min), position(max)] },
            GeoShape::Polygon(ring) => doc! {
                "$polygon": ring.iter().map(position).collect::<Vec<Bson>>(),
            },
        };

        Ok(doc! {
            field: { "$geoWithin": shape },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sitelayer_core::query::Filter;

    #[test]
    fn no_filter_matches_everything() {
        assert_eq!(compile_filter(None).unwrap(), doc! {});
        assert_eq!(compile_filter(Some(&Filter::and(vec![]))).unwrap(), doc! {});
    }

    #[test]
    fn equality_and_patterns() {
        assert_eq!(
            compile_filter(Some(&Filter::eq("status", "travaux"))).unwrap(),
            doc! { "status": { "$eq": "travaux" } }
        );
        assert_eq!(
            compile_filter(Some(&Filter::matches("name", "tour"))).unwrap(),
            doc! { "name": { "$regex": "tour", "$options": "i" } }
        );
    }

    #[test]
    fn ranges_only_emit_present_bounds() {
        assert_eq!(
            compile_filter(Some(&Filter::range("budget", Some(Bson::Double(100.0)), Some(Bson::Double(500.0))))).unwrap(),
            doc! { "budget": { "$gte": 100.0, "$lte": 500.0 } }
        );
        assert_eq!(
            compile_filter(Some(&Filter::range("date_debut", None, Some("2025-01-01".into())))).unwrap(),
            doc! { "date_debut": { "$lte": "2025-01-01" } }
        );
    }

    #[test]
    fn geo_shapes() {
        assert_eq!(
            compile_filter(Some(&Filter::within_box("location", [2.0, 48.0], [3.0, 49.0]))).unwrap(),
            doc! { "location": { "$geoWithin": { "$box": [[2.0, 48.0], [3.0, 49.0]] } } }
        );
        assert_eq!(
            compile_filter(Some(&Filter::within_polygon(
                "location",
                vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]],
            )))
            .unwrap(),
            doc! { "location": { "$geoWithin": { "$polygon": [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]] } } }
        );
    }

    #[test]
    fn logical_operators_nest() {
        let expr = Filter::and(vec![
            Filter::or(vec![Filter::matches("name", "a"), Filter::matches("description", "a")]),
            Filter::eq("status", "etude"),
        ]);

        assert_eq!(
            compile_filter(Some(&expr)).unwrap(),
            doc! {
                "$and": [
                    { "$or": [
                        { "name": { "$regex": "a", "$options": "i" } },
                        { "description": { "$regex": "a", "$options": "i" } },
                    ] },
                    { "status": { "$eq": "etude" } },
                ]
            }
        );
    }
}
