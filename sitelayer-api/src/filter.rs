//! Composition of listing query parameters into a store filter.
//!
//! Every parameter is optional. Present parameters become clauses that are ANDed
//! together, except for the text search (`q`) and actor search (`acteur`) clauses,
//! which all land in one shared OR group. Spatial parameters are best effort: a
//! polygon or box that fails to parse is dropped and the request goes on without it.

use bson::Bson;
use serde::Deserialize;
use sitelayer::prelude::{Expr, Filter, PaginationParams, Position};
use sitelayer::page::DEFAULT_PAGE_SIZE;
use tracing::debug;

use crate::model::{LOCATION_FIELD, Status, Typologie};

const TEXT_FIELDS: [&str; 2] = ["name", "description"];
const ACTOR_FIELDS: [&str; 3] = ["maitrise_ouvrage", "architecte", "entreprise"];

/// Query string accepted by `GET /projects`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub q: Option<String>,
    pub status: Option<Status>,
    pub typologie: Option<Typologie>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    /// `minLon,minLat,maxLon,maxLat`
    pub bbox: Option<String>,
    /// JSON array of `[lon, lat]` pairs.
    pub polygon: Option<String>,
    pub date_debut_from: Option<String>,
    pub date_debut_to: Option<String>,
    pub acteur: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn matches_any(fields: &[&str], pattern: &str) -> Vec<Expr> {
    fields
        .iter()
        .map(|field| Filter::matches(*field, pattern))
        .collect()
}

/// Parses a JSON ring of at least three points, closing it when needed.
pub fn parse_polygon(raw: &str) -> Option<Vec<Position>> {
    let mut ring: Vec<Position> = match serde_json::from_str(raw) {
        Ok(ring) => ring,
        Err(err) => {
            debug!(%err, "ignoring malformed polygon");
            return None;
        }
    };

    if ring.len() < 3 {
        debug!(points = ring.len(), "ignoring polygon with fewer than 3 points");
        return None;
    }
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    Some(ring)
}

/// Parses `minLon,minLat,maxLon,maxLat` into the box corners.
pub fn parse_bbox(raw: &str) -> Option<(Position, Position)> {
    let bounds = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>();

    match bounds.as_deref() {
        Ok([min_lon, min_lat, max_lon, max_lat]) => {
            Some(([*min_lon, *min_lat], [*max_lon, *max_lat]))
        }
        _ => {
            debug!(bbox = raw, "ignoring malformed bbox");
            None
        }
    }
}

impl ProjectQuery {
    /// Builds the filter for this query, `None` when nothing restricts the listing.
    pub fn filter(&self) -> Option<Expr> {
        let mut clauses = Vec::new();
        let mut any_of = Vec::new();

        if let Some(q) = non_empty(&self.q) {
            any_of.extend(matches_any(&TEXT_FIELDS, q));
        }
        if let Some(status) = self.status {
            clauses.push(Filter::eq("status", status.as_str()));
        }
        if let Some(typologie) = self.typologie {
            clauses.push(Filter::eq("typologie", typologie.as_str()));
        }
        if self.min_budget.is_some() || self.max_budget.is_some() {
            clauses.push(Filter::range(
                "budget",
                self.min_budget.map(Bson::Double),
                self.max_budget.map(Bson::Double),
            ));
        }

        let date_from = non_empty(&self.date_debut_from);
        let date_to = non_empty(&self.date_debut_to);
        if date_from.is_some() || date_to.is_some() {
            clauses.push(Filter::range(
                "date_debut",
                date_from.map(Bson::from),
                date_to.map(Bson::from),
            ));
        }

        // Actor clauses share the text search group: q OR acteur, not q AND acteur.
        if let Some(acteur) = non_empty(&self.acteur) {
            any_of.extend(matches_any(&ACTOR_FIELDS, acteur));
        }
        if !any_of.is_empty() {
            clauses.push(Filter::or(any_of));
        }

        if let Some(spatial) = self.spatial() {
            clauses.push(spatial);
        }

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::and(clauses)),
        }
    }

    /// A polygon, when given, wins over the box even if it doesn't parse.
    fn spatial(&self) -> Option<Expr> {
        if let Some(polygon) = non_empty(&self.polygon) {
            return parse_polygon(polygon).map(|ring| Filter::within_polygon(LOCATION_FIELD, ring));
        }

        non_empty(&self.bbox)
            .and_then(parse_bbox)
            .map(|(min, max)| Filter::within_box(LOCATION_FIELD, min, max))
    }

    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::clamped(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE as i64),
        )
    }
}
