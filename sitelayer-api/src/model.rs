//! Project schema accepted by the API

use serde::{Deserialize, Serialize};
use sitelayer::prelude::Document;

use crate::error::{AppError, FieldError};

/// Collection holding project documents.
pub const PROJECT_COLLECTION: &str = "project";
/// Field holding the GeoJSON point of a project.
pub const LOCATION_FIELD: &str = "location";

/// Where a project stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "prospection")]
    Prospecting,
    #[serde(rename = "etude")]
    Studying,
    #[serde(rename = "travaux")]
    UnderConstruction,
    #[serde(rename = "livre")]
    Delivered,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Prospecting => "prospection",
            Status::Studying => "etude",
            Status::UnderConstruction => "travaux",
            Status::Delivered => "livre",
        }
    }
}

/// What kind of building or work a project delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Typologie {
    #[serde(rename = "logement")]
    Housing,
    #[serde(rename = "tertiaire")]
    Commercial,
    #[serde(rename = "equipement")]
    PublicFacility,
    #[serde(rename = "infrastructure")]
    Infrastructure,
}

impl Typologie {
    pub fn as_str(&self) -> &'static str {
        match self {
            Typologie::Housing => "logement",
            Typologie::Commercial => "tertiaire",
            Typologie::PublicFacility => "equipement",
            Typologie::Infrastructure => "infrastructure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointType {
    Point,
}

/// GeoJSON point, `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: PointType,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: PointType::Point,
            coordinates: [longitude, latitude],
        }
    }
}

/// A construction or urban-planning project.
///
/// Optional fields are stored as explicit nulls so every document has the same shape.
/// Unknown fields in the request body are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub status: Status,
    pub typologie: Typologie,
    pub budget: f64,
    pub description: Option<String>,
    pub location: GeoPoint,
    pub maitrise_ouvrage: Option<String>,
    pub architecte: Option<String>,
    pub entreprise: Option<String>,
    pub date_debut: Option<String>,
    pub date_livraison: Option<String>,
}

impl Project {
    /// Checks the constraints the JSON schema alone can't express.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();

        if self.budget < 0.0 {
            errors.push(FieldError::new("budget", "must be greater than or equal to 0"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

impl Document for Project {
    fn collection_name() -> &'static str {
        PROJECT_COLLECTION
    }
}
