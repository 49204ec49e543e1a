//! Plant records and the drafts used to create or edit them.

use std::convert::Infallible;
use std::str::FromStr;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

use crate::error::ValidationError;

/// Image shown for plants created without an image URL.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Identifier assigned by the record store.
///
/// Generic JSON record stores hand out either numeric or string ids,
/// both are kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlantId {
    #[display("{_0}")]
    Number(u64),
    #[display("{_0}")]
    Text(String),
}

impl FromStr for PlantId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PlantId::from(s))
    }
}

impl From<&str> for PlantId {
    fn from(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(n) => PlantId::Number(n),
            Err(_) => PlantId::Text(value.to_string()),
        }
    }
}

/// A plant as stored by the record store.
///
/// Prices written by older clients may have been stored as strings,
/// so numeric strings are accepted when reading.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub price: f64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub image: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub sold: bool,
}

impl Plant {
    /// Fill in defaults the record store may have left out.
    pub fn normalized(mut self) -> Self {
        if self.image.trim().is_empty() {
            self.image = PLACEHOLDER_IMAGE_URL.to_string();
        }
        self
    }

    /// Overwrite the fields present in `patch`, keeping everything else.
    pub fn merge(&mut self, patch: PlantPatch) {
        let PlantPatch {
            name,
            price,
            image,
            sold,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if let Some(sold) = sold {
            self.sold = sold;
        }
        if self.image.trim().is_empty() {
            self.image = PLACEHOLDER_IMAGE_URL.to_string();
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub price: f64,
    pub image: String,
}

/// A partial plant, used both as a PATCH body and to read PATCH responses.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold: Option<bool>,
}

impl PlantPatch {
    pub fn sold() -> Self {
        PlantPatch {
            sold: Some(true),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// Form state for a plant that has not been created yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPlantDraft {
    pub name: String,
    pub price: String,
    pub image: String,
}

impl NewPlantDraft {
    /// Check the draft and turn it into a create request body.
    pub fn validate(&self) -> Result<NewPlant, ValidationError> {
        let name = require_name(&self.name)?;
        let price = parse_price(&self.price)?;
        let image = match self.image.trim() {
            "" => PLACEHOLDER_IMAGE_URL.to_string(),
            image => image.to_string(),
        };

        Ok(NewPlant { name, price, image })
    }
}

/// Form state of the plant currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingPlant {
    pub id: PlantId,
    pub name: String,
    pub price: String,
}

/// Edit form state, [EditDraft::Idle] while no edit is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditDraft {
    #[default]
    Idle,
    Editing(EditingPlant),
}

impl EditDraft {
    /// Start editing `plant` with its current name and price.
    pub fn from_plant(plant: &Plant) -> Self {
        EditDraft::Editing(EditingPlant {
            id: plant.id.clone(),
            name: plant.name.clone(),
            price: plant.price.to_string(),
        })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditDraft::Idle)
    }

    /// Check the draft and turn it into the target id and a PATCH body.
    pub fn validate(&self) -> Result<(PlantId, PlantPatch), ValidationError> {
        let EditDraft::Editing(editing) = self else {
            return Err(ValidationError::NoEditInProgress);
        };

        let patch = PlantPatch {
            name: Some(require_name(&editing.name)?),
            price: Some(parse_price(&editing.price)?),
            ..Default::default()
        };

        Ok((editing.id.clone(), patch))
    }
}

fn require_name(name: &str) -> Result<String, ValidationError> {
    match name.trim() {
        "" => Err(ValidationError::MissingName),
        name => Ok(name.to_string()),
    }
}

fn parse_price(price: &str) -> Result<f64, ValidationError> {
    let price = price.trim();
    if price.is_empty() {
        return Err(ValidationError::MissingPrice);
    }

    let parsed = price
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidPrice(price.to_string()))?;

    if !parsed.is_finite() {
        return Err(ValidationError::InvalidPrice(price.to_string()));
    }
    if parsed < 0.0 {
        return Err(ValidationError::NegativePrice);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plant_id_keeps_numeric_and_text_ids() {
        let ids: Vec<PlantId> = serde_json::from_value(json!([1, "a1b2"])).unwrap();
        assert_eq!(ids, vec![PlantId::Number(1), PlantId::Text("a1b2".into())]);
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([1, "a1b2"]));
        assert_eq!(ids[0].to_string(), "1");
        assert_eq!(ids[1].to_string(), "a1b2");
    }

    #[test]
    fn plant_id_parses_cli_text() {
        assert_eq!(PlantId::from("12"), PlantId::Number(12));
        assert_eq!(PlantId::from("x7"), PlantId::Text("x7".into()));
    }

    #[test]
    fn plant_defaults_missing_fields() {
        let plant: Plant = serde_json::from_value(json!({
            "id": 1,
            "name": "Aloe",
            "price": 15.99,
        }))
        .unwrap();
        let plant = plant.normalized();

        assert_eq!(plant.image, PLACEHOLDER_IMAGE_URL);
        assert!(!plant.sold);
    }

    #[test]
    fn plant_null_image_gets_placeholder() {
        let plant: Plant = serde_json::from_value(json!({
            "id": "a1b2",
            "name": "Pothos",
            "price": 12.11,
            "image": null,
        }))
        .unwrap();

        assert_eq!(plant.normalized().image, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn plant_null_sold_is_unsold() {
        let plant: Plant = serde_json::from_value(json!({
            "id": 3,
            "name": "Pilea peperomioides",
            "price": 5.99,
            "sold": null,
        }))
        .unwrap();

        assert!(!plant.sold);
    }

    #[test]
    fn plant_accepts_price_stored_as_string() {
        let plant: Plant = serde_json::from_value(json!({
            "id": 8,
            "name": "Jade",
            "price": "10.37",
            "image": "./images/jade.jpg",
        }))
        .unwrap();

        assert_eq!(plant.price, 10.37);
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        assert_eq!(serde_json::to_value(PlantPatch::sold()).unwrap(), json!({
            "sold": true
        }));
    }

    #[test]
    fn patch_reads_full_record() {
        let patch: PlantPatch = serde_json::from_value(json!({
            "id": 1,
            "name": "Aloe",
            "price": 16.5,
            "image": "./images/aloe.jpg",
        }))
        .unwrap();

        assert_eq!(patch, PlantPatch {
            name: Some("Aloe".into()),
            price: Some(16.5),
            image: Some("./images/aloe.jpg".into()),
            sold: None,
        });
    }

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let mut plant = Plant {
            id: PlantId::Number(1),
            name: "Aloe".into(),
            price: 15.99,
            image: "./images/aloe.jpg".into(),
            sold: true,
        };

        plant.merge(PlantPatch {
            price: Some(20.0),
            ..Default::default()
        });

        assert_eq!(plant.name, "Aloe");
        assert_eq!(plant.price, 20.0);
        assert_eq!(plant.image, "./images/aloe.jpg");
        assert!(plant.sold);
    }

    #[test]
    fn new_draft_defaults_image() {
        let draft = NewPlantDraft {
            name: "Jade".into(),
            price: "10.37".into(),
            image: "".into(),
        };

        assert_eq!(draft.validate().unwrap(), NewPlant {
            name: "Jade".into(),
            price: 10.37,
            image: PLACEHOLDER_IMAGE_URL.into(),
        });
    }

    #[test]
    fn new_draft_rejects_invalid_fields() {
        let draft = |name: &str, price: &str| NewPlantDraft {
            name: name.into(),
            price: price.into(),
            image: String::new(),
        };

        assert!(matches!(
            draft("", "1").validate(),
            Err(ValidationError::MissingName)
        ));
        assert!(matches!(
            draft("  ", "1").validate(),
            Err(ValidationError::MissingName)
        ));
        assert!(matches!(
            draft("Jade", "").validate(),
            Err(ValidationError::MissingPrice)
        ));
        assert!(matches!(
            draft("Jade", "cheap").validate(),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            draft("Jade", "NaN").validate(),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            draft("Jade", "-1").validate(),
            Err(ValidationError::NegativePrice)
        ));
    }

    #[test]
    fn idle_edit_draft_does_not_validate() {
        assert!(matches!(
            EditDraft::Idle.validate(),
            Err(ValidationError::NoEditInProgress)
        ));
    }

    #[test]
    fn edit_draft_seeded_from_plant() {
        let plant = Plant {
            id: PlantId::Number(4),
            name: "Pothos".into(),
            price: 12.11,
            image: "./images/pothos.jpg".into(),
            sold: false,
        };

        let (id, patch) = EditDraft::from_plant(&plant).validate().unwrap();
        assert_eq!(id, PlantId::Number(4));
        assert_eq!(patch.name.as_deref(), Some("Pothos"));
        assert_eq!(patch.price, Some(12.11));
        assert_eq!(patch.image, None);
        assert_eq!(patch.sold, None);
    }
}
