//! Pure functions applying confirmed record store responses to a catalog.
//!
//! Every function patches by id and leaves other entries untouched.
//! [crate::CatalogManager] calls these after each successful request.
//! Callers issuing requests concurrently can apply them in the order
//! responses arrive, the last response to arrive wins.

use std::collections::HashSet;

use tracing::warn;

use crate::types::{Plant, PlantId, PlantPatch};

/// Replace the whole catalog with a freshly loaded list.
///
/// Entries are normalized, repeated ids keep their first occurrence.
/// Returns the number of dropped duplicates.
pub fn replace_all(plants: &mut Vec<Plant>, loaded: Vec<Plant>) -> usize {
    let mut seen = HashSet::new();
    let mut dropped = 0;

    plants.clear();
    for plant in loaded {
        if !seen.insert(plant.id.clone()) {
            warn!(id = %plant.id, "dropping plant with duplicate id");
            dropped += 1;
            continue;
        }
        plants.push(plant.normalized());
    }

    dropped
}

/// Add a created record.
///
/// A record whose id is already present replaces that entry in place.
pub fn append_created(plants: &mut Vec<Plant>, created: Plant) -> &Plant {
    let created = created.normalized();
    let existing = plants.iter().position(|plant| plant.id == created.id);

    match existing {
        Some(index) => {
            warn!(id = %created.id, "created plant already in catalog, replacing it");
            plants[index] = created;
            &plants[index]
        },
        None => {
            plants.push(created);
            &plants[plants.len() - 1]
        },
    }
}

/// Merge the fields returned by an update into the entry with `id`.
///
/// Returns `None` if the entry is no longer in the catalog.
pub fn merge_updated<'a>(
    plants: &'a mut [Plant],
    id: &PlantId,
    returned: PlantPatch,
) -> Option<&'a Plant> {
    let plant = plants.iter_mut().find(|plant| &plant.id == id)?;
    plant.merge(returned);
    Some(&*plant)
}

/// Mark the entry with `id` as sold.
///
/// A `sold` value sent back by the store is authoritative,
/// without one the entry is assumed sold.
pub fn apply_sold<'a>(
    plants: &'a mut [Plant],
    id: &PlantId,
    mut returned: PlantPatch,
) -> Option<&'a Plant> {
    returned.sold = Some(returned.sold.unwrap_or(true));
    merge_updated(plants, id, returned)
}

/// Remove the entry with `id`, if present.
pub fn remove(plants: &mut Vec<Plant>, id: &PlantId) -> Option<Plant> {
    let index = plants.iter().position(|plant| &plant.id == id)?;
    Some(plants.remove(index))
}
