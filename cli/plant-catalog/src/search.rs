use crate::types::Plant;

/// Whether `plant` is shown for `search_term`.
///
/// Case-insensitive substring match on the name, an empty term matches all.
pub fn matches_search(plant: &Plant, search_term: &str) -> bool {
    plant
        .name
        .to_lowercase()
        .contains(&search_term.to_lowercase())
}

/// The subsequence of `plants` matching `search_term`, in catalog order.
pub(crate) fn filter_plants<'a>(plants: &'a [Plant], search_term: &str) -> Vec<&'a Plant> {
    plants
        .iter()
        .filter(|plant| matches_search(plant, search_term))
        .collect()
}
