//! Place rankings
//!
//! Counts, for every place, how many distinct checklists reference it and
//! returns the top places per category. Only `itemId` is compared against the
//! place id; `itemType` plays no part in the match.

use crate::models::{Checklist, Place, PlaceCategory, PlaceRanking, Rankings};
use std::collections::{HashMap, HashSet};

/// Maximum entries per category
pub const RANKING_LIMIT: usize = 10;

/// Build the rankings from every place and every checklist.
///
/// Places keep their input order among equal counts.
pub fn compute_rankings(places: &[Place], checklists: &[Checklist]) -> Rankings {
    let counts = checklist_counts(checklists);

    let mut attractions = Vec::new();
    let mut restaurants = Vec::new();

    for place in places {
        let entry = PlaceRanking {
            name: place.name.clone(),
            user_count: counts.get(place.id.as_str()).copied().unwrap_or(0),
        };
        match place.category {
            PlaceCategory::Attraction => attractions.push(entry),
            PlaceCategory::Restaurant => restaurants.push(entry),
        }
    }

    Rankings {
        attractions: top(attractions),
        restaurants: top(restaurants),
    }
}

/// itemId -> number of checklists holding at least one item with that id
fn checklist_counts(checklists: &[Checklist]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for checklist in checklists {
        let ids: HashSet<&str> = checklist.items.iter().map(|i| i.item_id.as_str()).collect();
        for id in ids {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

fn top(mut entries: Vec<PlaceRanking>) -> Vec<PlaceRanking> {
    // sort_by is stable
    entries.sort_by(|a, b| b.user_count.cmp(&a.user_count));
    entries.truncate(RANKING_LIMIT);
    entries
}


#[cfg(test)]
mod property_tests {
    use super::tests::{checklist, place};
    use super::*;
    use proptest::prelude::*;

    fn category() -> impl Strategy<Value = PlaceCategory> {
        prop_oneof![Just(PlaceCategory::Attraction), Just(PlaceCategory::Restaurant)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Lists are bounded, sorted descending, and each count matches a direct scan
        #[test]
        fn rankings_bounded_and_sorted(
            place_defs in prop::collection::vec(category(), 0..25),
            refs in prop::collection::vec(prop::collection::vec(0usize..25, 0..6), 0..12),
        ) {
            let places: Vec<Place> = place_defs
                .iter()
                .enumerate()
                .map(|(i, c)| place(&format!("p{}", i), &format!("P{}", i), *c))
                .collect();
            let checklists: Vec<Checklist> = refs
                .iter()
                .enumerate()
                .map(|(u, ids)| {
                    let items: Vec<(String, &str)> =
                        ids.iter().map(|i| (format!("p{}", i), "attraction")).collect();
                    let borrowed: Vec<(&str, &str)> =
                        items.iter().map(|(id, ty)| (id.as_str(), *ty)).collect();
                    checklist(&format!("u{}", u), &borrowed)
                })
                .collect();

            let rankings = compute_rankings(&places, &checklists);

            for list in [&rankings.attractions, &rankings.restaurants] {
                prop_assert!(list.len() <= RANKING_LIMIT);
                prop_assert!(list.windows(2).all(|w| w[0].user_count >= w[1].user_count));

                for entry in list.iter() {
                    let place = places.iter().find(|p| p.name == entry.name).unwrap();
                    let expected = checklists
                        .iter()
                        .filter(|c| c.items.iter().any(|i| i.item_id == place.id))
                        .count();
                    prop_assert_eq!(entry.user_count, expected);
                }
            }
        }
    }
}
