use crate::train::Train;

/// Filter a catalog down to trains serving source -> destination.
///
/// Pure filter over read-mostly reference data: no state mutation, no
/// locking. Matching is case-insensitive and requires the source to
/// strictly precede the destination in the train's station order.
pub fn filter_routes<'a>(
    trains: impl IntoIterator<Item = &'a Train>,
    source: &str,
    destination: &str,
) -> Vec<&'a Train> {
    trains
        .into_iter()
        .filter(|train| train.serves_route(source, destination))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SeatGrid;
    use std::collections::HashMap;

    fn train(id: &str, stations: &[&str]) -> Train {
        Train::new(
            id,
            format!("1230{}", &id[1..]),
            stations.iter().map(|s| s.to_string()).collect(),
            HashMap::new(),
            SeatGrid::new(5, 6),
        )
    }

    #[test]
    fn test_route_search_respects_travel_direction() {
        let trains = vec![
            train("T001", &["delhi", "jaipur", "ahmedabad", "mumbai"]),
            train("T002", &["bangalore", "hyderabad", "nagpur", "delhi"]),
        ];

        let hits = filter_routes(&trains, "delhi", "mumbai");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].train_id, "T001");

        // Reversed trip matches nothing
        assert!(filter_routes(&trains, "mumbai", "delhi").is_empty());

        let hits = filter_routes(&trains, "bangalore", "delhi");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].train_id, "T002");
    }

    #[test]
    fn test_unknown_station_matches_nothing() {
        let trains = vec![train("T001", &["delhi", "jaipur", "mumbai"])];
        assert!(filter_routes(&trains, "delhi", "chennai").is_empty());
        assert!(filter_routes(&trains, "pune", "mumbai").is_empty());
    }
}
