//! Combines the two per-poll record sets into one snapshot.

use crate::flight::{FlightRecord, Snapshot};

/// Structural set union of `primary` and `secondary`.
///
/// Records of `primary` come first, followed by records of `secondary` that
/// are not structurally equal to one already present. Cross-source duplicates
/// differing in any field both survive; the differ matches the first one,
/// which is the `primary` record.
pub fn merge_snapshots(primary: Vec<FlightRecord>, secondary: Vec<FlightRecord>) -> Snapshot {
    let mut merged: Snapshot = Vec::with_capacity(primary.len() + secondary.len());

    for record in primary.into_iter().chain(secondary) {
        if !merged.contains(&record) {
            merged.push(record);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Airport;

    fn departure(number: &str, estimated: &str) -> FlightRecord {
        FlightRecord::departure(
            number,
            "Luxair",
            Airport::new(Some("BCN"), "Barcelona"),
            "14:00",
            estimated,
        )
    }

    #[test]
    fn test_identical_records_collapse() {
        let merged = merge_snapshots(
            vec![departure("LG2301", "14:00")],
            vec![departure("LG2301", "14:00")],
        );

        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_differing_duplicates_both_survive_primary_first() {
        let merged = merge_snapshots(
            vec![departure("LG2301", "14:00")],
            vec![departure("LG2301", "14:20")],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].estimated_time(), "14:00");
        assert_eq!(merged[1].estimated_time(), "14:20");
    }

    #[test]
    fn test_duplicates_within_one_source_collapse() {
        let merged = merge_snapshots(
            vec![departure("LG1", "14:00"), departure("LG1", "14:00")],
            vec![],
        );

        assert_eq!(merged, vec![departure("LG1", "14:00")]);
    }
}
