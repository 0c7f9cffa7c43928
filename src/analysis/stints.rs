use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

use crate::session::{Compound, Session};

/// A run of consecutive laps by one driver on the same stint and compound
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Stint {
    pub driver: String,
    pub stint_number: u32,
    pub compound: Compound,
    /// Number of laps in the stint
    pub length: u32,
    /// Laps completed by the driver before this stint started
    pub start_offset: u32,
}

impl Stint {
    /// Offset just past the last lap of the stint
    pub fn end_offset(&self) -> u32 {
        self.start_offset + self.length
    }
}

/// Tire stints per driver, placed end to end from offset 0
pub fn stints(session: &Session) -> BTreeMap<String, Vec<Stint>> {
    let mut output: BTreeMap<String, Vec<Stint>> = BTreeMap::new();

    let by_driver = session.laps().iter().into_group_map_by(|lap| lap.driver.as_str());
    for (driver, mut laps) in by_driver {
        laps.sort_by_key(|lap| lap.lap_number);

        let mut driver_stints: Vec<Stint> = Vec::new();
        for lap in laps {
            match driver_stints.last_mut() {
                Some(cur) if cur.stint_number == lap.stint && cur.compound == lap.compound => {
                    cur.length += 1;
                }
                _ => {
                    let start_offset = driver_stints.last().map_or(0, Stint::end_offset);
                    driver_stints.push(Stint {
                        driver: driver.to_string(),
                        stint_number: lap.stint,
                        compound: lap.compound,
                        length: 1,
                        start_offset,
                    });
                }
            }
        }
        output.insert(driver.to_string(), driver_stints);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_support::{lap, session};
    use crate::session::Lap;
    use proptest::prelude::*;

    #[test]
    fn test_stints_scenario() {
        let session = session(vec![
            lap("ABC", 1, Some(98.2), Compound::Soft, 1),
            lap("ABC", 2, Some(97.9), Compound::Soft, 1),
            lap("ABC", 3, Some(96.5), Compound::Medium, 2),
        ]);
        let stints = stints(&session);
        let abc = &stints["ABC"];
        assert_eq!(abc.len(), 2);
        assert_eq!(
            (abc[0].compound, abc[0].length, abc[0].start_offset),
            (Compound::Soft, 2, 0)
        );
        assert_eq!(
            (abc[1].compound, abc[1].length, abc[1].start_offset),
            (Compound::Medium, 1, 2)
        );
        assert_eq!(abc[1].stint_number, 2);
    }

    #[test]
    fn test_stints_scan_in_lap_order() {
        let session = session(vec![
            lap("XYZ", 3, Some(91.), Compound::Hard, 2),
            lap("XYZ", 1, Some(92.), Compound::Medium, 1),
            lap("ABC", 1, Some(95.), Compound::Wet, 1),
            lap("XYZ", 2, Some(93.), Compound::Medium, 1),
        ]);
        let stints = stints(&session);
        assert_eq!(stints.keys().collect::<Vec<_>>(), vec!["ABC", "XYZ"]);
        let xyz = &stints["XYZ"];
        assert_eq!(xyz.len(), 2);
        assert_eq!(xyz[0].length, 2);
        assert_eq!(xyz[1].compound, Compound::Hard);
        assert_eq!(xyz[1].start_offset, 2);
    }

    #[test]
    fn test_compound_change_within_stint_splits() {
        let session = session(vec![
            lap("ABC", 1, Some(95.), Compound::Soft, 1),
            lap("ABC", 2, Some(95.), Compound::Unknown, 1),
        ]);
        assert_eq!(stints(&session)["ABC"].len(), 2);
    }

    fn arb_driver_laps() -> impl Strategy<Value = Vec<Lap>> {
        prop::collection::vec(
            (
                1u32..4,
                prop::sample::select(vec![Compound::Soft, Compound::Medium, Compound::Hard]),
            ),
            1..60,
        )
        .prop_map(|entries| {
            let mut stint = 1;
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (step, compound))| {
                    // change stint roughly every third lap
                    if step == 3 {
                        stint += 1;
                    }
                    lap("ABC", i as u32 + 1, Some(90.), compound, stint)
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_stint_lengths_cover_all_laps(laps in arb_driver_laps()) {
            let lap_count = laps.len() as u32;
            let session = session(laps);
            let stints = stints(&session);
            let abc = &stints["ABC"];

            prop_assert_eq!(abc.iter().map(|s| s.length).sum::<u32>(), lap_count);
            prop_assert_eq!(abc[0].start_offset, 0);
            for pair in abc.windows(2) {
                prop_assert!(pair[1].start_offset > pair[0].start_offset);
                prop_assert_eq!(pair[1].start_offset, pair[0].end_offset());
                prop_assert!(pair[1].stint_number >= pair[0].stint_number);
            }
        }
    }
}
