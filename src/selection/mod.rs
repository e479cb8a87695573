//! Decides which pass the map follows.
//!
//! The prediction service hands out no stable pass identifier, so a pass is
//! identified by its rise and set instants ([`PassId`]). Two passes with the
//! same rise and set are the same pass as far as selection and redraw go.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::Pass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PassId {
    pub rise: DateTime<Utc>,
    pub set: DateTime<Utc>,
}

/// The pass in progress at `now`, or else the soonest future one.
pub fn pick_active_or_next(passes: &[Pass], now: DateTime<Utc>) -> Option<Pass> {
    let mut ordered: Vec<&Pass> = passes.iter().collect();
    // stable: equal rise times keep service order
    ordered.sort_by_key(|p| p.rise_utc);
    ordered.into_iter().find(|p| p.set_utc > now).cloned()
}

/// Apply a freshly fetched pass list to the current selection.
///
/// With `force_reset` the previous selection is dropped outright. Otherwise a
/// selection that has not ended yet keeps its identity and only picks up new
/// field values from its structural match; an ended or absent selection is
/// replaced by the active-or-next pass.
pub fn reconcile(
    new_passes: &[Pass],
    current: Option<&Pass>,
    now: DateTime<Utc>,
    force_reset: bool,
) -> Option<Pass> {
    if force_reset {
        return pick_active_or_next(new_passes, now);
    }

    match current {
        Some(selected) if selected.set_utc > now => {
            let id = selected.id();
            let refreshed = new_passes.iter().find(|p| p.id() == id);
            Some(refreshed.unwrap_or(selected).clone())
        }
        _ => pick_active_or_next(new_passes, now),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use rstest::rstest;

    pub(crate) fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    pub(crate) fn pass(rise: DateTime<Utc>, set: DateTime<Utc>, max_el: f64) -> Pass {
        let local = FixedOffset::west_opt(3 * 3600).unwrap();
        let culmination = rise + (set - rise) / 2;
        Pass {
            rise_utc: rise,
            rise_local: rise.with_timezone(&local),
            culmination_utc: culmination,
            culmination_local: culmination.with_timezone(&local),
            set_utc: set,
            set_local: set.with_timezone(&local),
            max_elevation_deg: max_el,
            rise_estimated: false,
        }
    }

    fn two_passes() -> Vec<Pass> {
        vec![
            pass(at(10, 0), at(10, 8), 42.0),
            pass(at(11, 30), at(11, 40), 17.5),
        ]
    }

    #[rstest]
    #[case::in_progress(at(10, 5), Some(at(10, 0)))]
    #[case::first_ended(at(10, 9), Some(at(11, 30)))]
    #[case::set_instant_is_not_after(at(10, 8), Some(at(11, 30)))]
    #[case::before_everything(at(9, 0), Some(at(10, 0)))]
    #[case::all_ended(at(12, 0), None)]
    fn picks_active_or_next(#[case] now: DateTime<Utc>, #[case] rise: Option<DateTime<Utc>>) {
        let picked = pick_active_or_next(&two_passes(), now);
        assert_eq!(picked.map(|p| p.rise_utc), rise);
    }

    #[test]
    fn pick_does_not_trust_input_order() {
        let mut passes = two_passes();
        passes.reverse();
        let picked = pick_active_or_next(&passes, at(9, 0)).unwrap();
        assert_eq!(picked.rise_utc, at(10, 0));
    }

    #[test]
    fn pick_on_empty_list() {
        assert_eq!(pick_active_or_next(&[], at(10, 0)), None);
    }

    #[test]
    fn force_reset_discards_unfinished_selection() {
        let passes = two_passes();
        let selected = passes[1].clone();
        let result = reconcile(&passes, Some(&selected), at(10, 5), true);
        assert_eq!(result.map(|p| p.id()), Some(passes[0].id()));
    }

    #[test]
    fn keeps_future_selection_when_list_reorders() {
        let passes = two_passes();
        let selected = passes[1].clone();
        let mut reordered = passes.clone();
        reordered.reverse();
        let result = reconcile(&reordered, Some(&selected), at(10, 5), false).unwrap();
        assert_eq!(result.id(), selected.id());
    }

    #[test]
    fn refreshes_fields_of_kept_selection() {
        let passes = two_passes();
        let selected = passes[1].clone();
        let mut shifted = passes.clone();
        shifted[1].max_elevation_deg = 18.25;
        let result = reconcile(&shifted, Some(&selected), at(10, 5), false).unwrap();
        assert_eq!(result.id(), selected.id());
        assert_eq!(result.max_elevation_deg, 18.25);
    }

    #[test]
    fn keeps_previous_values_without_structural_match() {
        let selected = pass(at(11, 30), at(11, 40), 17.5);
        let drifted = vec![pass(at(11, 31), at(11, 40), 17.0)];
        let result = reconcile(&drifted, Some(&selected), at(11, 0), false).unwrap();
        assert_eq!(result, selected);
    }

    #[test]
    fn replaces_ended_selection() {
        let passes = two_passes();
        let selected = passes[0].clone();
        let result = reconcile(&passes, Some(&selected), at(10, 9), false).unwrap();
        assert_eq!(result.id(), passes[1].id());
    }

    #[test]
    fn fills_absent_selection() {
        let passes = two_passes();
        let result = reconcile(&passes, None, at(10, 5), false).unwrap();
        assert_eq!(result.id(), passes[0].id());
    }

    #[test]
    fn manual_selection_survives_unchanged_refresh() {
        let passes = two_passes();
        let selected = passes[1].clone();
        let result = reconcile(&passes, Some(&selected), at(11, 35), false).unwrap();
        assert_eq!(result, selected);
    }

    #[test]
    fn duplicate_identity_resolves_to_first_by_rise_order() {
        let a = pass(at(10, 0), at(10, 8), 30.0);
        let b = pass(at(10, 0), at(10, 8), 31.0);
        let picked = pick_active_or_next(&[a.clone(), b], at(9, 0)).unwrap();
        assert_eq!(picked, a);
    }
}
