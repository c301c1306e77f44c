//! Precomputed per-minute selectability for a whole day.
//!
//! The picker grid and the validator both ask "is hour H minute M selectable"
//! for every slot they draw, so the answer is computed once per mode/bounds
//! change and then shared as an immutable snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use itertools::iproduct;

use crate::clock::{two_digits, twelve_hour_display, ClockMode, Meridiem};
use crate::range::{is_allowed, Bounds, BoundsKey};

pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_HOUR: u32 = 60;

/// Minute flags for a run of hour rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourMinuteTable {
    rows: Vec<[bool; MINUTES_PER_HOUR as usize]>,
}

impl HourMinuteTable {
    fn with_rows(count: usize) -> Self {
        HourMinuteTable {
            rows: vec![[false; MINUTES_PER_HOUR as usize]; count],
        }
    }

    fn set(&mut self, row: usize, minute: u32, allowed: bool) {
        if let Some(slot) = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(minute as usize))
        {
            *slot = allowed;
        }
    }

    pub fn get(&self, row: usize, minute: u32) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(minute as usize))
            .copied()
            .unwrap_or(false)
    }

    pub fn selectable_minutes(&self, row: usize) -> Vec<u32> {
        (0..MINUTES_PER_HOUR)
            .filter(|m| self.get(row, *m))
            .collect()
    }
}

/// Display hours 1..=12 live in rows 1..=11, with 12 in row 0.
fn meridiem_row(display_hour: u32) -> Option<usize> {
    if (1..=12).contains(&display_hour) {
        Some((display_hour % 12) as usize)
    } else {
        None
    }
}

/// Display order of a 12-hour clock face: 12, 1, 2, ..., 11.
const MERIDIEM_DISPLAY_ORDER: [u32; 12] = [12, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedMap {
    /// 24-hour mode, addressed by raw hour 0-23.
    Flat(HourMinuteTable),
    /// 12-hour mode, addressed by meridiem and display hour 1-12.
    Meridiem {
        am: HourMinuteTable,
        pm: HourMinuteTable,
    },
}

impl AllowedMap {
    pub fn build(mode: ClockMode, bounds: &Bounds) -> Self {
        let slots = iproduct!(0..HOURS_PER_DAY, 0..MINUTES_PER_HOUR);

        match mode {
            ClockMode::TwentyFourHour => {
                let mut table = HourMinuteTable::with_rows(HOURS_PER_DAY as usize);
                for (hour, minute) in slots {
                    let allowed = is_allowed(hour, minute, bounds, ClockMode::TwentyFourHour, None);
                    table.set(hour as usize, minute, allowed);
                }
                AllowedMap::Flat(table)
            }
            ClockMode::TwelveHour => {
                let mut am = HourMinuteTable::with_rows(12);
                let mut pm = HourMinuteTable::with_rows(12);
                for (hour, minute) in slots {
                    // Raw hour on purpose: the meridiem only decides the key.
                    let allowed = is_allowed(hour, minute, bounds, ClockMode::TwentyFourHour, None);
                    let row = (twelve_hour_display(hour) % 12) as usize;
                    let table = match Meridiem::of_hour(hour) {
                        Meridiem::Am => &mut am,
                        Meridiem::Pm => &mut pm,
                    };
                    table.set(row, minute, allowed);
                }
                AllowedMap::Meridiem { am, pm }
            }
        }
    }

    pub fn mode(&self) -> ClockMode {
        match self {
            AllowedMap::Flat(_) => ClockMode::TwentyFourHour,
            AllowedMap::Meridiem { .. } => ClockMode::TwelveHour,
        }
    }

    /// Lookup by raw 0-23 hour, whichever way the map is keyed.
    pub fn is_selectable(&self, hour: u32, minute: u32) -> bool {
        match self {
            AllowedMap::Flat(table) => table.get(hour as usize, minute),
            AllowedMap::Meridiem { .. } => {
                if hour >= HOURS_PER_DAY {
                    return false;
                }
                self.lookup(
                    twelve_hour_display(hour),
                    minute,
                    Some(Meridiem::of_hour(hour)),
                )
            }
        }
    }

    /// Lookup by the address the picker displays. A 12-hour map needs a
    /// meridiem; a flat map ignores it.
    pub fn lookup(&self, display_hour: u32, minute: u32, meridiem: Option<Meridiem>) -> bool {
        match (self, meridiem) {
            (AllowedMap::Flat(table), _) => table.get(display_hour as usize, minute),
            (AllowedMap::Meridiem { am, pm }, Some(meridiem)) => {
                let Some(row) = meridiem_row(display_hour) else {
                    return false;
                };
                match meridiem {
                    Meridiem::Am => am.get(row, minute),
                    Meridiem::Pm => pm.get(row, minute),
                }
            }
            (AllowedMap::Meridiem { .. }, None) => false,
        }
    }

    /// Selectable minutes per displayed hour, in clock-face order. Hours with
    /// nothing selectable are left out.
    pub fn selectable_minutes(&self) -> IndexMap<String, Vec<u32>> {
        let mut summary = IndexMap::new();
        match self {
            AllowedMap::Flat(table) => {
                for hour in 0..HOURS_PER_DAY {
                    let minutes = table.selectable_minutes(hour as usize);
                    if !minutes.is_empty() {
                        summary.insert(two_digits(hour), minutes);
                    }
                }
            }
            AllowedMap::Meridiem { am, pm } => {
                for (meridiem, table) in [(Meridiem::Am, am), (Meridiem::Pm, pm)] {
                    for display_hour in MERIDIEM_DISPLAY_ORDER {
                        let row = (display_hour % 12) as usize;
                        let minutes = table.selectable_minutes(row);
                        if !minutes.is_empty() {
                            summary.insert(format!("{} {}", display_hour, meridiem), minutes);
                        }
                    }
                }
            }
        }
        summary
    }
}

struct Snapshot {
    key: (ClockMode, BoundsKey),
    map: Arc<AllowedMap>,
    /// Order in which the refresh that built this map was requested.
    generation: u64,
}

/// The current `AllowedMap`, replaced wholesale whenever the mode or the
/// effective bounds change. With concurrent refreshes the most recently
/// requested one wins, whichever finishes building last.
#[derive(Clone)]
pub struct SharedAllowedMap {
    inner: Arc<RwLock<Snapshot>>,
    requests: Arc<AtomicU64>,
}

impl SharedAllowedMap {
    pub fn new(mode: ClockMode, bounds: &Bounds) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                key: (mode, bounds.key()),
                map: Arc::new(AllowedMap::build(mode, bounds)),
                generation: 0,
            })),
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_generation(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Stores `snapshot` unless a later request already stored its own.
    fn install(&self, snapshot: Snapshot) -> bool {
        let mut current = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if current.generation > snapshot.generation {
            return false;
        }
        *current = snapshot;
        true
    }

    pub fn snapshot(&self) -> Arc<AllowedMap> {
        let current = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        current.map.clone()
    }

    /// Rebuilds if `mode` or `bounds` differ from the last build. Returns
    /// whether a rebuild happened.
    pub fn refresh(&self, mode: ClockMode, bounds: &Bounds) -> bool {
        let key = (mode, bounds.key());

        // Read-only check (drops before we build)
        {
            let current = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if current.key == key {
                return false;
            }
        }

        let generation = self.next_generation();
        let map = Arc::new(AllowedMap::build(mode, bounds));

        let installed = self.install(Snapshot {
            key,
            map,
            generation,
        });
        if installed {
            log::debug!(
                "Rebuilt allowed-time map for {} mode (min: {:?}, max: {:?})",
                mode,
                bounds.min,
                bounds.max
            );
        } else {
            log::debug!("Dropped allowed-time map superseded by a later refresh");
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn office_hours() -> Bounds {
        Bounds::new(Some(at(10, 0)), Some(at(18, 0)))
    }

    #[test]
    fn test_unbounded_map_allows_everything() {
        for mode in [ClockMode::TwentyFourHour, ClockMode::TwelveHour] {
            let map = AllowedMap::build(mode, &Bounds::unbounded());
            assert_eq!(map.mode(), mode);
            for (hour, minute) in iproduct!(0..24, 0..60) {
                assert!(map.is_selectable(hour, minute));
            }
        }
    }

    #[test]
    fn test_flat_map_lookup() {
        let map = AllowedMap::build(ClockMode::TwentyFourHour, &office_hours());
        assert!(matches!(map, AllowedMap::Flat(_)));
        assert!(map.lookup(10, 0, None));
        assert!(map.lookup(18, 0, None));
        assert!(!map.lookup(18, 1, None));
        assert!(!map.lookup(9, 59, None));
        assert!(!map.lookup(24, 0, None));
    }

    #[test]
    fn test_meridiem_map_lookup() {
        let map = AllowedMap::build(ClockMode::TwelveHour, &office_hours());
        assert!(matches!(map, AllowedMap::Meridiem { .. }));
        assert!(map.lookup(10, 0, Some(Meridiem::Am)));
        assert!(!map.lookup(9, 59, Some(Meridiem::Am)));
        assert!(map.lookup(12, 0, Some(Meridiem::Pm)));
        assert!(!map.lookup(12, 0, Some(Meridiem::Am)));
        assert!(map.lookup(6, 0, Some(Meridiem::Pm)));
        assert!(!map.lookup(6, 1, Some(Meridiem::Pm)));
        assert!(!map.lookup(0, 0, Some(Meridiem::Am)));
        assert!(!map.lookup(13, 0, Some(Meridiem::Pm)));
        assert!(!map.lookup(10, 0, None));
    }

    #[test]
    fn test_selectable_minutes_summary() {
        let bounds = Bounds::new(Some(at(17, 58)), Some(at(18, 1)));

        let flat = AllowedMap::build(ClockMode::TwentyFourHour, &bounds).selectable_minutes();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["17"], vec![58, 59]);
        assert_eq!(flat["18"], vec![0, 1]);

        let twelve = AllowedMap::build(ClockMode::TwelveHour, &bounds).selectable_minutes();
        let keys: Vec<_> = twelve.keys().cloned().collect();
        assert_eq!(keys, vec!["5 pm", "6 pm"]);
    }

    #[test]
    fn test_meridiem_summary_order() {
        let summary = AllowedMap::build(ClockMode::TwelveHour, &Bounds::unbounded())
            .selectable_minutes();
        let keys: Vec<_> = summary.keys().take(3).cloned().collect();
        assert_eq!(keys, vec!["12 am", "1 am", "2 am"]);
        assert_eq!(summary.len(), 24);
    }

    #[test]
    fn test_shared_map_rebuilds_on_effective_change() {
        let shared = SharedAllowedMap::new(ClockMode::TwentyFourHour, &office_hours());
        let before = shared.snapshot();

        // Same instants, different seconds: no rebuild.
        let same = Bounds::new(
            Some(
                NaiveDate::from_ymd_opt(2025, 1, 15)
                    .unwrap()
                    .and_hms_opt(10, 0, 30)
                    .unwrap(),
            ),
            Some(at(18, 0)),
        );
        assert!(!shared.refresh(ClockMode::TwentyFourHour, &same));
        assert!(Arc::ptr_eq(&before, &shared.snapshot()));

        assert!(shared.refresh(ClockMode::TwelveHour, &office_hours()));
        assert_eq!(shared.snapshot().mode(), ClockMode::TwelveHour);

        let wider = Bounds::new(Some(at(8, 0)), Some(at(18, 0)));
        assert!(shared.refresh(ClockMode::TwelveHour, &wider));
        assert!(shared.snapshot().is_selectable(8, 0));

        // Readers holding the old snapshot keep a consistent view.
        assert!(!before.is_selectable(8, 0));
    }

    #[test]
    fn test_shared_map_keeps_latest_request() {
        let shared = SharedAllowedMap::new(ClockMode::TwentyFourHour, &Bounds::unbounded());
        let earlier = shared.next_generation();
        let later = shared.next_generation();

        let office = (ClockMode::TwentyFourHour, office_hours().key());
        assert!(shared.install(Snapshot {
            key: office,
            map: Arc::new(AllowedMap::build(ClockMode::TwentyFourHour, &office_hours())),
            generation: later,
        }));

        // The earlier request finishes last and must not replace the newer map.
        let unbounded = Bounds::unbounded();
        assert!(!shared.install(Snapshot {
            key: (ClockMode::TwentyFourHour, unbounded.key()),
            map: Arc::new(AllowedMap::build(ClockMode::TwentyFourHour, &unbounded)),
            generation: earlier,
        }));
        assert!(!shared.snapshot().is_selectable(8, 0));

        // The stored key still matches the newer map, so repeating it is a no-op.
        assert!(!shared.refresh(ClockMode::TwentyFourHour, &office_hours()));
    }

    #[test]
    fn test_shared_map_readers_see_whole_maps() {
        let shared = SharedAllowedMap::new(ClockMode::TwentyFourHour, &Bounds::unbounded());
        let reader = shared.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..50 {
                let map = reader.snapshot();
                let selectable = iproduct!(0..24, 0..60)
                    .filter(|(h, m)| map.is_selectable(*h, *m))
                    .count();
                // Either the unbounded map or the office-hours map, never a mix.
                assert!(selectable == 1440 || selectable == 8 * 60 + 1);
            }
        });

        for i in 0..50 {
            let bounds = if i % 2 == 0 {
                office_hours()
            } else {
                Bounds::unbounded()
            };
            shared.refresh(ClockMode::TwentyFourHour, &bounds);
        }

        handle.join().unwrap();
    }

    fn valid_bound() -> impl Strategy<Value = Option<NaiveDateTime>> {
        prop::option::of((0u32..24, 0u32..60).prop_map(|(h, m)| at(h, m)))
    }

    proptest! {
        /// The map and the direct check never disagree
        #[test]
        fn map_matches_is_allowed(
            min in valid_bound(),
            max in valid_bound(),
            twelve_hour in any::<bool>(),
        ) {
            let mode = if twelve_hour { ClockMode::TwelveHour } else { ClockMode::TwentyFourHour };
            let bounds = Bounds::new(min, max);
            let map = AllowedMap::build(mode, &bounds);
            for (hour, minute) in iproduct!(0..24, 0..60) {
                prop_assert_eq!(
                    map.is_selectable(hour, minute),
                    is_allowed(hour, minute, &bounds, mode, None)
                );
            }
        }
    }
}
