/*!
 * Rollback Symmetry Properties
 *
 * Whatever stage fails, every stage before it ends uninitialized, in reverse
 * order, and no stage after it is touched.
 */

use proptest::prelude::*;
use runtime_lifecycle::lifecycle::{InitSequence, Stage};
use runtime_lifecycle::{SubsystemError, SubsystemId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const IDS: [SubsystemId; 7] = [
    SubsystemId::FeatureTable,
    SubsystemId::CapabilityDispatch,
    SubsystemId::FaultTrap,
    SubsystemId::ApiThunks,
    SubsystemId::Locks,
    SubsystemId::ThreadData,
    SubsystemId::Telemetry,
];

struct Unit {
    live: AtomicBool,
    inits: AtomicUsize,
}

impl Unit {
    fn new() -> Self {
        Self {
            live: AtomicBool::new(false),
            inits: AtomicUsize::new(0),
        }
    }
}

fn sequence_over<'a>(units: &'a [Unit], fail_at: Option<usize>) -> InitSequence<'a> {
    units
        .iter()
        .enumerate()
        .fold(InitSequence::new(), |sequence, (index, unit)| {
            sequence.stage(Stage::fallible(
                IDS[index],
                move || {
                    unit.inits.fetch_add(1, Ordering::SeqCst);
                    if fail_at == Some(index) {
                        return Err(SubsystemError::ResourceExhausted(format!("stage {}", index)));
                    }
                    unit.live.store(true, Ordering::SeqCst);
                    Ok(())
                },
                move || unit.live.store(false, Ordering::SeqCst),
            ))
        })
}

proptest! {
    #[test]
    fn prop_failure_rolls_back_exact_prefix(len in 1usize..=IDS.len(), fail_seed in any::<usize>()) {
        let fail_at = fail_seed % len;
        let units: Vec<Unit> = (0..len).map(|_| Unit::new()).collect();
        let sequence = sequence_over(&units, Some(fail_at));

        let failure = sequence.initialize().unwrap_err();

        prop_assert_eq!(failure.failed, IDS[fail_at]);
        let expected: Vec<SubsystemId> = IDS[..fail_at].iter().rev().copied().collect();
        prop_assert_eq!(failure.rolled_back, expected);

        for (index, unit) in units.iter().enumerate() {
            prop_assert!(!unit.live.load(Ordering::SeqCst));
            let expected_inits = usize::from(index <= fail_at);
            prop_assert_eq!(unit.inits.load(Ordering::SeqCst), expected_inits);
        }
    }

    #[test]
    fn prop_success_leaves_all_live(len in 0usize..=IDS.len()) {
        let units: Vec<Unit> = (0..len).map(|_| Unit::new()).collect();
        let sequence = sequence_over(&units, None);

        prop_assert_eq!(sequence.initialize(), Ok(len));
        prop_assert!(units.iter().all(|unit| unit.live.load(Ordering::SeqCst)));

        let unwound = sequence.unwind(len);
        prop_assert_eq!(unwound.len(), len);
        prop_assert!(units.iter().all(|unit| !unit.live.load(Ordering::SeqCst)));
    }
}
