//! Exercises registry saturation; isolated in its own binary because the
//! type registry is process-global.

use columnar_ecs::prelude::*;
use columnar_ecs::{ComponentId, MAX_COMPONENTS};

macro_rules! saturation_test {
    ($($name:ident),+ $(,)?) => {
        $(#[derive(Clone, Copy, Debug, Default)] struct $name;)+

        #[test]
        fn registry_saturates_at_max_components() {
            let results: Vec<EcsResult<ComponentId>> = vec![$(component_id_of::<$name>()),+];
            assert_eq!(results.len(), MAX_COMPONENTS + 1);

            let registered = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(registered, MAX_COMPONENTS);

            // Identifiers are dense and assigned in first-use order.
            for (expected, result) in results.iter().take(MAX_COMPONENTS).enumerate() {
                assert_eq!(*result, Ok(expected as ComponentId));
            }

            assert!(matches!(
                results[MAX_COMPONENTS],
                Err(EcsError::TooManyComponentTypes { cap: MAX_COMPONENTS })
            ));

            // Saturation is sticky: retrying the overflow type still fails,
            // while existing ids stay stable.
            assert!(component_id_of::<T64>().is_err());
            assert_eq!(component_id_of::<T00>(), Ok(0));
        }
    };
}

saturation_test!(
    T00, T01, T02, T03, T04, T05, T06, T07, T08, T09,
    T10, T11, T12, T13, T14, T15, T16, T17, T18, T19,
    T20, T21, T22, T23, T24, T25, T26, T27, T28, T29,
    T30, T31, T32, T33, T34, T35, T36, T37, T38, T39,
    T40, T41, T42, T43, T44, T45, T46, T47, T48, T49,
    T50, T51, T52, T53, T54, T55, T56, T57, T58, T59,
    T60, T61, T62, T63, T64,
);
