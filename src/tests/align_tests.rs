use super::cohort_at;
use crate::harness::{
    align, fastest_finish_in_shared_space, faster, map_to_range, HarnessError, PlotScale,
    Strategy, WorkerId, MIN_DOMAIN_WIDTH,
};

#[test]
fn test_align_to_earlier_start() {
    let threads = cohort_at(Strategy::Threads, (10.0, 11.0), &[(10.1, 10.9)]);
    let processes = cohort_at(Strategy::Processes, (12.5, 15.0), &[(12.6, 14.0), (12.7, 14.5)]);

    let (a, b) = align(&threads, &processes);

    assert_eq!(a.outer.start, 0.0);
    assert_eq!(b.outer.start, 2.5);
    assert_eq!(b.workers[0].span.end, 4.0);
    assert_eq!(b.triples()[1].0, WorkerId(1));
    assert_eq!(a.strategy, Strategy::Threads);
}

#[test]
fn test_align_preserves_relative_offsets_in_either_order() {
    let first = cohort_at(Strategy::Threads, (3.0, 4.5), &[(3.1, 4.0), (3.2, 4.4)]);
    let second = cohort_at(Strategy::Processes, (5.0, 5.75), &[(5.25, 5.5)]);

    let (a1, b1) = align(&first, &second);
    let (b2, a2) = align(&second, &first);

    assert_eq!(a1, a2);
    assert_eq!(b1, b2);
    // Shifting never changes durations
    assert_eq!(b1.workers[0].span.duration(), 0.25);
    assert_eq!(b1.outer.start - a1.outer.start, 2.0);
}

#[test]
fn test_anchored_starts_at_zero() {
    let first = cohort_at(Strategy::Threads, (1.0, 2.0), &[]);
    let second = cohort_at(Strategy::Processes, (4.0, 6.0), &[(4.5, 5.5)]);
    let (_, b) = align(&first, &second);

    let anchored = b.anchored();
    assert_eq!(anchored.outer.start, 0.0);
    assert_eq!(anchored.outer.end, 2.0);
    assert_eq!(anchored.workers[0].span.start, 0.5);
    assert_eq!(anchored.latest_end(), 2.0);
}

#[test]
fn test_faster_and_fastest_finish() {
    let threads = cohort_at(Strategy::Threads, (0.0, 3.0), &[]);
    let processes = cohort_at(Strategy::Processes, (4.0, 5.0), &[]);

    assert_eq!(faster(&threads, &processes).strategy, Strategy::Processes);
    assert_eq!(fastest_finish_in_shared_space(&threads, &processes), 5.0);

    // Ties go to the first argument
    let tied = cohort_at(Strategy::Processes, (4.0, 7.0), &[]);
    assert_eq!(faster(&threads, &tied).strategy, Strategy::Threads);
    assert_eq!(fastest_finish_in_shared_space(&threads, &tied), 3.0);
}

#[test]
fn test_map_to_range_boundaries_are_exact() {
    let domains = [(0.0, 1.0), (0.1, 0.7), (-3.3, 17.9), (1e-9, 2e-9)];
    let ranges = [(0.0, 100.0), (16.0, 99.0), (0.3, -0.7)];

    for &(dl, dh) in &domains {
        for &(rl, rh) in &ranges {
            assert_eq!(map_to_range(dl, dl, dh, rl, rh).unwrap(), rl);
            assert_eq!(map_to_range(dh, dl, dh, rl, rh).unwrap(), rh);
        }
    }
    assert_eq!(map_to_range(0.5, 0.0, 1.0, 0.0, 100.0).unwrap(), 50.0);
}

#[test]
fn test_map_to_range_degenerate_domain() {
    match map_to_range(1.0, 2.0, 2.0, 0.0, 100.0) {
        Err(HarnessError::DomainDegenerate { low, high }) => {
            assert_eq!(low, 2.0);
            assert_eq!(high, 2.0);
        }
        other => panic!("expected DomainDegenerate, got {other:?}"),
    }
}

#[test]
fn test_plot_scale() {
    assert!(PlotScale::new((1.0, 1.0), (0.0, 1.0)).is_err());

    let scale = PlotScale::new((0.0, 4.0), (10.0, 50.0)).unwrap();
    assert_eq!(scale.map(0.0), 10.0);
    assert_eq!(scale.map(4.0), 50.0);
    assert_eq!(scale.map(2.0), 30.0);

    // Zero-width data still gets a usable domain
    let fitted = PlotScale::fitted(0.0, 0.0, (16.0, 99.0));
    assert_eq!(fitted.map(0.0), 16.0);
    assert_eq!(fitted.map(MIN_DOMAIN_WIDTH), 99.0);
}
