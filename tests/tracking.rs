use tag_ranging_ekf::{
    AngularRates, FilterConfig, FilterError, SimulatedClock, StateEstimate, StateEstimator,
    TagMeasurement, Vector3, MAX_TAGS,
};

const TAG_HEIGHT: f64 = 1.4;
const TAGS: [[f64; 3]; 4] = [
    [0.0, 0.0, TAG_HEIGHT],
    [3.0, 0.0, TAG_HEIGHT],
    [0.0, 2.0, TAG_HEIGHT],
    [3.0, 2.0, TAG_HEIGHT],
];

fn ranges_from(truth: Vector3<f64>) -> Vec<TagMeasurement<f64>> {
    TAGS.iter()
        .map(|&[x, y, z]| {
            let tag = Vector3::new(x, y, z);
            TagMeasurement::new(truth.distance_to(&tag), x, y, z)
        })
        .collect()
}

fn assert_invariants(state: &StateEstimate<f64>) {
    let config = FilterConfig::<f64>::default();
    assert!(state.speed.abs() <= config.speed_limit, "speed {state:?}");
    assert!(config.bounds.x.contains(state.x), "x out of bounds: {state:?}");
    assert!(config.bounds.y.contains(state.y), "y out of bounds: {state:?}");
    assert!(config.bounds.z.contains(state.z), "z out of bounds: {state:?}");
}

#[test]
fn converges_on_stationary_platform() {
    let truth = Vector3::new(2.0, 1.0, 0.5);
    let tags = ranges_from(truth);

    let mut estimator = StateEstimator::new(SimulatedClock::new(0.0), FilterConfig::default());
    for _ in 0..100 {
        for _ in 0..5 {
            estimator.clock_mut().advance(0.02);
            estimator.predict(&AngularRates::new(0.0, 0.0, 0.05));
        }

        let report = estimator.update(&tags).expect("tags are well-placed");
        assert_eq!(report.accepted_tags, 4);
        assert!(!report.reset_axes.any());
        assert_invariants(&estimator.raw_state());
    }

    let state = estimator.raw_state();
    let error = state.position().distance_to(&truth);
    assert!(error < 0.5, "position error {error} too large: {state:?}");

    let covariance = estimator.covariance();
    for axis in 0..3 {
        assert!(covariance[axis][axis] > 0.0);
        assert!(covariance[axis][axis] < 0.1);
    }
}

#[test]
fn survives_dropouts() {
    let truth = Vector3::new(1.5, 1.0, 0.5);
    let tags = ranges_from(truth);

    let mut estimator = StateEstimator::new(SimulatedClock::new(10.0), FilterConfig::default());
    estimator
        .set_state(StateEstimate::new(1.5, 1.0, 0.5, 0.4))
        .expect("state is finite");

    for cycle in 0..60 {
        estimator.clock_mut().advance(0.1);
        estimator.predict(&AngularRates::new(0.0, 0.0, 0.0));

        if cycle % 3 == 0 {
            estimator.mark_no_measurement();
            continue;
        }

        estimator.update(&tags).expect("tags are well-placed");
        assert_invariants(&estimator.raw_state());
    }

    assert!(estimator.dropout_count() <= 20);
    assert_eq!(estimator.last_measurement().len(), TAGS.len());
    assert_eq!(estimator.last_innovation().len(), TAGS.len());
}

#[test]
fn failed_updates_leave_filter_untouched() {
    let mut estimator = StateEstimator::new(SimulatedClock::new(0.0), FilterConfig::default());
    estimator.clock_mut().advance(0.1);
    estimator
        .update(&ranges_from(Vector3::new(1.2, 1.1, 0.4)))
        .expect("tags are well-placed");

    let state = estimator.raw_state();
    let covariance = estimator.covariance();
    let innovations = estimator.last_innovation().to_vec();

    let mut tags = ranges_from(Vector3::new(1.2, 1.1, 0.4));
    tags.push(TagMeasurement::new(1.0, 1.0, 1.0, 0.0));
    assert!(matches!(
        estimator.update(&tags),
        Err(FilterError::DegenerateGeometry { tag: 4, .. })
    ));

    let oversized = vec![TagMeasurement::new(1.0, 0.0, 0.0, TAG_HEIGHT); MAX_TAGS + 1];
    assert!(matches!(
        estimator.update(&oversized),
        Err(FilterError::TooManyTags { .. })
    ));

    assert_eq!(estimator.raw_state(), state);
    assert_eq!(estimator.covariance(), covariance);
    assert_eq!(estimator.last_innovation(), innovations.as_slice());
}

#[test]
fn parses_raw_rows() {
    let rows: [&[f32]; 2] = [&[1.2, 0.0, 2.0, 1.4, 7.0], &[0.9, 3.0, 0.0, 1.4]];
    let tags = rows
        .iter()
        .map(|row| TagMeasurement::from_row(row))
        .collect::<Result<Vec<_>, _>>()
        .expect("rows are complete");

    let mut estimator = StateEstimator::new(SimulatedClock::new(0.0_f32), FilterConfig::default());
    let report = estimator.update(&tags).expect("tags are well-placed");
    assert_eq!(report.accepted_tags, 2);

    assert!(matches!(
        TagMeasurement::<f32>::from_row(&[1.0, 2.0]),
        Err(FilterError::InvalidInputShape {
            expected: 4,
            found: 2
        })
    ));
}
