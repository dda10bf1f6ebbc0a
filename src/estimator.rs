mod types;

pub use crate::estimator::types::{CovarianceMatrix, UpdateReport, MAX_TAGS};

use crate::bounds::BoundsGuard;
use crate::clock::Clock;
use crate::config::FilterConfig;
use crate::error::{DegenerateCause, FilterError};
use crate::estimator::types::*;
use crate::measurement::{predicted_ranges, range_jacobians, slant_noise_scale};
use crate::num_traits::IsFinite;
use crate::orientation::OrientationTracker;
use crate::types::{AngularRates, EulerAngles, StateEstimate, TagMeasurement, Vector3};
use crate::velocity::VelocityEstimator;
use crate::FilterScalar;
use minikalman::buffers::types::*;
use minikalman::prelude::*;
use minikalman::regular::{ControlBuilder, RegularKalmanBuilder};
use tracing::{debug, trace, warn};

/// An Extended Kalman Filter estimating the world-frame position and the
/// body-frame forward speed of a platform from tag ranges and angular rates.
///
/// The state vector is `[x, y, z, v]`. Prediction carries the forward speed
/// along the dead-reckoned orientation; updates correct the position from the
/// ranges to tags of known position and derive the speed from the corrected
/// motion.
pub struct StateEstimator<T, C> {
    filter: OwnedKalmanFilter<T>,
    control: OwnedControlInput<T>,
    orientation: OrientationTracker<T>,
    velocity: VelocityEstimator<T>,
    guard: BoundsGuard<T>,
    config: FilterConfig<T>,
    /// The state restored by [`reset`](Self::reset).
    initial_state: StateEstimate<T>,
    /// The covariance restored by [`reset`](Self::reset) and by axis resets.
    initial_covariance: CovarianceMatrix<T>,
    /// The time of the last prediction, in seconds.
    last_prediction: T,
    /// The measured ranges of the last successful update.
    last_measurement: heapless::Vec<T, MAX_TAGS>,
    /// The range innovations of the last successful update.
    last_innovation: heapless::Vec<T, MAX_TAGS>,
    clock: C,
}

impl<T, C> StateEstimator<T, C>
where
    T: FilterScalar,
    C: Clock<T>,
{
    /// Initializes a new instance of the [`StateEstimator`] struct.
    ///
    /// The filter starts from the configured initial state with the diagonal
    /// covariance of the configured initial standard deviations. Both the
    /// prediction and the update timestamps are taken from the clock.
    pub fn new(clock: C, config: FilterConfig<T>) -> Self {
        let covariance = config.initial_sigma.diagonal_covariance();
        Self::build(clock, config, config.initial_state, covariance)
    }

    /// Initializes a new instance of the [`StateEstimator`] struct from an explicit
    /// initial state and, optionally, an initial covariance.
    ///
    /// ## Arguments
    /// * `clock` - The source of timestamps.
    /// * `config` - The filter configuration.
    /// * `state` - The initial state; replaces the configured one.
    /// * `covariance` - The initial covariance; if `None`, the diagonal covariance
    ///   of the configured initial standard deviations is used.
    pub fn with_initial(
        clock: C,
        config: FilterConfig<T>,
        state: StateEstimate<T>,
        covariance: Option<CovarianceMatrix<T>>,
    ) -> Result<Self, FilterError> {
        ensure_finite_state(&state)?;
        let covariance = match covariance {
            Some(covariance) => {
                ensure_finite_covariance(&covariance)?;
                covariance
            }
            None => config.initial_sigma.diagonal_covariance(),
        };

        let config = config.with_initial_state(state);
        Ok(Self::build(clock, config, state, covariance))
    }

    fn build(
        mut clock: C,
        config: FilterConfig<T>,
        state: StateEstimate<T>,
        covariance: CovarianceMatrix<T>,
    ) -> Self {
        let now = clock.now();
        let filter = Self::build_filter(&config, &state, &covariance);
        let control = Self::build_control();

        Self {
            filter,
            control,
            orientation: OrientationTracker::new(),
            velocity: VelocityEstimator::new(state.position(), now),
            guard: BoundsGuard::new(config.bounds),
            config,
            initial_state: state,
            initial_covariance: covariance,
            last_prediction: now,
            last_measurement: heapless::Vec::new(),
            last_innovation: heapless::Vec::new(),
            clock,
        }
    }
}

impl<T, C> StateEstimator<T, C>
where
    T: FilterScalar,
{
    /// Obtains the current state estimate, rounded to three decimal places.
    pub fn estimated_state(&self) -> StateEstimate<T> {
        let state = self.raw_state();
        StateEstimate::new(
            state.x.round_decimals(3),
            state.y.round_decimals(3),
            state.z.round_decimals(3),
            state.speed.round_decimals(3),
        )
    }

    /// Obtains the current state estimate at full precision.
    pub fn raw_state(&self) -> StateEstimate<T> {
        let vec = self.filter.state_vector();
        StateEstimate::new(vec.get_row(0), vec.get_row(1), vec.get_row(2), vec.get_row(3))
    }

    /// Obtains the current estimate covariance.
    ///
    /// ## Interpretation
    /// - Low Variance: Indicates high certainty in the estimate. The state estimate is
    ///   considered to be precise, as it doesn't vary much from the mean.
    /// - High Variance: Indicates high uncertainty in the estimate. The state estimate is
    ///   considered to be less precise, as it has a wide spread around the mean.
    pub fn covariance(&self) -> CovarianceMatrix<T> {
        let mat = self.filter.estimate_covariance();
        let mut covariance = [[T::zero(); STATES]; STATES];
        for (row, values) in covariance.iter_mut().enumerate() {
            for (column, value) in values.iter_mut().enumerate() {
                *value = mat.get_at(row, column);
            }
        }
        covariance
    }

    /// The measured ranges of the last successful update, one per tag of the batch.
    pub fn last_measurement(&self) -> &[T] {
        &self.last_measurement
    }

    /// The range innovations (measured minus predicted) of the last successful
    /// update, one per tag of the batch.
    pub fn last_innovation(&self) -> &[T] {
        &self.last_innovation
    }

    /// Obtains the current estimate of the yaw angle ψ (psi), in radians.
    pub fn yaw(&self) -> T {
        self.orientation.yaw()
    }

    /// Obtains the current estimate of the pitch angle θ (theta), in radians.
    pub fn pitch(&self) -> T {
        self.orientation.pitch()
    }

    /// Obtains the current estimate of the roll angle φ (phi), in radians.
    pub fn roll(&self) -> T {
        self.orientation.roll()
    }

    /// Obtains the current estimates of the roll, pitch and yaw angles.
    pub fn orientation(&self) -> EulerAngles<T> {
        self.orientation.angles()
    }

    /// The number of cycles without tags not yet worked off by updates.
    pub fn dropout_count(&self) -> u32 {
        self.velocity.dropout_count()
    }

    /// The filter configuration.
    pub fn config(&self) -> &FilterConfig<T> {
        &self.config
    }

    /// The clock the filter reads its timestamps from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The clock the filter reads its timestamps from, e.g. to advance a simulated clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

impl<T, C> StateEstimator<T, C>
where
    T: FilterScalar,
    C: Clock<T>,
{
    /// Performs a prediction step from the body angular rates.
    ///
    /// The orientation is advanced by the rates, the forward displacement `v·Δt`
    /// is rotated into the world frame and added to the position, and the speed
    /// decays. The covariance is propagated as `P = F×P×Fᵀ + Q`.
    ///
    /// ## Arguments
    /// * `angular_rates` - The body angular rates, in radians per second.
    pub fn predict(&mut self, angular_rates: &AngularRates<T>) {
        let now = self.clock.now();
        let mut delta_t = now - self.last_prediction;
        if delta_t == T::zero() {
            delta_t = self.config.default_predict_dt;
        }

        self.orientation.integrate(angular_rates, delta_t);
        if self
            .orientation
            .close_to_gimbal_lock(self.config.gimbal_lock_tolerance)
        {
            warn!(pitch = ?self.orientation.pitch(), "Pitch is close to gimbal lock");
        }

        // The displacement uses the speed before it decays.
        let speed = self.filter.state_vector().get_row(3);
        let forward = Vector3::new(speed * delta_t, T::zero(), T::zero());
        let offset = self.orientation.rotate_body_to_world(forward);
        self.control.control_vector_mut().apply(|vec| {
            vec.set_row(0, offset.x);
            vec.set_row(1, offset.y);
            vec.set_row(2, offset.z);
        });

        // Perform a regular Kalman Filter prediction step.
        self.filter.predict();

        // Apply the displacement as control input.
        self.filter.control(&mut self.control);

        self.last_prediction = now;
    }

    /// Performs a correction step from a batch of tag ranges.
    ///
    /// Tags reporting a range beyond the configured maximum (or NaN) are ignored.
    /// The speed is fused from the corrected motion even if no tag was accepted.
    /// Position axes leaving the workspace are reset afterward.
    ///
    /// At most [`MAX_TAGS`] tags are processed per call, as the last ranges and
    /// innovations are kept in fixed-capacity buffers. Larger batches must be
    /// split by the caller.
    ///
    /// ## Errors
    /// Fails without modifying the filter if the batch holds more than
    /// [`MAX_TAGS`] tags, or if an accepted tag has degenerate geometry.
    pub fn update(
        &mut self,
        tags: &[TagMeasurement<T>],
    ) -> Result<UpdateReport<T>, FilterError> {
        if tags.len() > MAX_TAGS {
            return Err(FilterError::TooManyTags {
                capacity: MAX_TAGS,
                found: tags.len(),
            });
        }

        let now = self.clock.now();
        let state = self.raw_state();
        let position = state.position();
        let covariance = self.covariance();
        let range_variance = self.config.range_variance();

        let too_many = |_| FilterError::TooManyTags {
            capacity: MAX_TAGS,
            found: tags.len(),
        };

        let mut measurements = heapless::Vec::<T, MAX_TAGS>::new();
        let mut innovations = heapless::Vec::<T, MAX_TAGS>::new();
        let mut correction = Vector3::new(T::zero(), T::zero(), T::zero());
        let mut gain_jacobian = [[T::zero(); 3]; 3];
        let mut accepted_tags = 0;

        let predictions = predicted_ranges(&position, tags).zip(range_jacobians(&position, tags));
        for (index, (tag, (predicted, jacobian))) in tags.iter().zip(predictions).enumerate() {
            let innovation = tag.range - predicted;
            measurements.push(tag.range).map_err(too_many)?;
            innovations.push(innovation).map_err(too_many)?;

            // NaN ranges fail the comparison and are rejected as well.
            let within_range = tag.range <= self.config.max_tag_range;
            if !within_range {
                trace!(tag = index, range = ?tag.range, "Rejecting tag out of range");
                continue;
            }

            let scale = slant_noise_scale(&tag.position())
                .map_err(|cause| FilterError::DegenerateGeometry { tag: index, cause })?;
            let jacobian = jacobian.into_array();

            // P×Jᵀ over the position block.
            let mut pjt = [T::zero(); 3];
            for (row, value) in pjt.iter_mut().enumerate() {
                *value = covariance[row][0] * jacobian[0]
                    + covariance[row][1] * jacobian[1]
                    + covariance[row][2] * jacobian[2];
            }

            let innovation_variance = jacobian[0] * pjt[0]
                + jacobian[1] * pjt[1]
                + jacobian[2] * pjt[2]
                + range_variance * scale;
            if innovation_variance == T::zero() {
                return Err(FilterError::DegenerateGeometry {
                    tag: index,
                    cause: DegenerateCause::ZeroInnovationVariance,
                });
            }

            let gain = Vector3::new(
                pjt[0] / innovation_variance,
                pjt[1] / innovation_variance,
                pjt[2] / innovation_variance,
            );
            trace!(tag = index, ?innovation, ?innovation_variance, "Accepting tag");

            correction = correction + gain * innovation;
            for (row, k) in gain.into_array().into_iter().enumerate() {
                for (column, j) in jacobian.iter().enumerate() {
                    gain_jacobian[row][column] = gain_jacobian[row][column] + k * *j;
                }
            }
            accepted_tags += 1;
        }

        let mut corrected = position + correction;

        // (I - K×J)×P for the position rows.
        let mut updated = covariance;
        for (row, values) in updated.iter_mut().take(3).enumerate() {
            for (column, value) in values.iter_mut().enumerate() {
                let kjp = gain_jacobian[row][0] * covariance[0][column]
                    + gain_jacobian[row][1] * covariance[1][column]
                    + gain_jacobian[row][2] * covariance[2][column];
                *value = covariance[row][column] - kjp;
            }
        }

        let fusion = self.velocity.fuse(
            &corrected,
            state.speed,
            covariance[3][3],
            now,
            &self.config,
        );
        for (column, value) in updated[3].iter_mut().enumerate() {
            *value = (T::one() - fusion.gain) * covariance[3][column];
        }

        self.velocity.commit(corrected, now);
        let reset_axes = self.guard.enforce(
            &mut corrected,
            self.velocity.previous_position_mut(),
            &mut updated,
            &self.initial_covariance,
        );
        if reset_axes.any() {
            warn!(
                x = reset_axes.x,
                y = reset_axes.y,
                z = reset_axes.z,
                "Position left the workspace, resetting axes"
            );
        }

        self.write_state(&StateEstimate::from_position(corrected, fusion.speed));
        self.write_covariance(&updated);
        self.last_measurement = measurements;
        self.last_innovation = innovations;

        let rejected_tags = tags.len() - accepted_tags;
        debug!(
            accepted_tags,
            rejected_tags,
            speed_measurement = ?fusion.measurement,
            speed = ?fusion.speed,
            "Updated from tag ranges"
        );

        Ok(UpdateReport {
            accepted_tags,
            rejected_tags,
            speed_measurement: fusion.measurement,
            reset_axes,
        })
    }

    /// Registers a cycle in which no tag was seen.
    ///
    /// The speed estimate is inflated by the configured dropout gain and the
    /// dropout counter is incremented. The speed is not limited until the next
    /// [`update`](Self::update).
    pub fn mark_no_measurement(&mut self) {
        let gain = self.config.dropout_speed_gain;
        self.filter.state_vector_mut().apply(|vec| {
            vec.set_row(3, vec.get_row(3) * gain);
        });
        self.velocity.register_dropout();
    }

    /// Overrides the orientation angles.
    pub fn set_orientation(&mut self, angles: EulerAngles<T>) {
        self.orientation.set_angles(angles);
    }

    /// Restores the initial state and covariance.
    ///
    /// Orientation, dropout counter, previous position and timestamps are kept.
    pub fn reset(&mut self) {
        let state = self.initial_state;
        let covariance = self.initial_covariance;
        self.write_state(&state);
        self.write_covariance(&covariance);
    }

    /// Replaces the current state estimate.
    ///
    /// ## Errors
    /// Fails with [`FilterError::NonFinite`] if any component is NaN or infinite.
    pub fn set_state(&mut self, state: StateEstimate<T>) -> Result<(), FilterError> {
        ensure_finite_state(&state)?;
        self.write_state(&state);
        Ok(())
    }

    /// Replaces the current estimate covariance.
    ///
    /// ## Errors
    /// Fails with [`FilterError::NonFinite`] if any entry is NaN or infinite.
    pub fn set_covariance(&mut self, covariance: CovarianceMatrix<T>) -> Result<(), FilterError> {
        ensure_finite_covariance(&covariance)?;
        self.write_covariance(&covariance);
        Ok(())
    }

    fn write_state(&mut self, state: &StateEstimate<T>) {
        self.filter.state_vector_mut().apply(|vec| {
            vec.set_row(0, state.x);
            vec.set_row(1, state.y);
            vec.set_row(2, state.z);
            vec.set_row(3, state.speed);
        });
    }

    fn write_covariance(&mut self, covariance: &CovarianceMatrix<T>) {
        self.filter.estimate_covariance_mut().apply(|mat| {
            for (row, values) in covariance.iter().enumerate() {
                for (column, value) in values.iter().enumerate() {
                    mat.set_at(row, column, *value);
                }
            }
        });
    }
}

fn ensure_finite_state<T>(state: &StateEstimate<T>) -> Result<(), FilterError>
where
    T: FilterScalar,
{
    if state.into_array().into_iter().all(IsFinite::is_finite) {
        Ok(())
    } else {
        Err(FilterError::NonFinite("state"))
    }
}

fn ensure_finite_covariance<T>(covariance: &CovarianceMatrix<T>) -> Result<(), FilterError>
where
    T: FilterScalar,
{
    if covariance.iter().flatten().all(|value| IsFinite::is_finite(*value)) {
        Ok(())
    } else {
        Err(FilterError::NonFinite("covariance"))
    }
}

impl<T, C> StateEstimator<T, C>
where
    T: FilterScalar,
{
    /// Builds the Kalman filter used for prediction.
    fn build_filter(
        config: &FilterConfig<T>,
        state: &StateEstimate<T>,
        covariance: &CovarianceMatrix<T>,
    ) -> OwnedKalmanFilter<T> {
        let zero = T::default();

        // State vector.
        let mut state_vec =
            StateVectorBuffer::<STATES, T, _>::new(MatrixData::new_array::<STATES, 1, STATES, T>(
                [zero; STATES],
            ));
        state_vec.set_row(0, state.x);
        state_vec.set_row(1, state.y);
        state_vec.set_row(2, state.z);
        state_vec.set_row(3, state.speed);

        // State transition matrix: constant position, decaying speed.
        let mut state_transition =
            StateTransitionMatrixMutBuffer::<STATES, T, _>::new(MatrixData::new_array::<
                STATES,
                STATES,
                { STATES * STATES },
                T,
            >(
                [zero; { STATES * STATES }]
            ));
        state_transition.make_identity();
        state_transition.apply(|mat| {
            mat.set_at(3, 3, config.speed_decay);
        });

        // Estimate covariance matrix.
        let mut estimate_covariance =
            EstimateCovarianceMatrixBuffer::<STATES, T, _>::new(MatrixData::new_array::<
                STATES,
                STATES,
                { STATES * STATES },
                T,
            >(
                [zero; { STATES * STATES }]
            ));
        estimate_covariance.apply(|mat| {
            for (row, values) in covariance.iter().enumerate() {
                for (column, value) in values.iter().enumerate() {
                    mat.set_at(row, column, *value);
                }
            }
        });

        // Process noise matrix.
        let mut process_noise = DirectProcessNoiseCovarianceMatrixMutBuffer::<STATES, T, _>::new(
            MatrixData::new_array::<STATES, STATES, { STATES * STATES }, T>(
                [zero; { STATES * STATES }],
            ),
        );
        let variances = config.process_sigma.variances();
        process_noise.apply(|mat| {
            for (index, variance) in variances.into_iter().enumerate() {
                mat.set_at(index, index, variance);
            }
        });

        // Predicted state vector.
        let mut predicted_state =
            PredictedStateEstimateVectorBuffer::<STATES, T, _>::new(MatrixData::new_array::<
                STATES,
                1,
                STATES,
                T,
            >([zero; STATES]));
        predicted_state.set_all(T::zero());

        // Temporary estimate covariance matrix.
        let temp_state_matrix =
            TemporaryStateMatrixBuffer::<STATES, T, _>::new(MatrixData::new_array::<
                STATES,
                STATES,
                { STATES * STATES },
                T,
            >(
                [zero; { STATES * STATES }]
            ));

        RegularKalmanBuilder::new::<STATES, T>(
            state_transition,
            state_vec,
            estimate_covariance,
            process_noise,
            predicted_state,
            temp_state_matrix,
        )
    }

    /// Builds the control input carrying the world-frame displacement into the position.
    fn build_control() -> OwnedControlInput<T> {
        let zero = T::default();

        // Control vector.
        let control_vector = ControlVectorBuffer::<CONTROLS, T, _>::new(MatrixData::new_array::<
            CONTROLS,
            1,
            CONTROLS,
            T,
        >([zero; CONTROLS]));

        // Control matrix: the displacement enters the position states only.
        let mut control_matrix =
            ControlMatrixMutBuffer::<STATES, CONTROLS, T, _>::new(MatrixData::new_array::<
                STATES,
                CONTROLS,
                { STATES * CONTROLS },
                T,
            >(
                [zero; STATES * CONTROLS]
            ));
        control_matrix.apply(|mat| {
            mat.set_at(0, 0, T::one());
            mat.set_at(1, 1, T::one());
            mat.set_at(2, 2, T::one());
        });

        // The displacement adds no uncertainty of its own.
        let process_noise = ControlProcessNoiseCovarianceMatrixMutBuffer::<CONTROLS, T, _>::new(
            MatrixData::new_array::<CONTROLS, CONTROLS, { CONTROLS * CONTROLS }, T>(
                [zero; CONTROLS * CONTROLS],
            ),
        );

        // Temporary matrix.
        let temp = TemporaryBQMatrixBuffer::<STATES, CONTROLS, T, _>::new(MatrixData::new_array::<
            STATES,
            CONTROLS,
            { STATES * CONTROLS },
            T,
        >(
            [zero; STATES * CONTROLS],
        ));

        ControlBuilder::new::<STATES, CONTROLS, T>(
            control_matrix,
            control_vector,
            process_noise,
            temp,
        )
    }
}

#[cfg(test)]
#[cfg(feature = "std")]
mod tests {
    use super::*;
    use crate::clock::SimulatedClock;
    use crate::config::{AxisBounds, WorkspaceBounds};
    use core::f64::consts::PI;

    type Estimator = StateEstimator<f64, SimulatedClock<f64>>;

    fn estimator() -> Estimator {
        StateEstimator::new(SimulatedClock::new(0.0), FilterConfig::default())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_initial_state() {
        let estimator = estimator();
        assert_eq!(estimator.raw_state(), StateEstimate::new(1.0, 1.0, 0.5, 0.0));
        let covariance = estimator.covariance();
        assert_close(covariance[0][0], 0.04);
        assert_close(covariance[1][1], 0.04);
        assert_close(covariance[2][2], 0.01);
        assert_close(covariance[3][3], 0.01);
        assert_eq!(covariance[0][1], 0.0);
        assert_eq!(estimator.dropout_count(), 0);
        assert!(estimator.last_measurement().is_empty());
    }

    #[test]
    fn test_stationary_predict_keeps_position() {
        let mut estimator = estimator();
        estimator.predict(&AngularRates::new(0.0, 0.0, 0.0));

        assert_eq!(estimator.raw_state(), StateEstimate::new(1.0, 1.0, 0.5, 0.0));

        // P = F×P₀×Fᵀ + Q
        let covariance = estimator.covariance();
        assert_close(covariance[0][0], 0.04 + 0.0025);
        assert_close(covariance[1][1], 0.04 + 0.0025);
        assert_close(covariance[2][2], 0.01 + 0.0009);
        assert_close(covariance[3][3], 0.98 * 0.98 * 0.01 + 0.0025);
        assert_eq!(covariance[0][3], 0.0);
    }

    #[test]
    fn test_predict_integrates_orientation() {
        let mut estimator = estimator();
        estimator.clock_mut().advance(0.5);
        estimator.predict(&AngularRates::new(0.2, 0.4, 0.1));
        assert_close(estimator.yaw(), -0.05);
        assert_close(estimator.pitch(), -0.2);
        assert_close(estimator.roll(), 0.1);
    }

    #[test]
    fn test_zero_time_step_uses_fallback() {
        let mut estimator = estimator();
        estimator.predict(&AngularRates::new(0.0, 0.0, 1.0));
        assert_close(estimator.yaw(), -0.02);
    }

    #[test]
    fn test_predict_moves_along_heading() {
        let mut estimator = estimator();
        estimator
            .set_state(StateEstimate::new(1.0, 1.0, 0.5, 0.5))
            .expect("state is finite");

        // Turn to a yaw of π/2 within one step.
        estimator.clock_mut().advance(0.1);
        estimator.predict(&AngularRates::new(0.0, 0.0, -5.0 * PI));

        let state = estimator.raw_state();
        assert_close(estimator.yaw(), PI / 2.0);
        assert_close(state.x, 1.0);
        assert_close(state.y, 1.05);
        assert_close(state.z, 0.5);
        assert_close(state.speed, 0.49);
    }

    #[test]
    fn test_update_with_tag_at_position() {
        let mut estimator = estimator();
        estimator.predict(&AngularRates::new(0.0, 0.0, 0.0));

        let tag = TagMeasurement::from_row(&[0.0, 1.0, 1.0, 0.5]).expect("row is complete");
        let report = estimator.update(&[tag]).expect("geometry is valid");

        assert_eq!(report.accepted_tags, 1);
        assert_eq!(report.rejected_tags, 0);
        assert_eq!(report.speed_measurement, 0.0);
        assert!(!report.reset_axes.any());
        assert_eq!(estimator.last_innovation(), &[0.0]);
        assert_eq!(estimator.last_measurement(), &[0.0]);
        assert_eq!(estimator.estimated_state(), StateEstimate::new(1.0, 1.0, 0.5, 0.0));
    }

    #[test]
    fn test_update_pulls_toward_tag() {
        let mut estimator = estimator();
        let tag = TagMeasurement::new(0.8, 1.0, 1.0, 1.5);
        estimator.update(&[tag]).expect("geometry is valid");

        let p22 = 0.01;
        let scale = (1.0_f64 + 1.0 + 2.25).sqrt() / 1.5;
        let s = p22 + 0.25 * scale;
        let k = -p22 / s;

        let state = estimator.raw_state();
        assert_close(state.x, 1.0);
        assert_close(state.y, 1.0);
        assert_close(state.z, 0.5 + k * -0.2);
        assert_close(estimator.last_innovation()[0], -0.2);

        let covariance = estimator.covariance();
        assert_close(covariance[2][2], (1.0 + k) * p22);
        assert_close(covariance[0][0], 0.04);
    }

    #[test]
    fn test_far_tags_are_rejected() {
        let mut estimator = estimator();
        let before = estimator.covariance();

        let tags = [
            TagMeasurement::new(5.0, 4.0, 4.0, 1.5),
            TagMeasurement::new(f64::NAN, 0.0, 0.0, 1.5),
        ];
        let report = estimator.update(&tags).expect("rejected tags are not checked");
        assert_eq!(report.accepted_tags, 0);
        assert_eq!(report.rejected_tags, 2);

        let state = estimator.raw_state();
        assert_eq!(state.position(), Vector3::new(1.0, 1.0, 0.5));

        let after = estimator.covariance();
        for row in 0..3 {
            assert_eq!(after[row], before[row]);
        }

        // The speed is still fused and its variance shrinks.
        assert_close(after[3][3], (1.0 - 0.01 / 0.26) * 0.01);
        assert_eq!(estimator.last_measurement().len(), 2);
    }

    #[test]
    fn test_mixed_batch_only_accepted_tags_correct() {
        let near = TagMeasurement::new(1.2, 1.0, 2.0, 1.4);
        let far = TagMeasurement::new(4.0, 4.0, 4.0, 1.5);

        let mut mixed = estimator();
        let report = mixed.update(&[near, far]).expect("geometry is valid");
        assert_eq!(report.accepted_tags, 1);
        assert_eq!(report.rejected_tags, 1);

        let mut single = estimator();
        single.update(&[near]).expect("geometry is valid");

        assert_eq!(mixed.raw_state(), single.raw_state());
        assert_eq!(mixed.covariance(), single.covariance());
        assert_eq!(mixed.last_measurement(), &[1.2, 4.0]);
    }

    #[test]
    fn test_tag_at_maximum_range_is_accepted() {
        let mut estimator = estimator();
        let before = estimator.raw_state();

        let tag = TagMeasurement::new(3.0, 1.0, 2.0, 1.4);
        let report = estimator.update(&[tag]).expect("geometry is valid");
        assert_eq!(report.accepted_tags, 1);
        assert_eq!(report.rejected_tags, 0);
        assert_ne!(estimator.raw_state().position(), before.position());
    }

    #[test]
    fn test_configured_max_tag_range() {
        let tag = TagMeasurement::new(0.8, 1.0, 1.0, 1.3);

        let config = FilterConfig::<f64>::default().with_max_tag_range(0.5);
        let mut estimator = StateEstimator::new(SimulatedClock::new(0.0), config);
        let report = estimator.update(&[tag]).expect("rejected tags are not checked");
        assert_eq!(report.accepted_tags, 0);
        assert_eq!(report.rejected_tags, 1);
        assert_eq!(estimator.raw_state().position(), Vector3::new(1.0, 1.0, 0.5));

        let mut estimator = self::estimator();
        let report = estimator.update(&[tag]).expect("geometry is valid");
        assert_eq!(report.accepted_tags, 1);
    }

    #[test]
    fn test_configured_workspace_bounds() {
        let bounds = WorkspaceBounds::new(
            AxisBounds::new(0.0, 2.0, 0.25),
            AxisBounds::new(0.0, 2.0, 0.75),
            AxisBounds::new(0.0, 1.0, 0.5),
        );
        let config = FilterConfig::<f64>::default().with_bounds(bounds);
        let mut estimator: Estimator = StateEstimator::new(SimulatedClock::new(0.0), config);
        let initial = estimator.covariance();

        // Inside the default workspace, outside the configured one.
        estimator
            .set_state(StateEstimate::new(2.5, 1.5, 0.5, 0.0))
            .expect("state is finite");
        estimator
            .set_covariance([[0.5; 4]; 4])
            .expect("covariance is finite");

        let report = estimator.update(&[]).expect("empty batches are valid");
        assert!(report.reset_axes.x);
        assert!(!report.reset_axes.y);
        assert!(!report.reset_axes.z);

        let state = estimator.raw_state();
        assert_eq!(state.x, 0.25);
        assert_eq!(state.y, 1.5);
        assert_eq!(estimator.covariance()[0], initial[0]);
        assert_eq!(estimator.covariance()[1], [0.5; 4]);

        let mut estimator = self::estimator();
        estimator
            .set_state(StateEstimate::new(2.5, 1.5, 0.5, 0.0))
            .expect("state is finite");
        let report = estimator.update(&[]).expect("empty batches are valid");
        assert!(!report.reset_axes.any());
        assert_eq!(estimator.raw_state().x, 2.5);
    }

    #[test]
    fn test_rejected_tag_at_zero_height_is_ignored() {
        let mut estimator = estimator();
        let tags = [TagMeasurement::new(3.5, 1.0, 1.0, 0.0)];
        assert!(estimator.update(&tags).is_ok());
    }

    #[test]
    fn test_zero_tag_height_is_degenerate() {
        let mut estimator = estimator();
        estimator.predict(&AngularRates::new(0.1, 0.0, 0.0));
        let state = estimator.raw_state();
        let covariance = estimator.covariance();

        let tags = [
            TagMeasurement::new(1.0, 1.0, 2.0, 1.5),
            TagMeasurement::new(1.0, 2.0, 1.0, 0.0),
        ];
        assert_eq!(
            estimator.update(&tags),
            Err(FilterError::DegenerateGeometry {
                tag: 1,
                cause: DegenerateCause::ZeroTagHeight
            })
        );
        assert_eq!(estimator.raw_state(), state);
        assert_eq!(estimator.covariance(), covariance);
        assert!(estimator.last_measurement().is_empty());
    }

    #[test]
    fn test_zero_innovation_variance_is_degenerate() {
        let mut config = FilterConfig::<f64>::default();
        config.range_sigma = 0.0;
        let mut estimator = StateEstimator::new(SimulatedClock::new(0.0), config);

        let tags = [TagMeasurement::new(0.0, 1.0, 1.0, 0.5)];
        assert_eq!(
            estimator.update(&tags),
            Err(FilterError::DegenerateGeometry {
                tag: 0,
                cause: DegenerateCause::ZeroInnovationVariance
            })
        );
    }

    #[test]
    fn test_too_many_tags() {
        let mut estimator = estimator();
        let tags = [TagMeasurement::new(1.0, 1.0, 1.0, 1.5); MAX_TAGS + 1];
        assert_eq!(
            estimator.update(&tags),
            Err(FilterError::TooManyTags {
                capacity: MAX_TAGS,
                found: MAX_TAGS + 1
            })
        );
        assert!(estimator.update(&tags[..MAX_TAGS]).is_ok());
    }

    #[test]
    fn test_out_of_bounds_axis_is_reset() {
        let mut estimator = estimator();
        let initial = estimator.covariance();
        estimator
            .set_state(StateEstimate::new(6.0, 1.0, 0.5, 0.0))
            .expect("state is finite");
        estimator
            .set_covariance([[0.5; 4]; 4])
            .expect("covariance is finite");

        let report = estimator.update(&[]).expect("empty batches are valid");
        assert!(report.reset_axes.x);
        assert!(!report.reset_axes.y);
        assert!(!report.reset_axes.z);

        assert_eq!(estimator.raw_state().x, 1.5);
        assert_eq!(estimator.covariance()[0], initial[0]);
    }

    #[test]
    fn test_reset_restores_initial_snapshot() {
        let mut estimator = estimator();
        let state = estimator.raw_state();
        let covariance = estimator.covariance();

        for _ in 0..5 {
            estimator.clock_mut().advance(0.02);
            estimator.predict(&AngularRates::new(0.1, -0.2, 0.3));
            estimator
                .update(&[TagMeasurement::new(1.2, 2.0, 1.0, 1.4)])
                .expect("geometry is valid");
        }
        assert_ne!(estimator.raw_state(), state);

        estimator.reset();
        assert_eq!(estimator.raw_state(), state);
        assert_eq!(estimator.covariance(), covariance);
    }

    #[test]
    fn test_dropouts_inflate_speed_until_update() {
        let mut estimator = estimator();
        estimator
            .set_state(StateEstimate::new(1.0, 1.0, 0.5, 0.5))
            .expect("state is finite");

        for _ in 0..8 {
            estimator.mark_no_measurement();
        }
        assert_close(estimator.raw_state().speed, 0.5 * 1.15_f64.powi(8));
        assert!(estimator.raw_state().speed > 1.0);
        assert_eq!(estimator.dropout_count(), 8);

        estimator.clock_mut().advance(0.1);
        estimator.update(&[]).expect("empty batches are valid");
        assert_eq!(estimator.raw_state().speed, 1.0);
        assert_eq!(estimator.dropout_count(), 7);
    }

    #[test]
    fn test_setters_reject_non_finite_values() {
        let mut estimator = estimator();
        assert_eq!(
            estimator.set_state(StateEstimate::new(f64::NAN, 1.0, 0.5, 0.0)),
            Err(FilterError::NonFinite("state"))
        );

        let mut covariance = estimator.covariance();
        covariance[2][1] = f64::INFINITY;
        assert_eq!(
            estimator.set_covariance(covariance),
            Err(FilterError::NonFinite("covariance"))
        );
        assert_eq!(estimator.raw_state(), StateEstimate::new(1.0, 1.0, 0.5, 0.0));
    }

    #[test]
    fn test_with_initial_state_and_covariance() {
        let mut covariance = [[0.0; 4]; 4];
        for (index, row) in covariance.iter_mut().enumerate() {
            row[index] = 1.0;
        }

        let estimator: Estimator = StateEstimator::with_initial(
            SimulatedClock::new(3.0),
            FilterConfig::default(),
            StateEstimate::new(2.0, 1.5, 0.25, 0.1),
            Some(covariance),
        )
        .expect("initial values are finite");

        assert_eq!(estimator.raw_state(), StateEstimate::new(2.0, 1.5, 0.25, 0.1));
        assert_eq!(estimator.covariance(), covariance);
        assert_eq!(estimator.config().initial_state.x, 2.0);
    }

    #[test]
    fn test_estimated_state_is_rounded() {
        let mut estimator = estimator();
        estimator
            .set_state(StateEstimate::new(1.23456, 0.0004, -0.0006, 0.1235))
            .expect("state is finite");
        let state = estimator.estimated_state();
        assert_eq!(state.x, 1.235);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, -0.001);
    }

    #[test]
    fn test_set_orientation() {
        let mut estimator = estimator();
        estimator.set_orientation(EulerAngles::from_yaw_pitch_roll(1.0, 0.5, -0.5));
        assert_eq!(estimator.orientation(), EulerAngles::new(-0.5, 0.5, 1.0));
        assert_eq!(estimator.yaw(), 1.0);
    }
}
