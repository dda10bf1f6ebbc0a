use crate::bounds::ResetAxes;
use minikalman::buffers::types::*;
use minikalman::prelude::*;
use minikalman::regular::{Control, RegularKalman};

pub const STATES: usize = 4; // x, y, z position, forward speed
pub const CONTROLS: usize = 3; // x, y, z world-frame displacement

/// The largest number of tags a single update accepts.
pub const MAX_TAGS: usize = 32;

/// A 4×4 matrix in row-major order, e.g. the estimate covariance.
pub type CovarianceMatrix<T> = [[T; STATES]; STATES];

// A Kalman filter of four states, using owned buffers.
pub type OwnedKalmanFilter<T> = RegularKalman<
    STATES,
    T,
    StateTransitionMatrixMutBuffer<
        STATES,
        T,
        MatrixDataArray<STATES, STATES, { STATES * STATES }, T>,
    >,
    StateVectorBuffer<STATES, T, MatrixDataArray<STATES, 1, STATES, T>>,
    EstimateCovarianceMatrixBuffer<
        STATES,
        T,
        MatrixDataArray<STATES, STATES, { STATES * STATES }, T>,
    >,
    DirectProcessNoiseCovarianceMatrixMutBuffer<
        STATES,
        T,
        MatrixDataArray<STATES, STATES, { STATES * STATES }, T>,
    >,
    PredictedStateEstimateVectorBuffer<STATES, T, MatrixDataArray<STATES, 1, STATES, T>>,
    TemporaryStateMatrixBuffer<STATES, T, MatrixDataArray<STATES, STATES, { STATES * STATES }, T>>,
>;

// The rotated forward displacement, applied as a control input.
pub type OwnedControlInput<T> = Control<
    STATES,
    CONTROLS,
    T,
    ControlMatrixMutBuffer<
        STATES,
        CONTROLS,
        T,
        MatrixDataArray<STATES, CONTROLS, { STATES * CONTROLS }, T>,
    >,
    ControlVectorBuffer<CONTROLS, T, MatrixDataArray<CONTROLS, 1, CONTROLS, T>>,
    ControlProcessNoiseCovarianceMatrixMutBuffer<
        CONTROLS,
        T,
        MatrixDataArray<CONTROLS, CONTROLS, { CONTROLS * CONTROLS }, T>,
    >,
    TemporaryBQMatrixBuffer<
        STATES,
        CONTROLS,
        T,
        MatrixDataArray<STATES, CONTROLS, { STATES * CONTROLS }, T>,
    >,
>;

/// A summary of a successful update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateReport<T> {
    /// The number of tags within the maximum range.
    pub accepted_tags: usize,
    /// The number of tags ignored for being out of range.
    pub rejected_tags: usize,
    /// The speed pseudo-measurement that was fused.
    pub speed_measurement: T,
    /// The position axes that were reset for leaving the workspace.
    pub reset_axes: ResetAxes,
}
