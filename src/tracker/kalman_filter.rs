//! Constant-velocity Kalman filter over a box's XYAH state.
//!
//! State: `[cx, cy, a, h, vx, vy, va, vh]`, measurement: `[cx, cy, a, h]`.
//! Noise scales with box height so large and small faces behave alike.

use nalgebra::{SMatrix, SVector};

use crate::tracker::BoundingBox;

type State = SVector<f64, 8>;
type Covariance = SMatrix<f64, 8, 8>;
type Measurement = SVector<f64, 4>;

const STD_WEIGHT_POSITION: f64 = 1.0 / 20.0;
const STD_WEIGHT_VELOCITY: f64 = 1.0 / 160.0;

#[derive(Debug, Clone)]
pub(crate) struct KalmanFilter {
    mean: State,
    covariance: Covariance,
    motion: Covariance,
    update: SMatrix<f64, 4, 8>,
}

impl KalmanFilter {
    /// Initialise the filter at `bbox` with zero velocity.
    pub(crate) fn initiate(bbox: &BoundingBox) -> Self {
        let z = measurement(bbox);
        let mut mean = State::zeros();
        mean.fixed_rows_mut::<4>(0).copy_from(&z);

        let h = z[3];
        let std = [
            2.0 * STD_WEIGHT_POSITION * h,
            2.0 * STD_WEIGHT_POSITION * h,
            1e-2,
            2.0 * STD_WEIGHT_POSITION * h,
            10.0 * STD_WEIGHT_VELOCITY * h,
            10.0 * STD_WEIGHT_VELOCITY * h,
            1e-5,
            10.0 * STD_WEIGHT_VELOCITY * h,
        ];

        let mut motion = Covariance::identity();
        for i in 0..4 {
            motion[(i, i + 4)] = 1.0;
        }
        let mut update = SMatrix::<f64, 4, 8>::zeros();
        for i in 0..4 {
            update[(i, i)] = 1.0;
        }

        Self {
            mean,
            covariance: diagonal(std),
            motion,
            update,
        }
    }

    /// Advance one frame along the current velocity.
    pub(crate) fn predict(&mut self) {
        let h = self.mean[3];
        let std = [
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_POSITION * h,
            1e-2,
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_VELOCITY * h,
            STD_WEIGHT_VELOCITY * h,
            1e-5,
            STD_WEIGHT_VELOCITY * h,
        ];
        self.mean = self.motion * self.mean;
        self.covariance = self.motion * self.covariance * self.motion.transpose() + diagonal(std);
    }

    /// Fold in a measured box. A singular innovation covariance leaves the
    /// state untouched.
    pub(crate) fn correct(&mut self, bbox: &BoundingBox) {
        let h = self.mean[3];
        let std = [
            STD_WEIGHT_POSITION * h,
            STD_WEIGHT_POSITION * h,
            1e-1,
            STD_WEIGHT_POSITION * h,
        ];
        let mut innovation_cov = SMatrix::<f64, 4, 4>::zeros();
        for (i, s) in std.iter().enumerate() {
            innovation_cov[(i, i)] = s * s;
        }

        let projected_mean = self.update * self.mean;
        let projected_cov =
            self.update * self.covariance * self.update.transpose() + innovation_cov;
        let Some(s_inv) = projected_cov.try_inverse() else {
            return;
        };

        let gain = self.covariance * self.update.transpose() * s_inv;
        self.mean += gain * (measurement(bbox) - projected_mean);
        self.covariance -= gain * projected_cov * gain.transpose();
    }

    /// Predicted centre `(cx, cy)`.
    pub(crate) fn center(&self) -> (f32, f32) {
        (self.mean[0] as f32, self.mean[1] as f32)
    }
}

fn measurement(bbox: &BoundingBox) -> Measurement {
    let xyah = bbox.to_xyah();
    Measurement::new(
        xyah[0] as f64,
        xyah[1] as f64,
        xyah[2] as f64,
        xyah[3] as f64,
    )
}

fn diagonal(std: [f64; 8]) -> Covariance {
    Covariance::from_diagonal(&State::from_column_slice(&std.map(|s| s * s)))
}
