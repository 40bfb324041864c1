use super::error::EngineError;
use super::traits::MdEngine;
use crate::core::models::bounds::{Axis, SimBox};
use nalgebra::{Point3, Vector3};
use tracing::debug;

const WALL_EPSILON: f64 = 1.0;
const WALL_SIGMA: f64 = 1.0;
const WALL_R_CUT: f64 = 2.5;
const WALL_R_EXTRAP: f64 = 0.0;

/// A planar half-space potential: an origin point and an outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneWall {
    pub origin: Point3<f64>,
    pub normal: Vector3<f64>,
}

/// Two parallel confinement planes plus their shared interaction constants.
///
/// A pair is immutable once built: geometry changes always produce a fresh
/// pair through [`WallPotentialManager::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct WallPair {
    pub walls: [PlaneWall; 2],
    pub epsilon: f64,
    pub sigma: f64,
    pub r_cut: f64,
    pub r_extrap: f64,
}

/// Builds and refreshes the wall pair normal to a fixed box axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPotentialManager {
    axis: Axis,
}

impl WallPotentialManager {
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Builds the wall pair for the current box extents.
    ///
    /// The first wall sits at +extent/2 along the axis with its normal pointing
    /// back into the box; the second mirrors it on the opposite face.
    pub fn build(&self, bounds: &SimBox) -> WallPair {
        let unit = self.axis.unit_vector();
        let origin = unit * (bounds.length(self.axis) / 2.0);
        WallPair {
            walls: [
                PlaneWall {
                    origin: Point3::from(origin),
                    normal: -unit,
                },
                PlaneWall {
                    origin: Point3::from(-origin),
                    normal: unit,
                },
            ],
            epsilon: WALL_EPSILON,
            sigma: WALL_SIGMA,
            r_cut: WALL_R_CUT,
            r_extrap: WALL_R_EXTRAP,
        }
    }

    /// Detaches the stale pair, rebuilds from the engine's current box, and
    /// attaches the fresh pair.
    ///
    /// The swap happens within one single-threaded call, so no engine run can
    /// observe a zero- or duplicate-wall force list.
    pub fn refresh<E: MdEngine>(&self, engine: &mut E) -> Result<(), EngineError> {
        engine.detach_walls()?;
        let pair = self.build(&engine.bounds());
        debug!(axis = %self.axis, origin = ?pair.walls[0].origin, "rebuilt wall pair");
        engine.attach_walls(pair)
    }
}
