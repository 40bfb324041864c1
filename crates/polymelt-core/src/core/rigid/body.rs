use nalgebra::{Matrix3, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// One member of a rigid body, recorded relative to the body frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// Position offset from the body's center of mass.
    pub offset: Vector3<f64>,
    /// Type id of the original particle.
    pub type_id: usize,
    /// Charge of the original particle.
    pub charge: f64,
    /// Orientation of the original particle.
    pub orientation: UnitQuaternion<f64>,
    /// Diameter of the original particle.
    pub diameter: f64,
}

/// A reduced rigid composite body.
///
/// Invariants upheld by the reducer: `mass` equals the exact sum of the
/// constituent masses, and the mass-weighted constituent offsets sum to the
/// zero vector (within floating tolerance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// The rigid-group id this body was reduced from.
    pub group: i64,
    /// Type id of the reduced body particle (the array-head slot).
    pub type_id: usize,
    /// Aggregate mass of all constituents.
    pub mass: f64,
    /// Center-of-mass position.
    pub center_of_mass: Point3<f64>,
    /// Moment-of-inertia tensor about the center of mass.
    pub moment_inertia: Matrix3<f64>,
    /// Constituent particles in their original array order.
    pub constituents: Vec<Constituent>,
}
