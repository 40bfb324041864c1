use nalgebra::{Matrix3, Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Rigid-group id marking a particle that belongs to no rigid body.
pub const NOT_RIGID: i64 = -1;

/// A single particle in a configuration.
///
/// The `type_id` indexes into the owning configuration's type-name registry.
/// `rigid_group` partitions particles into the non-rigid set (`NOT_RIGID`) and
/// N distinct rigid groups; after reduction the first N slots of the particle
/// array hold the reduced body records and their `rigid_group` equals their own
/// group id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Index into the configuration's type-name registry.
    pub type_id: usize,
    /// Particle mass; must be positive for anything that joins a rigid group.
    pub mass: f64,
    /// Partial charge in reduced units.
    pub charge: f64,
    /// Position inside the simulation box.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub orientation: UnitQuaternion<f64>,
    /// Diameter, carried through to constituent templates.
    pub diameter: f64,
    /// Moment-of-inertia tensor about the particle's own frame.
    ///
    /// Zero for point particles; filled in for reduced rigid-body slots.
    pub moment_inertia: Matrix3<f64>,
    /// Rigid-group id, or [`NOT_RIGID`].
    pub rigid_group: i64,
}

impl Particle {
    /// Creates a point particle of the given type, mass, and position.
    ///
    /// Charge defaults to zero, orientation to identity, diameter to zero, and
    /// the particle belongs to no rigid group.
    pub fn new(type_id: usize, mass: f64, position: Point3<f64>) -> Self {
        Self {
            type_id,
            mass,
            charge: 0.0,
            position,
            orientation: UnitQuaternion::identity(),
            diameter: 0.0,
            moment_inertia: Matrix3::zeros(),
            rigid_group: NOT_RIGID,
        }
    }

    /// Returns the same particle assigned to `group`.
    pub fn with_rigid_group(mut self, group: i64) -> Self {
        self.rigid_group = group;
        self
    }

    /// Returns the same particle with the given charge.
    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// Returns the same particle with the given diameter.
    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_particle_has_expected_defaults() {
        let p = Particle::new(2, 12.011, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p.type_id, 2);
        assert_eq!(p.mass, 12.011);
        assert_eq!(p.charge, 0.0);
        assert_eq!(p.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p.orientation, UnitQuaternion::identity());
        assert_eq!(p.diameter, 0.0);
        assert_eq!(p.moment_inertia, Matrix3::zeros());
        assert_eq!(p.rigid_group, NOT_RIGID);
    }

    #[test]
    fn builder_helpers_set_fields() {
        let p = Particle::new(0, 1.0, Point3::origin())
            .with_rigid_group(3)
            .with_charge(-0.5)
            .with_diameter(1.2);
        assert_eq!(p.rigid_group, 3);
        assert_eq!(p.charge, -0.5);
        assert_eq!(p.diameter, 1.2);
    }
}
