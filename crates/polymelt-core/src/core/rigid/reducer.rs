use super::body::{Constituent, RigidBody};
use crate::core::models::configuration::ParticleConfiguration;
use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ReductionError {
    #[error("rigid group {group} has non-positive total mass ({mass}); center of mass is undefined")]
    ZeroMassGroup { group: i64, mass: f64 },
}

/// Reduces every rigid group of `config` into a composite body.
///
/// The i-th distinct group (ascending id order) is written into the i-th
/// particle slot of the returned configuration: that slot receives the group's
/// center of mass, aggregate mass, inertia tensor, and group id. Constituent
/// particles are assumed to already live past the N body slots; the reducer
/// records them in a per-body template but never renumbers the array.
///
/// Returns the updated configuration and one [`RigidBody`] per group. A
/// configuration with no rigid groups is returned unchanged alongside an empty
/// body list.
///
/// # Errors
///
/// [`ReductionError::ZeroMassGroup`] if any group's total mass is not positive.
pub fn reduce(
    config: &ParticleConfiguration,
) -> Result<(ParticleConfiguration, Vec<RigidBody>), ReductionError> {
    let groups = config.rigid_groups();
    if groups.is_empty() {
        return Ok((config.clone(), Vec::new()));
    }

    let mut reduced = config.clone();
    let mut bodies = Vec::with_capacity(groups.len());

    for (slot, &group) in groups.iter().enumerate() {
        let members = config.group_members(group);
        let total_mass: f64 = members.iter().map(|&i| config.particles[i].mass).sum();
        if total_mass <= 0.0 {
            return Err(ReductionError::ZeroMassGroup {
                group,
                mass: total_mass,
            });
        }

        let weighted: Vector3<f64> = members
            .iter()
            .map(|&i| config.particles[i].position.coords * config.particles[i].mass)
            .sum();
        let com = Point3::from(weighted / total_mass);
        let inertia = moment_of_inertia(config, &members, &com);

        let constituents: Vec<Constituent> = members
            .iter()
            .map(|&i| {
                let p = &config.particles[i];
                Constituent {
                    offset: p.position - com,
                    type_id: p.type_id,
                    charge: p.charge,
                    orientation: p.orientation,
                    diameter: p.diameter,
                }
            })
            .collect();

        let body_slot = &mut reduced.particles[slot];
        body_slot.position = com;
        body_slot.mass = total_mass;
        body_slot.moment_inertia = inertia;
        body_slot.rigid_group = group;

        debug!(
            group,
            slot,
            constituents = constituents.len(),
            mass = total_mass,
            "reduced rigid group"
        );

        bodies.push(RigidBody {
            group,
            type_id: body_slot.type_id,
            mass: total_mass,
            center_of_mass: com,
            moment_inertia: inertia,
            constituents,
        });
    }

    Ok((reduced, bodies))
}

/// Moment-of-inertia tensor of `members` about `center`.
///
/// Standard point-mass form: I = sum_k m_k (|d|^2 E - d d^T) with d the
/// displacement from `center`.
fn moment_of_inertia(
    config: &ParticleConfiguration,
    members: &[usize],
    center: &Point3<f64>,
) -> Matrix3<f64> {
    let mut tensor = Matrix3::zeros();
    for &i in members {
        let p = &config.particles[i];
        let d = p.position - center;
        tensor += p.mass * (d.norm_squared() * Matrix3::identity() - d * d.transpose());
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bounds::SimBox;
    use crate::core::models::particle::Particle;
    use nalgebra::Point3;

    const TOL: f64 = 1e-12;

    /// Two body slots up front, then two dimers laid out in the tail.
    fn dimer_config() -> ParticleConfiguration {
        let mut c = ParticleConfiguration::new(SimBox::orthorhombic(20.0, 20.0, 20.0));
        let rigid_type = c.type_id("R");
        let heavy = c.type_id("C");
        let light = c.type_id("H");

        for _ in 0..2 {
            c.particles
                .push(Particle::new(rigid_type, 0.0, Point3::origin()));
        }
        // Group 0: masses 3 and 1 on the x axis.
        c.particles.push(
            Particle::new(heavy, 3.0, Point3::new(0.0, 0.0, 0.0))
                .with_rigid_group(0)
                .with_charge(-0.2),
        );
        c.particles.push(
            Particle::new(light, 1.0, Point3::new(4.0, 0.0, 0.0))
                .with_rigid_group(0)
                .with_charge(0.2),
        );
        // Group 1: equal masses straddling y = 5.
        c.particles
            .push(Particle::new(heavy, 2.0, Point3::new(1.0, 4.0, 1.0)).with_rigid_group(1));
        c.particles
            .push(Particle::new(heavy, 2.0, Point3::new(1.0, 6.0, 1.0)).with_rigid_group(1));
        c
    }

    #[test]
    fn reduce_without_rigid_groups_is_a_noop() {
        let mut c = ParticleConfiguration::new(SimBox::orthorhombic(5.0, 5.0, 5.0));
        let t = c.type_id("A");
        c.particles.push(Particle::new(t, 1.0, Point3::origin()));

        let (out, bodies) = reduce(&c).unwrap();
        assert_eq!(out, c);
        assert!(bodies.is_empty());
    }

    #[test]
    fn body_mass_is_exact_sum_of_constituents() {
        let (_, bodies) = reduce(&dimer_config()).unwrap();
        assert_eq!(bodies[0].mass, 4.0);
        assert_eq!(bodies[1].mass, 4.0);
    }

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let (_, bodies) = reduce(&dimer_config()).unwrap();
        // Group 0: (3*0 + 1*4) / 4 = 1 along x.
        assert!((bodies[0].center_of_mass - Point3::new(1.0, 0.0, 0.0)).norm() < TOL);
        // Group 1: midpoint.
        assert!((bodies[1].center_of_mass - Point3::new(1.0, 5.0, 1.0)).norm() < TOL);
    }

    #[test]
    fn mass_weighted_offsets_sum_to_zero() {
        let c = dimer_config();
        let (_, bodies) = reduce(&c).unwrap();
        for (body, members) in bodies.iter().zip([c.group_members(0), c.group_members(1)]) {
            let sum: Vector3<f64> = body
                .constituents
                .iter()
                .zip(&members)
                .map(|(constituent, &i)| constituent.offset * c.particles[i].mass)
                .sum();
            assert!(sum.norm() < TOL, "group {} offset sum {:?}", body.group, sum);
        }
    }

    #[test]
    fn inertia_tensor_for_collinear_dimer() {
        let (_, bodies) = reduce(&dimer_config()).unwrap();
        // Group 1: two 2.0 masses at +/-1 along y about the COM.
        let i = &bodies[1].moment_inertia;
        assert!((i[(1, 1)] - 0.0).abs() < TOL);
        assert!((i[(0, 0)] - 4.0).abs() < TOL);
        assert!((i[(2, 2)] - 4.0).abs() < TOL);
        assert!(i[(0, 1)].abs() < TOL && i[(0, 2)].abs() < TOL && i[(1, 2)].abs() < TOL);
    }

    #[test]
    fn body_slots_receive_com_mass_and_tensor() {
        let (reduced, bodies) = reduce(&dimer_config()).unwrap();
        for (slot, body) in bodies.iter().enumerate() {
            let p = &reduced.particles[slot];
            assert_eq!(p.position, body.center_of_mass);
            assert_eq!(p.mass, body.mass);
            assert_eq!(p.moment_inertia, body.moment_inertia);
            assert_eq!(p.rigid_group, body.group);
        }
    }

    #[test]
    fn constituent_template_records_original_attributes() {
        let c = dimer_config();
        let (_, bodies) = reduce(&c).unwrap();
        let heavy = 1;
        let light = 2;
        assert_eq!(bodies[0].constituents.len(), 2);
        assert_eq!(bodies[0].constituents[0].type_id, heavy);
        assert_eq!(bodies[0].constituents[1].type_id, light);
        assert_eq!(bodies[0].constituents[0].charge, -0.2);
        assert_eq!(bodies[0].constituents[1].charge, 0.2);
    }

    #[test]
    fn zero_mass_group_is_rejected() {
        let mut c = ParticleConfiguration::new(SimBox::orthorhombic(5.0, 5.0, 5.0));
        let t = c.type_id("R");
        c.particles.push(Particle::new(t, 0.0, Point3::origin()));
        c.particles
            .push(Particle::new(t, 0.0, Point3::new(1.0, 0.0, 0.0)).with_rigid_group(0));

        let err = reduce(&c).unwrap_err();
        assert_eq!(
            err,
            ReductionError::ZeroMassGroup {
                group: 0,
                mass: 0.0
            }
        );
    }
}
