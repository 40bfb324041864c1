use super::bounds::SimBox;
use super::particle::{NOT_RIGID, Particle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An ordered particle configuration with its type registry and box.
///
/// Particle order is semantic: when the configuration carries rigid groups, the
/// first N slots are reserved for the N reduced body records and every
/// constituent lives in the tail past those slots. The reducer relies on that
/// layout and never renumbers (see [`crate::core::rigid::reducer`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfiguration {
    /// Registry of type names; particles refer to these by index.
    pub types: Vec<String>,
    /// The ordered particle array.
    pub particles: Vec<Particle>,
    /// The simulation box the particles live in.
    pub bounds: SimBox,
}

impl ParticleConfiguration {
    /// Creates an empty configuration inside `bounds`.
    pub fn new(bounds: SimBox) -> Self {
        Self {
            types: Vec::new(),
            particles: Vec::new(),
            bounds,
        }
    }

    /// Returns the id of `name` in the type registry, interning it if absent.
    pub fn type_id(&mut self, name: &str) -> usize {
        if let Some(idx) = self.types.iter().position(|t| t == name) {
            idx
        } else {
            self.types.push(name.to_string());
            self.types.len() - 1
        }
    }

    /// Returns the type name for `type_id`, if registered.
    pub fn type_name(&self, type_id: usize) -> Option<&str> {
        self.types.get(type_id).map(String::as_str)
    }

    /// Returns the distinct non-negative rigid-group ids, in ascending order.
    pub fn rigid_groups(&self) -> Vec<i64> {
        let groups: BTreeSet<i64> = self
            .particles
            .iter()
            .map(|p| p.rigid_group)
            .filter(|&g| g != NOT_RIGID)
            .collect();
        groups.into_iter().collect()
    }

    /// Returns the indices of the constituents of `group`, in array order.
    pub fn group_members(&self, group: i64) -> Vec<usize> {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.rigid_group == group)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn config() -> ParticleConfiguration {
        ParticleConfiguration::new(SimBox::orthorhombic(10.0, 10.0, 10.0))
    }

    #[test]
    fn type_id_interns_each_name_once() {
        let mut c = config();
        let a = c.type_id("CA");
        let b = c.type_id("CB");
        assert_eq!(c.type_id("CA"), a);
        assert_ne!(a, b);
        assert_eq!(c.types, vec!["CA".to_string(), "CB".to_string()]);
    }

    #[test]
    fn type_name_round_trips() {
        let mut c = config();
        let id = c.type_id("SS");
        assert_eq!(c.type_name(id), Some("SS"));
        assert_eq!(c.type_name(99), None);
    }

    #[test]
    fn rigid_groups_excludes_not_rigid_and_deduplicates() {
        let mut c = config();
        let t = c.type_id("A");
        for group in [NOT_RIGID, 1, 0, 1, NOT_RIGID, 0] {
            c.particles
                .push(Particle::new(t, 1.0, Point3::origin()).with_rigid_group(group));
        }
        assert_eq!(c.rigid_groups(), vec![0, 1]);
    }

    #[test]
    fn rigid_groups_empty_when_no_rigid_particles() {
        let mut c = config();
        let t = c.type_id("A");
        c.particles.push(Particle::new(t, 1.0, Point3::origin()));
        assert!(c.rigid_groups().is_empty());
    }

    #[test]
    fn group_members_preserve_array_order() {
        let mut c = config();
        let t = c.type_id("A");
        for group in [0, 1, 0, NOT_RIGID, 0] {
            c.particles
                .push(Particle::new(t, 1.0, Point3::origin()).with_rigid_group(group));
        }
        assert_eq!(c.group_members(0), vec![0, 2, 4]);
        assert_eq!(c.group_members(1), vec![1]);
        assert!(c.group_members(7).is_empty());
    }
}
