use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three Cartesian box axes.
///
/// Used to orient wall potentials and to select the tensile-test direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Returns the unit vector along this axis.
    pub fn unit_vector(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Returns the component index (0, 1, or 2) of this axis.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(()),
        }
    }
}

/// A triclinic simulation box.
///
/// Holds the three edge lengths and the tilt factors. Orthorhombic boxes keep
/// all tilt factors at zero, which is the common case for the protocols in this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimBox {
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
    pub xy: f64,
    pub xz: f64,
    pub yz: f64,
}

impl SimBox {
    /// Creates an orthorhombic box with the given edge lengths.
    pub fn orthorhombic(lx: f64, ly: f64, lz: f64) -> Self {
        Self {
            lx,
            ly,
            lz,
            xy: 0.0,
            xz: 0.0,
            yz: 0.0,
        }
    }

    /// Returns the edge length along `axis`.
    pub fn length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.lx,
            Axis::Y => self.ly,
            Axis::Z => self.lz,
        }
    }

    /// Sets the edge length along `axis`.
    pub fn set_length(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.lx = value,
            Axis::Y => self.ly = value,
            Axis::Z => self.lz = value,
        }
    }

    /// Returns the three edge lengths as a vector.
    pub fn lengths(&self) -> Vector3<f64> {
        Vector3::new(self.lx, self.ly, self.lz)
    }

    pub fn volume(&self) -> f64 {
        self.lx * self.ly * self.lz
    }

    /// Component-wise approximate equality over lengths and tilts.
    pub fn approx_eq(&self, other: &SimBox, tolerance: f64) -> bool {
        (self.lx - other.lx).abs() <= tolerance
            && (self.ly - other.ly).abs() <= tolerance
            && (self.lz - other.lz).abs() <= tolerance
            && (self.xy - other.xy).abs() <= tolerance
            && (self.xz - other.xz).abs() <= tolerance
            && (self.yz - other.yz).abs() <= tolerance
    }

    /// Linear interpolation between two boxes at fraction `f` in [0, 1].
    ///
    /// Used by the box-resize schedule during shrink and tensile runs.
    pub fn lerp(&self, target: &SimBox, f: f64) -> SimBox {
        let f = f.clamp(0.0, 1.0);
        SimBox {
            lx: self.lx + (target.lx - self.lx) * f,
            ly: self.ly + (target.ly - self.ly) * f,
            lz: self.lz + (target.lz - self.lz) * f,
            xy: self.xy + (target.xy - self.xy) * f,
            xz: self.xz + (target.xz - self.xz) * f,
            yz: self.yz + (target.yz - self.yz) * f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_accessors_match_axis() {
        let b = SimBox::orthorhombic(2.0, 4.0, 8.0);
        assert_eq!(b.length(Axis::X), 2.0);
        assert_eq!(b.length(Axis::Y), 4.0);
        assert_eq!(b.length(Axis::Z), 8.0);
    }

    #[test]
    fn set_length_updates_only_one_axis() {
        let mut b = SimBox::orthorhombic(2.0, 4.0, 8.0);
        b.set_length(Axis::Y, 5.0);
        assert_eq!(b.lx, 2.0);
        assert_eq!(b.ly, 5.0);
        assert_eq!(b.lz, 8.0);
    }

    #[test]
    fn lerp_endpoints_recover_initial_and_target() {
        let a = SimBox::orthorhombic(10.0, 10.0, 10.0);
        let t = SimBox::orthorhombic(4.0, 4.0, 4.0);
        assert!(a.lerp(&t, 0.0).approx_eq(&a, 1e-12));
        assert!(a.lerp(&t, 1.0).approx_eq(&t, 1e-12));
    }

    #[test]
    fn lerp_midpoint_is_halfway() {
        let a = SimBox::orthorhombic(10.0, 8.0, 6.0);
        let t = SimBox::orthorhombic(4.0, 4.0, 4.0);
        let mid = a.lerp(&t, 0.5);
        assert!((mid.lx - 7.0).abs() < 1e-12);
        assert!((mid.ly - 6.0).abs() < 1e-12);
        assert!((mid.lz - 5.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_clamps_fraction_outside_unit_interval() {
        let a = SimBox::orthorhombic(10.0, 10.0, 10.0);
        let t = SimBox::orthorhombic(4.0, 4.0, 4.0);
        assert!(a.lerp(&t, 1.5).approx_eq(&t, 1e-12));
        assert!(a.lerp(&t, -0.5).approx_eq(&a, 1e-12));
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        let a = SimBox::orthorhombic(10.0, 10.0, 10.0);
        let mut b = a;
        b.lx += 1e-9;
        assert!(a.approx_eq(&b, 1e-6));
        assert!(!a.approx_eq(&b, 1e-12));
    }

    #[test]
    fn axis_unit_vectors_are_cartesian() {
        assert_eq!(Axis::X.unit_vector(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(Axis::Y.unit_vector(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(Axis::Z.unit_vector(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn axis_parses_case_insensitively() {
        assert_eq!(Axis::from_str("x"), Ok(Axis::X));
        assert_eq!(Axis::from_str("Y"), Ok(Axis::Y));
        assert_eq!(Axis::from_str("z"), Ok(Axis::Z));
        assert_eq!(Axis::from_str("w"), Err(()));
    }
}
