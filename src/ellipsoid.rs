#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reference ellipsoid of revolution that a [`Datum`](crate::Datum) is defined on.
///
/// Only the shape of the ellipsoid is captured here; where the ellipsoid sits relative to the
/// earth is what distinguishes one datum from another, and moving between datums takes a
/// [`HelmertTransform`](crate::HelmertTransform).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ellipsoid {
    semi_major_axis: f64,
    semi_minor_axis: f64,
    eccentricity_sq: f64,
}

impl Ellipsoid {
    /// Constructs an ellipsoid from its equatorial (`a`) and polar (`b`) radii in meters.
    #[must_use]
    pub const fn from_axes(semi_major_axis: f64, semi_minor_axis: f64) -> Self {
        // e^2 = (a^2 - b^2) / a^2
        let a2 = semi_major_axis * semi_major_axis;
        let b2 = semi_minor_axis * semi_minor_axis;
        Self {
            semi_major_axis,
            semi_minor_axis,
            eccentricity_sq: (a2 - b2) / a2,
        }
    }

    /// Constructs an ellipsoid from its equatorial radius in meters and its inverse flattening
    /// (`1/f`).
    #[must_use]
    pub const fn from_inverse_flattening(semi_major_axis: f64, inverse_flattening: f64) -> Self {
        let flattening = 1.0 / inverse_flattening;
        // b/a = 1 - f
        // e^2 = 2f - f^2, which is what from_axes arrives at too, modulo rounding
        Self {
            semi_major_axis,
            semi_minor_axis: semi_major_axis * (1.0 - flattening),
            eccentricity_sq: 2.0 * flattening - flattening * flattening,
        }
    }

    /// Equatorial radius in meters.
    #[doc(alias = "a")]
    #[doc(alias = "equatorial radius")]
    #[must_use]
    pub const fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Polar radius in meters.
    #[doc(alias = "b")]
    #[doc(alias = "polar radius")]
    #[must_use]
    pub const fn semi_minor_axis(&self) -> f64 {
        self.semi_minor_axis
    }

    /// First eccentricity squared.
    #[doc(alias = "e^2")]
    #[must_use]
    pub const fn eccentricity_sq(&self) -> f64 {
        self.eccentricity_sq
    }

    /// The "third flattening" `(a - b) / (a + b)`, which the meridional arc series is expanded in.
    #[doc(alias = "n")]
    #[must_use]
    pub fn third_flattening(&self) -> f64 {
        (self.semi_major_axis - self.semi_minor_axis) / (self.semi_major_axis + self.semi_minor_axis)
    }

    /// Radius of curvature in the prime vertical at the given latitude (in radians).
    ///
    /// See <https://en.wikipedia.org/wiki/Earth_radius#Prime_vertical>.
    #[doc(alias = "nu")]
    #[doc(alias = "v")]
    #[must_use]
    pub fn prime_vertical_radius(&self, latitude: f64) -> f64 {
        self.semi_major_axis / (1. - self.eccentricity_sq * latitude.sin().powi(2)).sqrt()
    }
}

/// The ellipsoid underlying the [World Geodetic System '84][wgs84], as used by GPS.
///
/// Parameters from <https://nsgreg.nga.mil/doc/view?i=4085> table 3.1.
///
/// [wgs84]: https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84
pub const WGS84: Ellipsoid = Ellipsoid::from_inverse_flattening(6_378_137.0, 298.257_223_563);

/// The Airy 1830 ellipsoid that the OSGB36 datum (and so the Ordnance Survey National Grid) is
/// defined on.
pub const AIRY_1830: Ellipsoid = Ellipsoid::from_axes(6_377_563.396, 6_356_256.909);
