//! Transverse Mercator projection, in the series form the Ordnance Survey uses for the National
//! Grid.
//!
//! Forward: terms I–VI. Inverse: terms VII–XIIA after iterating latitude against the meridional
//! arc. Both are accurate to about a millimeter within the extent of the grid.

use crate::ellipsoid::{Ellipsoid, AIRY_1830};
use crate::error::{ConversionError, Stage};
use std::f64::consts::PI;
use tracing::trace;

/// Stop iterating the inverse once the meridional arc is within this many meters of the
/// northing (0.01 mm).
const ARC_TOLERANCE: f64 = 0.000_01;

/// Upper bound on inverse latitude iterations; the OS grid needs about five.
const MAX_ARC_ITERATIONS: usize = 100;

/// A Transverse Mercator projection of an ellipsoid onto a plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    /// Scale factor on the central meridian (F0)
    scale_factor: f64,
    /// Latitude of the true origin (φ0), radians
    origin_latitude: f64,
    /// Longitude of the true origin and central meridian (λ0), radians
    origin_longitude: f64,
    /// Easting of the true origin (E0), meters
    false_easting: f64,
    /// Northing of the true origin (N0), meters
    false_northing: f64,
}

/// The projection underlying the Ordnance Survey National Grid.
///
/// True origin 49°N 2°W on the Airy 1830 ellipsoid; the false origin sits 400 km west and
/// 100 km north of it so that all of Great Britain has positive coordinates.
pub const NATIONAL_GRID: TransverseMercator = TransverseMercator {
    ellipsoid: AIRY_1830,
    scale_factor: 0.999_601_271_7,
    origin_latitude: 49. * PI / 180.,
    origin_longitude: -2. * PI / 180.,
    false_easting: 400_000.,
    false_northing: -100_000.,
};

/// Curvature terms shared by the forward and inverse series at a given latitude.
struct Curvature {
    /// Transverse radius of curvature, scaled by F0
    nu: f64,
    /// Meridional radius of curvature, scaled by F0
    rho: f64,
    eta2: f64,
}

impl TransverseMercator {
    /// Constructs a projection from its defining parameters; angles in radians, lengths in
    /// meters.
    #[must_use]
    pub const fn new(
        ellipsoid: Ellipsoid,
        scale_factor: f64,
        origin_latitude: f64,
        origin_longitude: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            ellipsoid,
            scale_factor,
            origin_latitude,
            origin_longitude,
            false_easting,
            false_northing,
        }
    }

    #[must_use]
    pub fn ellipsoid(&self) -> Ellipsoid {
        self.ellipsoid
    }

    fn curvature(&self, lat: f64) -> Curvature {
        let a = self.ellipsoid.semi_major_axis();
        let e2 = self.ellipsoid.eccentricity_sq();
        let sin2 = lat.sin().powi(2);

        let nu = a * self.scale_factor / (1. - e2 * sin2).sqrt();
        let rho = a * self.scale_factor * (1. - e2) * (1. - e2 * sin2).powf(-1.5);
        Curvature {
            nu,
            rho,
            eta2: nu / rho - 1.,
        }
    }

    /// Meridional arc from the true origin's latitude to `lat` (radians), scaled by F0.
    #[doc(alias = "M")]
    fn meridional_arc(&self, lat: f64) -> f64 {
        let b = self.ellipsoid.semi_minor_axis();
        let n = self.ellipsoid.third_flattening();
        let (n2, n3) = (n * n, n * n * n);
        let dlat = lat - self.origin_latitude;
        let slat = lat + self.origin_latitude;

        let ma = (1. + n + 5. / 4. * n2 + 5. / 4. * n3) * dlat;
        let mb = (3. * n + 3. * n2 + 21. / 8. * n3) * dlat.sin() * slat.cos();
        let mc = (15. / 8. * n2 + 15. / 8. * n3) * (2. * dlat).sin() * (2. * slat).cos();
        let md = 35. / 24. * n3 * (3. * dlat).sin() * (3. * slat).cos();

        b * self.scale_factor * (ma - mb + mc - md)
    }

    /// Projects a latitude and longitude (radians) on this projection's ellipsoid to an
    /// (easting, northing) pair in meters.
    ///
    /// The result is not rounded; the National Grid convention of whole meters is applied by
    /// [`GridReference`](crate::GridReference).
    pub fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ConversionError> {
        let Curvature { nu, rho, eta2 } = self.curvature(lat);
        let (sin, cos, tan) = (lat.sin(), lat.cos(), lat.tan());
        let tan2 = tan * tan;
        let tan4 = tan2 * tan2;

        let i = self.meridional_arc(lat) + self.false_northing;
        let ii = nu / 2. * sin * cos;
        let iii = nu / 24. * sin * cos.powi(3) * (5. - tan2 + 9. * eta2);
        let iiia = nu / 720. * sin * cos.powi(5) * (61. - 58. * tan2 + tan4);
        let iv = nu * cos;
        let v = nu / 6. * cos.powi(3) * (nu / rho - tan2);
        let vi = nu / 120.
            * cos.powi(5)
            * (5. - 18. * tan2 + tan4 + 14. * eta2 - 58. * tan2 * eta2);

        let p = lon - self.origin_longitude;
        let northing = i + ii * p.powi(2) + iii * p.powi(4) + iiia * p.powi(6);
        let easting = self.false_easting + iv * p + v * p.powi(3) + vi * p.powi(5);

        if !(easting.is_finite() && northing.is_finite()) {
            return Err(ConversionError::NonFinite {
                stage: Stage::Projection,
            });
        }
        Ok((easting, northing))
    }

    /// Recovers the latitude and longitude (radians) that [`TransverseMercator::project`] maps
    /// to the given easting and northing (meters).
    pub fn unproject(&self, easting: f64, northing: f64) -> Result<(f64, f64), ConversionError> {
        let stage = Stage::InverseProjection;
        if !(easting.is_finite() && northing.is_finite()) {
            return Err(ConversionError::NonFinite { stage });
        }

        let a = self.ellipsoid.semi_major_axis();
        let dn = northing - self.false_northing;

        let mut lat = dn / (a * self.scale_factor) + self.origin_latitude;
        let mut m = self.meridional_arc(lat);
        let mut iterations = 0;
        while (dn - m).abs() >= ARC_TOLERANCE {
            if iterations == MAX_ARC_ITERATIONS {
                return Err(ConversionError::DidNotConverge { stage, iterations });
            }
            iterations += 1;
            lat += (dn - m) / (a * self.scale_factor);
            m = self.meridional_arc(lat);
        }
        trace!(iterations, "meridional arc converged");

        let Curvature { nu, rho, eta2 } = self.curvature(lat);
        let tan = lat.tan();
        let (tan2, sec) = (tan * tan, 1. / lat.cos());
        let (tan4, tan6) = (tan2 * tan2, tan2 * tan2 * tan2);

        let vii = tan / (2. * rho * nu);
        let viii = tan / (24. * rho * nu.powi(3)) * (5. + 3. * tan2 + eta2 - 9. * tan2 * eta2);
        let ix = tan / (720. * rho * nu.powi(5)) * (61. + 90. * tan2 + 45. * tan4);
        let x = sec / nu;
        let xi = sec / (6. * nu.powi(3)) * (nu / rho + 2. * tan2);
        let xii = sec / (120. * nu.powi(5)) * (5. + 28. * tan2 + 24. * tan4);
        let xiia = sec / (5040. * nu.powi(7)) * (61. + 662. * tan2 + 1320. * tan4 + 720. * tan6);

        let de = easting - self.false_easting;
        let lat = lat - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
        let lon = self.origin_longitude + x * de - xi * de.powi(3) + xii * de.powi(5)
            - xiia * de.powi(7);

        if !(lat.is_finite() && lon.is_finite()) {
            return Err(ConversionError::NonFinite { stage });
        }
        Ok((lat, lon))
    }
}
