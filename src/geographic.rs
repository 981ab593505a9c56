use crate::error::{ConversionError, Stage};
use crate::{Cartesian, Datum, Point3};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use tracing::trace;
use uom::si::f64::{Angle, Length};
use uom::si::{
    angle::{degree, radian},
    length::meter,
};
use uom::ConstZero;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stop refining latitude once an iteration moves it by no more than this many radians (a few
/// micrometers on the ground).
///
/// The seed is exact for points on the ellipsoid surface and each refinement shrinks the
/// remaining error by a factor of roughly e^2, so terrestrial inputs settle in two to four steps.
const LATITUDE_TOLERANCE: f64 = 1e-12;

/// Upper bound on latitude refinements.
const MAX_LATITUDE_ITERATIONS: usize = 20;

/// Slack on the latitude/longitude range checks to absorb degree<->radian rounding.
const ANGLE_SLACK: f64 = 1e-12;

/// An ellipsoidal latitude, longitude, and height in the [`Datum`] `In`.
///
/// For positions from a GPS receiver, `In` is [`Wgs84`](crate::Wgs84). The Ordnance Survey
/// National Grid is a projection of [`Osgb36`](crate::Osgb36) positions.
///
/// <div class="warning">
///
/// Note that when deserializing, neither the datum nor the latitude/longitude range of the
/// deserialized value is checked.
///
/// </div>
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct Geographic<In> {
    latitude: Angle,
    longitude: Angle,
    height: Length,
    #[cfg_attr(feature = "serde", serde(skip))]
    datum: PhantomData<In>,
}

// manual impls of Clone and Copy to avoid requiring In: Copy + Clone
impl<In> Clone for Geographic<In> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<In> Copy for Geographic<In> {}

impl<In> PartialEq<Self> for Geographic<In> {
    fn eq(&self, other: &Self) -> bool {
        self.latitude == other.latitude
            && self.longitude == other.longitude
            && self.height == other.height
    }
}

impl<In> Geographic<In> {
    /// Constructs a position from latitude, longitude, and height.
    ///
    /// The latitude must be in [-90°,90°] and the longitude in [-180°,180°]. If either is not,
    /// this function returns `None`.
    ///
    /// The height is measured as distance above the reference ellipsoid of `In`.
    #[must_use]
    pub fn build(
        Components {
            latitude,
            longitude,
            height,
        }: Components,
    ) -> Option<Self> {
        Some(
            Self::builder()
                .latitude(latitude)?
                .longitude(longitude)?
                .height(height)
                .build(),
        )
    }

    /// Provides a constructor for a [`Geographic`] position.
    pub fn builder() -> Builder<In, MissingLatitude, MissingLongitude, MissingHeight> {
        Builder {
            under_construction: Geographic {
                latitude: Angle::ZERO,
                longitude: Angle::ZERO,
                height: Length::ZERO,
                datum: PhantomData,
            },
            has: (PhantomData, PhantomData, PhantomData),
        }
    }

    /// Returns the angle north of the equator; negative in the southern hemisphere.
    #[must_use]
    pub fn latitude(&self) -> Angle {
        self.latitude
    }

    /// Returns the angle east of the prime meridian; negative in the western hemisphere.
    #[must_use]
    pub fn longitude(&self) -> Angle {
        self.longitude
    }

    /// Returns the distance above the reference ellipsoid of `In`.
    ///
    /// Note that the ellipsoid is an approximation and does not perfectly align with ground level
    /// or mean sea level.
    #[must_use]
    pub fn height(&self) -> Length {
        self.height
    }
}

impl<In> Geographic<In>
where
    In: Datum,
{
    /// Converts this position into cartesian coordinates relative to the center of `In`'s
    /// ellipsoid.
    ///
    /// See:
    /// <https://en.wikipedia.org/wiki/Geographic_coordinate_conversion#From_geodetic_to_ECEF_coordinates>
    #[must_use]
    pub fn to_cartesian(&self) -> Cartesian<In> {
        let ellipsoid = In::ELLIPSOID;
        let e2 = ellipsoid.eccentricity_sq();
        let height_h = self.height.get::<meter>();
        let lat_phi = self.latitude.get::<radian>();
        let lon_lambda = self.longitude.get::<radian>();

        let v = ellipsoid.prime_vertical_radius(lat_phi);

        let x = (v + height_h) * lat_phi.cos() * lon_lambda.cos();
        let y = (v + height_h) * lat_phi.cos() * lon_lambda.sin();
        let z = ((1. - e2) * v + height_h) * lat_phi.sin();

        Cartesian::from_nalgebra_point(Point3::new(x, y, z))
    }

    /// Computes the [great-circle distance] between the two positions on the surface of the
    /// ellipsoid, ignoring height.
    ///
    /// Note that this is an approximation as the ellipsoid is not a perfect sphere; the
    /// equatorial radius is used throughout.
    ///
    /// [great-circle distance]: https://en.wikipedia.org/wiki/Great-circle_distance
    #[doc(alias = "great_circle_distance")]
    #[must_use]
    pub fn haversine_distance_on_surface(&self, other: &Self) -> Length {
        let lat_a = self.latitude.get::<radian>(); // φ1
        let lat_b = other.latitude.get::<radian>(); // φ2
        let delta_lat = lat_b - lat_a;
        let delta_lon = other.longitude.get::<radian>() - self.longitude.get::<radian>();

        let hav = (delta_lat / 2.).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (delta_lon / 2.).sin().powi(2);
        let central_angle = 2. * hav.sqrt().min(1.).asin();

        Length::new::<meter>(central_angle * In::ELLIPSOID.semi_major_axis())
    }
}

impl<In> Cartesian<In>
where
    In: Datum,
{
    /// Converts this point into latitude, longitude, and height on `In`'s ellipsoid.
    ///
    /// Longitude is closed-form. Latitude is found by fixed-point iteration, seeded with the
    /// exact solution for a point on the ellipsoid surface and refined until a step changes it
    /// by at most 1e-12 radians (at least one refinement is always made, and never more than
    /// 20). Height then follows from the converged latitude.
    ///
    /// Fails with [`ConversionError::NonFinite`] for non-finite input or points on the polar
    /// axis (where longitude is undefined), and with [`ConversionError::DidNotConverge`] if the
    /// iteration does not settle.
    pub fn to_geographic(&self) -> Result<Geographic<In>, ConversionError> {
        let stage = Stage::CartesianToGeographic;
        let ellipsoid = In::ELLIPSOID;
        let e2 = ellipsoid.eccentricity_sq();
        let (x, y, z) = (self.point.x, self.point.y, self.point.z);

        // distance from the polar axis
        let p = x.hypot(y);
        if !self.is_finite() || !p.is_normal() {
            return Err(ConversionError::NonFinite { stage });
        }

        // NOTE: atan2 rather than atan(y/x) so that longitudes beyond ±90° land in the right
        // quadrant.
        let lon = y.atan2(x);

        let mut lat = (z / (p * (1. - e2))).atan();
        let mut iterations = 0;
        loop {
            if iterations == MAX_LATITUDE_ITERATIONS {
                return Err(ConversionError::DidNotConverge { stage, iterations });
            }
            iterations += 1;

            let v = ellipsoid.prime_vertical_radius(lat);
            let refined = ((z + e2 * v * lat.sin()) / p).atan();
            let step = (refined - lat).abs();
            lat = refined;

            if step <= LATITUDE_TOLERANCE {
                break;
            }
        }
        trace!(datum = In::NAME, iterations, "latitude refinement converged");

        let height = p / lat.cos() - ellipsoid.prime_vertical_radius(lat);
        if !height.is_finite() {
            return Err(ConversionError::NonFinite { stage });
        }

        Ok(Geographic::builder()
            .latitude(Angle::new::<radian>(lat))
            .expect("atan produces lat in [-pi/2,pi/2]")
            .longitude(Angle::new::<radian>(lon))
            .expect("atan2 produces lon in [-pi,pi]")
            .height(Length::new::<meter>(height))
            .build())
    }
}

impl<In> Display for Geographic<In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude.get::<degree>();
        let lon = self.longitude.get::<degree>();
        let ns = if lat.is_sign_negative() { 'S' } else { 'N' };
        let ew = if lon.is_sign_negative() { 'W' } else { 'E' };
        let height = self.height.get::<meter>();
        write!(
            f,
            "{:.6}°{ns}, {:.6}°{ew}, {height:.3}m",
            lat.abs(),
            lon.abs()
        )
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> AbsDiffEq<Self> for Geographic<In>
where
    In: Datum,
{
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // NOTE: sub-meter, which is the resolution of a full 10-digit grid reference
        Length::new::<meter>(0.5)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.haversine_distance_on_surface(other) < epsilon
            && self
                .height
                .get::<meter>()
                .abs_diff_eq(&other.height.get::<meter>(), epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> RelativeEq for Geographic<In>
where
    In: Datum,
{
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(f64::default_max_relative())
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.haversine_distance_on_surface(other)
            .get::<meter>()
            .abs_diff_eq(&0., epsilon.get::<meter>())
            && self.height.get::<meter>().relative_eq(
                &other.height.get::<meter>(),
                epsilon.get::<meter>(),
                max_relative.get::<meter>(),
            )
    }
}

/// Argument type for [`Geographic::build`].
#[derive(Debug, Default)]
#[must_use]
pub struct Components {
    /// The latitude of the proposed [`Geographic`] position.
    ///
    /// The latitude must be in [-90°,90°]. If it is not, [`Geographic::build`] returns `None`.
    pub latitude: Angle,

    /// The longitude of the proposed [`Geographic`] position.
    ///
    /// The longitude must be in [-180°,180°]. If it is not, [`Geographic::build`] returns `None`.
    pub longitude: Angle,

    /// The height of the proposed [`Geographic`] position above the reference ellipsoid.
    pub height: Length,
}

/// Used to indicate that a partially-constructed [`Geographic`] is missing the latitude component.
pub struct MissingLatitude;
/// Used to indicate that a partially-constructed [`Geographic`] has the latitude component set.
pub struct HasLatitude;
/// Used to indicate that a partially-constructed [`Geographic`] is missing the longitude
/// component.
pub struct MissingLongitude;
/// Used to indicate that a partially-constructed [`Geographic`] has the longitude component set.
pub struct HasLongitude;
/// Used to indicate that a partially-constructed [`Geographic`] is missing the height component.
pub struct MissingHeight;
/// Used to indicate that a partially-constructed [`Geographic`] has the height component set.
pub struct HasHeight;

/// [Builder] for a [`Geographic`] position.
///
/// Construct one through [`Geographic::builder`], and finalize with [`Builder::build`].
///
/// [Builder]: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
#[derive(Debug)]
#[must_use]
pub struct Builder<In, Latitude, Longitude, Height> {
    under_construction: Geographic<In>,
    has: (
        PhantomData<Latitude>,
        PhantomData<Longitude>,
        PhantomData<Height>,
    ),
}

// manual impls of Clone and Copy to avoid requiring the type parameters to be Copy + Clone
impl<In, L1, L2, H> Clone for Builder<In, L1, L2, H> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<In, L1, L2, H> Copy for Builder<In, L1, L2, H> {}

impl<In, L1, L2, H> Builder<In, L1, L2, H> {
    /// Sets the latitude of the [`Geographic`]-to-be.
    ///
    /// The latitude must be in [-90°,90°]. If it is not (or is not finite), this function
    /// returns `None`.
    pub fn latitude(
        mut self,
        latitude: impl Into<Angle>,
    ) -> Option<Builder<In, HasLatitude, L2, H>> {
        let latitude = latitude.into();
        if !(latitude.get::<radian>().abs() <= FRAC_PI_2 + ANGLE_SLACK) {
            return None;
        }
        self.under_construction.latitude = latitude;
        Some(Builder {
            under_construction: self.under_construction,
            has: (PhantomData::<HasLatitude>, self.has.1, self.has.2),
        })
    }

    /// Sets the longitude of the [`Geographic`]-to-be.
    ///
    /// The longitude must be in [-180°,180°]. If it is not (or is not finite), this function
    /// returns `None`.
    pub fn longitude(
        mut self,
        longitude: impl Into<Angle>,
    ) -> Option<Builder<In, L1, HasLongitude, H>> {
        let longitude = longitude.into();
        if !(longitude.get::<radian>().abs() <= PI + ANGLE_SLACK) {
            return None;
        }
        self.under_construction.longitude = longitude;
        Some(Builder {
            under_construction: self.under_construction,
            has: (self.has.0, PhantomData::<HasLongitude>, self.has.2),
        })
    }

    /// Sets the height of the [`Geographic`]-to-be.
    ///
    /// The height is measured as distance above the reference ellipsoid.
    pub fn height(mut self, height: impl Into<Length>) -> Builder<In, L1, L2, HasHeight> {
        self.under_construction.height = height.into();
        Builder {
            under_construction: self.under_construction,
            has: (self.has.0, self.has.1, PhantomData::<HasHeight>),
        }
    }
}

impl<In> Builder<In, HasLatitude, HasLongitude, HasHeight> {
    #[must_use]
    pub fn build(self) -> Geographic<In> {
        self.under_construction
    }
}
