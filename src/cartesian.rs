use crate::Point3;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use uom::si::f64::Length;
use uom::si::length::meter;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::{Datum, Geographic};

/// A point in the Earth-centered, Earth-fixed cartesian frame of the [`Datum`] `In`.
///
/// The origin is the center of `In`'s reference ellipsoid, positive Z points towards the North
/// pole, positive X towards the prime meridian on the equator, and positive Y towards 90°E on the
/// equator. Since every datum places its ellipsoid slightly differently, the same physical
/// location has different cartesian components in different datums.
///
/// Usually produced by [`Geographic::to_cartesian`] and consumed by
/// [`Cartesian::to_geographic`] or a [`HelmertTransform`](crate::HelmertTransform).
///
/// <div class="warning">
///
/// Note that when deserializing, the datum of the deserialized value is _not_ checked, so this
/// is a foot-gun to be mindful of.
///
/// </div>
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// don't require In: Serialize/Deserialize since we skip it anyway
#[cfg_attr(feature = "serde", serde(bound = ""))]
// no need for the "point": indirection
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Cartesian<In> {
    /// X, Y, Z in meters
    pub(crate) point: Point3,
    #[cfg_attr(feature = "serde", serde(skip))]
    datum: PhantomData<In>,
}

// manual impls of Clone and Copy to avoid requiring In: Copy + Clone
impl<In> Clone for Cartesian<In> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<In> Copy for Cartesian<In> {}

impl<In> Cartesian<In> {
    pub(crate) fn from_nalgebra_point(point: Point3) -> Self {
        Self {
            point,
            datum: PhantomData,
        }
    }

    /// Constructs a cartesian point from its X, Y, and Z components.
    pub fn from_xyz(x: impl Into<Length>, y: impl Into<Length>, z: impl Into<Length>) -> Self {
        Self::from_nalgebra_point(Point3::new(
            x.into().get::<meter>(),
            y.into().get::<meter>(),
            z.into().get::<meter>(),
        ))
    }

    /// Returns the X component, along the axis through the equator at the prime meridian.
    #[must_use]
    pub fn x(&self) -> Length {
        Length::new::<meter>(self.point.x)
    }

    /// Returns the Y component, along the axis through the equator at 90°E.
    #[must_use]
    pub fn y(&self) -> Length {
        Length::new::<meter>(self.point.y)
    }

    /// Returns the Z component, along the axis through the North pole.
    #[must_use]
    pub fn z(&self) -> Length {
        Length::new::<meter>(self.point.z)
    }

    /// Returns the cartesian components of this point in XYZ order.
    #[doc(alias = "components")]
    #[must_use]
    pub fn to_xyz(&self) -> [Length; 3] {
        [self.x(), self.y(), self.z()]
    }

    /// Computes the straight-line distance between this point and `other`.
    #[must_use]
    pub fn distance_from(&self, other: &Self) -> Length {
        Length::new::<meter>((self.point - other.point).norm())
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.point.iter().all(|c| c.is_finite())
    }
}

impl<In> PartialEq<Self> for Cartesian<In> {
    fn eq(&self, other: &Self) -> bool {
        self.point.eq(&other.point)
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> AbsDiffEq<Self> for Cartesian<In> {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // NOTE: centimeter precision is well beyond what the datum shift itself is good for
        Length::new::<meter>(0.01)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        // NOTE: this measures whether the absolute difference in any _one_ component is off by
        // more than epsilon, not whether the distance between the points is below epsilon.
        self.point.abs_diff_eq(&other.point, epsilon.get::<meter>())
    }
}

#[cfg(any(test, feature = "approx"))]
impl<In> RelativeEq for Cartesian<In> {
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(Point3::default_max_relative())
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.point.relative_eq(
            &other.point,
            epsilon.get::<meter>(),
            max_relative.get::<meter>(),
        )
    }
}

impl<In> Display for Cartesian<In> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}m, {:.3}m, {:.3}m)",
            self.point.x, self.point.y, self.point.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Cartesian;
    use crate::datum::{Osgb36, Wgs84};
    use crate::Geographic;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::f64::{Angle, Length};
    use uom::si::{angle::degree, length::meter};

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }

    #[test]
    fn accessors() {
        let p = Cartesian::<Wgs84>::from_xyz(m(1.), m(-2.), m(3.5));
        assert_eq!(p.to_xyz(), [m(1.), m(-2.), m(3.5)]);
        assert_eq!(p.x(), m(1.));
        assert_eq!(p.y(), m(-2.));
        assert_eq!(p.z(), m(3.5));
    }

    #[rstest]
    #[case(0., 0., [6_378_137., 0., 0.])]
    #[case(0., 90., [0., 6_378_137., 0.])]
    #[case(90., 0., [0., 0., 6_356_752.314_245])]
    fn axis_directions(#[case] latitude: f64, #[case] longitude: f64, #[case] expected: [f64; 3]) {
        let p = Geographic::<Wgs84>::builder()
            .latitude(Angle::new::<degree>(latitude))
            .expect("latitude is in [-90º, 90º]")
            .longitude(Angle::new::<degree>(longitude))
            .expect("longitude is in [-180º, 180º]")
            .height(m(0.))
            .build()
            .to_cartesian();
        assert_relative_eq!(p.x().get::<meter>(), expected[0], epsilon = 1e-3);
        assert_relative_eq!(p.y().get::<meter>(), expected[1], epsilon = 1e-3);
        assert_relative_eq!(p.z().get::<meter>(), expected[2], epsilon = 1e-3);
    }

    #[rstest]
    #[case((0., 0., 0.), (3., 4., 0.), 5.)]
    #[case((1., 1., 1.), (1., 1., 1.), 0.)]
    #[case((0., 0., -6.), (0., 0., 6.), 12.)]
    fn distance(#[case] a: (f64, f64, f64), #[case] b: (f64, f64, f64), #[case] expected: f64) {
        let a = Cartesian::<Osgb36>::from_xyz(m(a.0), m(a.1), m(a.2));
        let b = Cartesian::<Osgb36>::from_xyz(m(b.0), m(b.1), m(b.2));
        assert_relative_eq!(a.distance_from(&b).get::<meter>(), expected);
        assert_relative_eq!(b.distance_from(&a).get::<meter>(), expected);
    }

    #[test]
    fn finiteness() {
        assert!(Cartesian::<Wgs84>::from_xyz(m(1.), m(2.), m(3.)).is_finite());
        assert!(!Cartesian::<Wgs84>::from_xyz(m(f64::NAN), m(2.), m(3.)).is_finite());
        assert!(!Cartesian::<Wgs84>::from_xyz(m(1.), m(f64::INFINITY), m(3.)).is_finite());
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(
            Cartesian::<Wgs84>::from_xyz(m(3_875_308.375_787), m(116_214.706_048), m(-0.5)),
            @"(3875308.376m, 116214.706m, -0.500m)"
        );
    }

    #[test]
    fn serde() {
        let p = Cartesian::<Osgb36>::from_xyz(m(10.), m(-5.), m(3.5));
        let ser = serde_yaml::to_string(&p).unwrap();
        let de = serde_yaml::from_str::<Cartesian<Osgb36>>(&ser).unwrap();
        assert_eq!(p, de);
    }
}
