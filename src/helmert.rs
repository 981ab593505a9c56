//! Seven-parameter similarity transforms between geodetic datums.
//!
//! The main type provided by this module is [`HelmertTransform`], which moves [`Cartesian`]
//! points from one [`Datum`](crate::Datum) to another. It is a type-safe wrapper around a
//! [`HelmertParameters`] set, using the small-angle (linearized) form of the rotation that the
//! Ordnance Survey publishes its parameters for.

use crate::datum::{Osgb36, Wgs84};
use crate::{Cartesian, Matrix3, Vector3};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::ops::Mul;
use uom::si::angle::{radian, second};
use uom::si::f64::Angle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The seven parameters of a [Helmert transformation][helmert].
///
/// [helmert]: https://en.wikipedia.org/wiki/Helmert_transformation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HelmertParameters {
    /// Translation along X in meters.
    pub tx: f64,
    /// Translation along Y in meters.
    pub ty: f64,
    /// Translation along Z in meters.
    pub tz: f64,
    /// Rotation about X in arc-seconds.
    pub rx: f64,
    /// Rotation about Y in arc-seconds.
    pub ry: f64,
    /// Rotation about Z in arc-seconds.
    pub rz: f64,
    /// Scale change in parts per million.
    pub s: f64,
}

impl HelmertParameters {
    /// WGS84 to OSGB36 as published by the Ordnance Survey.
    ///
    /// Good to a few meters across Great Britain; OSTN15 is needed for better.
    pub const WGS84_TO_OSGB36: Self = Self {
        tx: -446.448,
        ty: 125.157,
        tz: -542.060,
        rx: -0.1502,
        ry: -0.2470,
        rz: -0.8421,
        s: 20.4894,
    };

    /// Returns the parameters of the reverse transformation.
    ///
    /// Flipping every sign is exact only to first order. For the OSGB36 parameters a round trip
    /// through both directions is off by about a centimeter.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            tx: -self.tx,
            ty: -self.ty,
            tz: -self.tz,
            rx: -self.rx,
            ry: -self.ry,
            rz: -self.rz,
            s: -self.s,
        }
    }

    /// The linear part (rotation + scale) and translation that make up this transformation.
    fn to_affine(self) -> (Matrix3, Vector3) {
        let arcsec = |v: f64| Angle::new::<second>(v).get::<radian>();
        let (rx, ry, rz) = (arcsec(self.rx), arcsec(self.ry), arcsec(self.rz));
        let scale = 1. + self.s / 1_000_000.;

        let linear = Matrix3::new(
            scale, -rz, ry, //
            rz, scale, -rx, //
            -ry, rx, scale,
        );
        (linear, Vector3::new(self.tx, self.ty, self.tz))
    }
}

impl Display for HelmertParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t=({}m, {}m, {}m) r=({}\", {}\", {}\") s={}ppm",
            self.tx, self.ty, self.tz, self.rx, self.ry, self.rz, self.s
        )
    }
}

/// Defines a Helmert datum transformation between two [`Datum`](crate::Datum)s.
///
/// Apply it to a [`Cartesian<From>`] either with [`HelmertTransform::transform`] or by
/// multiplication, which yields a [`Cartesian<To>`]:
///
/// ```rust
/// use osgrid::{Cartesian, HelmertTransform, Osgb36, Wgs84};
/// use uom::si::f64::Length;
/// use uom::si::length::meter;
///
/// let gps = Cartesian::<Wgs84>::from_xyz(
///     Length::new::<meter>(3_875_308.376),
///     Length::new::<meter>(116_214.706),
///     Length::new::<meter>(5_047_514.817),
/// );
/// let os: Cartesian<Osgb36> = gps * HelmertTransform::WGS84_TO_OSGB36;
/// ```
///
/// <div class="warning">
///
/// As with matrix multiplication, the operand order matters: the transform goes on the _right_
/// of a `Cartesian<From>` to produce a `Cartesian<To>`, so that the "middle" datum cancels out.
///
/// </div>
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
// don't require From/To: Serialize/Deserialize since we skip them anyway
#[cfg_attr(feature = "serde", serde(bound = ""))]
// no need for the "parameters": indirection
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HelmertTransform<From, To> {
    parameters: HelmertParameters,
    #[cfg_attr(feature = "serde", serde(skip))]
    from: PhantomData<From>,
    #[cfg_attr(feature = "serde", serde(skip))]
    to: PhantomData<To>,
}

// manual impls of Clone and Copy to avoid requiring From/To: Copy + Clone
impl<From, To> Clone for HelmertTransform<From, To> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<From, To> Copy for HelmertTransform<From, To> {}

impl<From, To> PartialEq<Self> for HelmertTransform<From, To> {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
    }
}

impl HelmertTransform<Wgs84, Osgb36> {
    /// The Ordnance Survey's transformation from GPS positions to the datum of the National Grid.
    pub const WGS84_TO_OSGB36: Self = Self {
        parameters: HelmertParameters::WGS84_TO_OSGB36,
        from: PhantomData,
        to: PhantomData,
    };
}

impl HelmertTransform<Osgb36, Wgs84> {
    /// The reverse of [`HelmertTransform::WGS84_TO_OSGB36`].
    #[must_use]
    pub fn osgb36_to_wgs84() -> Self {
        HelmertTransform::WGS84_TO_OSGB36.inverse()
    }
}

impl<From, To> HelmertTransform<From, To> {
    /// Constructs a transform from arbitrary parameters.
    ///
    /// # Safety
    ///
    /// If `parameters` is not the correct transformation from `From` to `To`, this allows moving
    /// points between datum types without correctly adjusting their components, leading to a
    /// defeat of their type safety.
    #[must_use]
    pub const unsafe fn new(parameters: HelmertParameters) -> Self {
        Self {
            parameters,
            from: PhantomData,
            to: PhantomData,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> HelmertParameters {
        self.parameters
    }

    /// Returns the equal-but-opposite transform, from `To` into `From`.
    ///
    /// See [`HelmertParameters::negated`] for its accuracy.
    #[must_use]
    pub fn inverse(&self) -> HelmertTransform<To, From> {
        HelmertTransform {
            parameters: self.parameters.negated(),
            from: PhantomData,
            to: PhantomData,
        }
    }

    /// Moves `point` from `From` into `To`.
    ///
    /// ```text
    /// x' = tx + (1 + s) x - rz y + ry z
    /// y' = ty + rz x + (1 + s) y - rx z
    /// z' = tz - ry x + rx y + (1 + s) z
    /// ```
    #[must_use]
    pub fn transform(&self, point: Cartesian<From>) -> Cartesian<To> {
        let (linear, translation) = self.parameters.to_affine();
        Cartesian::from_nalgebra_point(linear * point.point + translation)
    }
}

impl<From, To> Display for HelmertTransform<From, To> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parameters)
    }
}

impl<From, To> Mul<HelmertTransform<From, To>> for Cartesian<From> {
    type Output = Cartesian<To>;

    fn mul(self, rhs: HelmertTransform<From, To>) -> Self::Output {
        rhs.transform(self)
    }
}
