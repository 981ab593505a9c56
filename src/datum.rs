use crate::ellipsoid::{Ellipsoid, AIRY_1830, WGS84};

#[cfg(doc)]
use crate::{Cartesian, Geographic, HelmertTransform};

/// Defines which geodetic datum a coordinate is expressed in.
///
/// Coordinates like [`Geographic`] and [`Cartesian`] are generic over a `Datum` so that a
/// latitude measured against, say, [`Wgs84`] cannot (easily) be fed into a formula that expects
/// [`Osgb36`]. The only sanctioned way to move between datums is a [`HelmertTransform`].
///
/// While you _can_ implement this trait directly, prefer using [`datum!`](crate::datum).
pub trait Datum {
    /// The reference ellipsoid this datum is realized on.
    const ELLIPSOID: Ellipsoid;

    /// A short human-readable name, used in diagnostics.
    const NAME: &'static str;
}

/// Defines a new geodetic datum on the given [`Ellipsoid`].
///
/// Note that the datum is a zero-sized type used only to mark things like [`Geographic`] and
/// [`Cartesian`] with which datum they are in. A datum does not know its relation to any other
/// datum; that is what [`HelmertTransform`] is for.
///
/// ```rust
/// use osgrid::{datum, Ellipsoid};
///
/// const GRS80: Ellipsoid = Ellipsoid::from_inverse_flattening(6_378_137.0, 298.257_222_101);
///
/// datum!(pub struct Etrs89 on GRS80);
/// ```
///
/// You can include doc comments and attributes directly in the invocation:
///
/// ```rust
/// osgrid::datum! {
///     /// Ireland's historic datum.
///     pub(crate) struct Ireland1965 on osgrid::Ellipsoid::from_axes(6_377_340.189, 6_356_034.447)
/// }
/// ```
#[macro_export]
macro_rules! datum {
    ($(#[$attr:meta])* $vis:vis struct $name:ident on $ellipsoid:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::Datum for $name {
            const ELLIPSOID: $crate::Ellipsoid = $ellipsoid;
            const NAME: &'static str = stringify!($name);
        }
    };
}

datum! {
    /// The [World Geodetic System '84][wgs84] datum, which GPS/GNSS receivers report positions
    /// in.
    ///
    /// [wgs84]: https://en.wikipedia.org/wiki/World_Geodetic_System#WGS_84
    pub struct Wgs84 on WGS84
}

datum! {
    /// The Ordnance Survey Great Britain 1936 datum, on the Airy 1830 ellipsoid.
    ///
    /// The National Grid is a projection of coordinates in this datum.
    pub struct Osgb36 on AIRY_1830
}
