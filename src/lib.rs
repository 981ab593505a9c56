//! This library provides hard-to-misuse conversions from GPS positions to Ordnance Survey National
//! Grid references, for people who would rather not think about geodetic datums.
//!
//! A GPS receiver reports positions in the [`Wgs84`] datum, whereas the National Grid is a
//! projection of positions in the [`Osgb36`] datum. The two disagree by up to ~120 m over Great
//! Britain, so mixing them up produces grid references that look entirely plausible yet point at
//! the wrong field. To guard against that, the coordinate types [`Geographic`] (latitude,
//! longitude, height) and [`Cartesian`] (earth-centered X, Y, Z) are generic over a [`Datum`], and
//! the only way to move a position between datums is a [`HelmertTransform`]. The [`datum!`] macro
//! lets you define additional datums on other [ellipsoids](Ellipsoid).
//!
//! The full conversion runs through these stages:
//!
//! 1. parse `DD°MM.MMMM"H` strings into a [`Geographic<Wgs84>`] ([`parse_nmea`]);
//! 2. convert to [`Cartesian<Wgs84>`] ([`Geographic::to_cartesian`]);
//! 3. shift datum to [`Cartesian<Osgb36>`] ([`HelmertTransform::WGS84_TO_OSGB36`]);
//! 4. convert back to [`Geographic<Osgb36>`] ([`Cartesian::to_geographic`]);
//! 5. project onto the grid with the [`NATIONAL_GRID`] Transverse Mercator projection and label
//!    the result with its grid square letters ([`Geographic::to_grid_reference`]).
//!
//! # Examples
//!
//! If all you have are the strings from a GPS track log, [`convert`] does all of the above:
//!
//! ```
//! use uom::si::f64::Length;
//! use uom::si::length::meter;
//!
//! let grid = osgrid::convert("52°39.4500\"N", "001°43.0620\"E", Length::new::<meter>(0.))?;
//! assert_eq!(grid.to_string(), "TG 51524 13130");
//! # Ok::<(), osgrid::Error>(())
//! ```
//!
//! The same conversion, one stage at a time. Each step would fail to compile if the datums didn't
//! line up:
//!
//! ```
//! use osgrid::{Geographic, HelmertTransform, Osgb36, Wgs84};
//! use uom::si::f64::{Angle, Length};
//! use uom::si::{angle::degree, length::meter};
//!
//! let fix = Geographic::<Wgs84>::builder()
//!     .latitude(Angle::new::<degree>(52.6575))
//!     .expect("latitude is in [-90º, 90º]")
//!     .longitude(Angle::new::<degree>(1.7177))
//!     .expect("longitude is in [-180º, 180º]")
//!     .height(Length::new::<meter>(0.))
//!     .build();
//!
//! let in_osgb36: Geographic<Osgb36> =
//!     (fix.to_cartesian() * HelmertTransform::WGS84_TO_OSGB36).to_geographic()?;
//!
//! // the grid is only defined for OSGB36, so `fix.to_grid_reference()` would not compile
//! let grid = in_osgb36.to_grid_reference()?;
//! assert_eq!(grid.square(), ['T', 'G']);
//!
//! // and back again, to within the meter resolution of the grid reference
//! let back = osgrid::to_wgs84(&grid)?;
//! assert!(fix.haversine_distance_on_surface(&back) < Length::new::<meter>(1.));
//! # Ok::<(), osgrid::ConversionError>(())
//! ```

#[macro_use]
mod datum;

mod cartesian;
mod ellipsoid;
mod error;
mod geographic;
mod grid;
mod helmert;
mod nmea;
mod pipeline;
mod projection;

pub(crate) type Point3 = nalgebra::Point3<f64>;
pub(crate) type Vector3 = nalgebra::Vector3<f64>;
pub(crate) type Matrix3 = nalgebra::Matrix3<f64>;

/// Well-known reference ellipsoids.
pub mod ellipsoids {
    pub use super::ellipsoid::{AIRY_1830, WGS84};
}

/// The type-state markers of [`Geographic::builder`](crate::Geographic::builder).
pub mod builder {
    pub use super::geographic::{
        Builder, HasHeight, HasLatitude, HasLongitude, MissingHeight, MissingLatitude,
        MissingLongitude,
    };
}

pub use cartesian::Cartesian;
pub use datum::{Datum, Osgb36, Wgs84};
pub use ellipsoid::Ellipsoid;
pub use error::{ConversionError, Error, ParseError, Stage};
pub use geographic::{Components, Geographic};
pub use grid::GridReference;
pub use helmert::{HelmertParameters, HelmertTransform};
pub use nmea::{parse_latitude, parse_longitude, parse_nmea, parse_nmea_field};
pub use pipeline::{convert, to_grid_reference, to_wgs84};
pub use projection::{TransverseMercator, NATIONAL_GRID};
