//! The end-to-end conversions between GPS positions and National Grid references.

use crate::datum::{Osgb36, Wgs84};
use crate::error::{ConversionError, Error, Stage};
use crate::helmert::HelmertTransform;
use crate::nmea::parse_nmea;
use crate::{Cartesian, Geographic, GridReference};
use tracing::debug;
use uom::si::f64::Length;

fn finite<In>(point: Cartesian<In>, stage: Stage) -> Result<Cartesian<In>, ConversionError> {
    if point.is_finite() {
        Ok(point)
    } else {
        debug!(%stage, "non-finite cartesian coordinates");
        Err(ConversionError::NonFinite { stage })
    }
}

/// Converts a WGS84 position (as reported by GPS) to the OSGB36 National Grid reference it lies
/// in.
///
/// The position is carried to OSGB36 through the cartesian frames of the two datums with
/// [`HelmertTransform::WGS84_TO_OSGB36`], then projected onto the grid. Fails with
/// [`ConversionError::InvalidGridReference`] if the position is not covered by the grid.
///
/// ```rust
/// use osgrid::{Geographic, Wgs84};
/// use uom::si::f64::{Angle, Length};
/// use uom::si::{angle::degree, length::meter};
///
/// let fix = Geographic::<Wgs84>::builder()
///     .latitude(Angle::new::<degree>(52.6575))
///     .expect("latitude is in [-90º, 90º]")
///     .longitude(Angle::new::<degree>(1.7177))
///     .expect("longitude is in [-180º, 180º]")
///     .height(Length::new::<meter>(0.))
///     .build();
///
/// assert_eq!(osgrid::to_grid_reference(&fix)?.to_string(), "TG 51524 13130");
/// # Ok::<(), osgrid::ConversionError>(())
/// ```
pub fn to_grid_reference(position: &Geographic<Wgs84>) -> Result<GridReference, ConversionError> {
    let wgs84 = finite(position.to_cartesian(), Stage::GeographicToCartesian)?;
    let osgb36 = finite(wgs84 * HelmertTransform::WGS84_TO_OSGB36, Stage::Helmert)?;
    osgb36.to_geographic()?.to_grid_reference()
}

/// Parses a GPS fix (see [`parse_nmea`](crate::parse_nmea)) and converts it to a National Grid
/// reference.
///
/// ```rust
/// let grid = osgrid::convert(
///     "52°39.4500\"N",
///     "001°43.0620\"E",
///     uom::si::f64::Length::new::<uom::si::length::meter>(0.),
/// )?;
/// assert_eq!(grid.to_string(), "TG 51524 13130");
/// # Ok::<(), osgrid::Error>(())
/// ```
pub fn convert(
    latitude: &str,
    longitude: &str,
    height: impl Into<Length>,
) -> Result<GridReference, Error> {
    let position = parse_nmea(latitude, longitude, height)?;
    Ok(to_grid_reference(&position)?)
}

/// Converts a National Grid reference back to the WGS84 position it designates.
///
/// The reference is taken to lie on the surface of the Airy 1830 ellipsoid, so the returned
/// height is that surface's height above the WGS84 ellipsoid rather than anything physical.
pub fn to_wgs84(grid: &GridReference) -> Result<Geographic<Wgs84>, ConversionError> {
    let osgb36: Cartesian<Osgb36> =
        finite(grid.to_osgb36()?.to_cartesian(), Stage::InverseProjection)?;
    let wgs84 = finite(osgb36 * HelmertTransform::osgb36_to_wgs84(), Stage::Helmert)?;
    wgs84.to_geographic()
}
