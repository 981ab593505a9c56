//! Parsing of GPS positions written in degrees and decimal minutes.
//!
//! Two spellings are supported: the human-readable `51°30.0000"N`, and the raw `ddmm.mmmm` field
//! plus hemisphere field found in NMEA 0183 `GGA`/`RMC` sentences (`5130.0000`, `N`).

use crate::datum::Wgs84;
use crate::error::ParseError;
use crate::Geographic;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};

/// Which axis a coordinate lies on, which decides the hemisphere letters it may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn expected(self) -> &'static str {
        match self {
            Axis::Latitude => "N or S",
            Axis::Longitude => "E or W",
        }
    }

    /// Determines the axis from a hemisphere letter, for inputs that don't say up front.
    fn of_hemisphere(input: &str, hemisphere: &str) -> Result<Self, ParseError> {
        match hemisphere_letter(hemisphere) {
            Some('N' | 'S') => Ok(Axis::Latitude),
            Some('E' | 'W') => Ok(Axis::Longitude),
            _ => Err(ParseError::InvalidHemisphere {
                input: input.into(),
                found: hemisphere.trim().into(),
                expected: "N, S, E or W",
            }),
        }
    }

    /// `1` for north and east, `-1` for south and west.
    fn sign(self, input: &str, hemisphere: &str) -> Result<f64, ParseError> {
        match (self, hemisphere_letter(hemisphere)) {
            (Axis::Latitude, Some('N')) | (Axis::Longitude, Some('E')) => Ok(1.),
            (Axis::Latitude, Some('S')) | (Axis::Longitude, Some('W')) => Ok(-1.),
            _ => Err(ParseError::InvalidHemisphere {
                input: input.into(),
                found: hemisphere.trim().into(),
                expected: self.expected(),
            }),
        }
    }
}

/// The single, upper-cased letter of a hemisphere field.
fn hemisphere_letter(hemisphere: &str) -> Option<char> {
    let mut chars = hemisphere.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Some(letter.to_ascii_uppercase()),
        _ => None,
    }
}

/// Parses an unsigned decimal number with no exponent, as in `[0-9]+(\.[0-9]*)?`.
fn unsigned_decimal(text: &str) -> Option<f64> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || !digits(fraction) {
        return None;
    }
    text.parse().ok()
}

/// Combines the textual degrees and minutes of `input` into signed decimal degrees.
fn degrees_and_minutes(
    input: &str,
    degrees: &str,
    minutes: &str,
    sign: f64,
) -> Result<f64, ParseError> {
    let invalid = |field| ParseError::InvalidNumber {
        input: input.into(),
        field,
    };

    // NOTE: the sign is carried by the hemisphere, never by the degrees
    let degrees = unsigned_decimal(degrees.trim())
        .filter(|d| d.is_finite())
        .ok_or_else(|| invalid("degrees"))?;

    let minutes = unsigned_decimal(minutes.trim()).ok_or_else(|| invalid("minutes"))?;
    if !(0. ..60.).contains(&minutes) {
        return Err(ParseError::MinutesOutOfRange {
            input: input.into(),
            minutes,
        });
    }

    Ok(sign * (degrees + minutes / 60.))
}

fn parse_coordinate(input: &str, axis: Axis) -> Result<f64, ParseError> {
    let missing = |delimiter| ParseError::MissingDelimiter {
        input: input.into(),
        delimiter,
    };
    let (degrees, rest) = input.split_once('°').ok_or_else(|| missing('°'))?;
    let (minutes, hemisphere) = rest.split_once('"').ok_or_else(|| missing('"'))?;

    let sign = axis.sign(input, hemisphere)?;
    degrees_and_minutes(input, degrees, minutes, sign)
}

/// Parses a latitude written as `DD°MM.MMMM"H`, where `H` is `N` or `S`.
///
/// Southern latitudes are negative. The minutes may omit their fractional part, and must be
/// less than 60.
///
/// ```rust
/// use uom::si::angle::degree;
///
/// let latitude = osgrid::parse_latitude("51°30.0000\"N")?;
/// assert!((latitude.get::<degree>() - 51.5).abs() < 1e-12);
/// # Ok::<(), osgrid::ParseError>(())
/// ```
pub fn parse_latitude(input: &str) -> Result<Angle, ParseError> {
    parse_coordinate(input, Axis::Latitude).map(Angle::new::<degree>)
}

/// Parses a longitude written as `DDD°MM.MMMM"H`, where `H` is `E` or `W`.
///
/// Western longitudes are negative.
pub fn parse_longitude(input: &str) -> Result<Angle, ParseError> {
    parse_coordinate(input, Axis::Longitude).map(Angle::new::<degree>)
}

/// Parses a GPS fix given as a latitude string, a longitude string (see [`parse_latitude`] and
/// [`parse_longitude`]), and the height above the WGS84 ellipsoid.
///
/// Fails with [`ParseError::OutOfRange`] if the parsed angles do not name a position on Earth.
pub fn parse_nmea(
    latitude: &str,
    longitude: &str,
    height: impl Into<Length>,
) -> Result<Geographic<Wgs84>, ParseError> {
    let latitude = parse_coordinate(latitude, Axis::Latitude)?;
    let longitude = parse_coordinate(longitude, Axis::Longitude)?;
    let out_of_range = || ParseError::OutOfRange {
        latitude,
        longitude,
    };

    Ok(Geographic::builder()
        .latitude(Angle::new::<degree>(latitude))
        .ok_or_else(out_of_range)?
        .longitude(Angle::new::<degree>(longitude))
        .ok_or_else(out_of_range)?
        .height(height)
        .build())
}

/// Parses a raw NMEA 0183 position field, `ddmm.mmmm` for latitudes or `dddmm.mmmm` for
/// longitudes, together with its hemisphere field.
///
/// The axis is taken from the hemisphere letter; the last two integer digits of `value` are the
/// whole minutes. Latitudes carry at most two degree digits and longitudes exactly three.
pub fn parse_nmea_field(value: &str, hemisphere: &str) -> Result<Angle, ParseError> {
    let axis = Axis::of_hemisphere(value, hemisphere)?;
    let sign = axis.sign(value, hemisphere)?;

    let trimmed = value.trim();
    let whole = trimmed.find('.').unwrap_or(trimmed.len());
    let degree_digits = match axis {
        Axis::Latitude => 1..=2,
        Axis::Longitude => 3..=3,
    };
    if !trimmed.is_ascii() || !degree_digits.contains(&whole.saturating_sub(2)) {
        return Err(ParseError::InvalidNumber {
            input: value.into(),
            field: "degrees",
        });
    }
    let (degrees, minutes) = trimmed.split_at(whole - 2);
    degrees_and_minutes(value, degrees, minutes, sign).map(Angle::new::<degree>)
}

#[cfg(test)]
mod tests {
    use super::{parse_latitude, parse_longitude, parse_nmea, parse_nmea_field};
    use crate::error::ParseError;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::degree;
    use uom::si::f64::Length;
    use uom::si::length::meter;

    #[test]
    fn hemisphere_signs() {
        let fix = parse_nmea("51°30.0000\"N", "000°07.0000\"W", Length::new::<meter>(0.)).unwrap();
        assert_relative_eq!(fix.latitude().get::<degree>(), 51.5, epsilon = 1e-12);
        assert_relative_eq!(fix.longitude().get::<degree>(), -7. / 60., epsilon = 1e-12);
        assert_eq!(fix.height(), Length::new::<meter>(0.));

        let flipped =
            parse_nmea("51°30.0000\"S", "000°07.0000\"E", Length::new::<meter>(0.)).unwrap();
        assert_eq!(flipped.latitude(), -fix.latitude());
        assert_eq!(flipped.longitude(), -fix.longitude());
    }

    #[rstest]
    #[case("52°39.4500\"N", 52.6575)]
    #[case("52°39.45\"n", 52.6575)]
    #[case(" 52 ° 39 \" N ", 52.65)]
    #[case("0°0\"S", 0.)]
    #[case("90°00.0000\"N", 90.)]
    fn latitudes(#[case] input: &str, #[case] expected: f64) {
        assert_relative_eq!(
            parse_latitude(input).unwrap().get::<degree>(),
            expected,
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case("001°43.0620\"E", 1.7177)]
    #[case("005°42.8820\"W", -5.7147)]
    #[case("179°59.9999\"W", -(179. + 59.9999 / 60.))]
    fn longitudes(#[case] input: &str, #[case] expected: f64) {
        assert_relative_eq!(
            parse_longitude(input).unwrap().get::<degree>(),
            expected,
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case("5130.0000\"N", ParseError::MissingDelimiter { input: "5130.0000\"N".into(), delimiter: '°' })]
    #[case("51°30.0000N", ParseError::MissingDelimiter { input: "51°30.0000N".into(), delimiter: '"' })]
    #[case("5x°30\"N", ParseError::InvalidNumber { input: "5x°30\"N".into(), field: "degrees" })]
    #[case("-51°30\"N", ParseError::InvalidNumber { input: "-51°30\"N".into(), field: "degrees" })]
    #[case("inf°30\"N", ParseError::InvalidNumber { input: "inf°30\"N".into(), field: "degrees" })]
    #[case("51°\"N", ParseError::InvalidNumber { input: "51°\"N".into(), field: "minutes" })]
    #[case("51°3o\"N", ParseError::InvalidNumber { input: "51°3o\"N".into(), field: "minutes" })]
    #[case("51°60\"N", ParseError::MinutesOutOfRange { input: "51°60\"N".into(), minutes: 60. })]
    #[case("51°-1\"N", ParseError::InvalidNumber { input: "51°-1\"N".into(), field: "minutes" })]
    #[case("1e1°30\"N", ParseError::InvalidNumber { input: "1e1°30\"N".into(), field: "degrees" })]
    #[case("+51°30\"N", ParseError::InvalidNumber { input: "+51°30\"N".into(), field: "degrees" })]
    #[case(".5°30\"N", ParseError::InvalidNumber { input: ".5°30\"N".into(), field: "degrees" })]
    #[case("51°3e1\"N", ParseError::InvalidNumber { input: "51°3e1\"N".into(), field: "minutes" })]
    #[case("51°30.5.1\"N", ParseError::InvalidNumber { input: "51°30.5.1\"N".into(), field: "minutes" })]
    #[case("51°30\"E", ParseError::InvalidHemisphere { input: "51°30\"E".into(), found: "E".into(), expected: "N or S" })]
    #[case("51°30\"", ParseError::InvalidHemisphere { input: "51°30\"".into(), found: "".into(), expected: "N or S" })]
    #[case("51°30\"NN", ParseError::InvalidHemisphere { input: "51°30\"NN".into(), found: "NN".into(), expected: "N or S" })]
    fn malformed_latitudes(#[case] input: &str, #[case] expected: ParseError) {
        assert_eq!(parse_latitude(input), Err(expected));
    }

    #[test]
    fn longitude_rejects_latitude_hemispheres() {
        assert_eq!(
            parse_longitude("000°07\"N"),
            Err(ParseError::InvalidHemisphere {
                input: "000°07\"N".into(),
                found: "N".into(),
                expected: "E or W",
            })
        );
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            parse_nmea("91°00\"N", "000°00\"E", Length::new::<meter>(0.)),
            Err(ParseError::OutOfRange {
                latitude: 91.,
                longitude: 0.,
            })
        );
        assert_eq!(
            parse_nmea("10°00\"N", "181°00\"W", Length::new::<meter>(0.)),
            Err(ParseError::OutOfRange {
                latitude: 10.,
                longitude: -181.,
            })
        );
    }

    #[rstest]
    #[case("5130.0000", "N", 51.5)]
    #[case("5130.0000", "s", -51.5)]
    #[case("00007.0000", "W", -7. / 60.)]
    #[case("00143.0620", "E", 1.7177)]
    #[case("5239", "N", 52. + 39. / 60.)]
    #[case("530.5", "N", 5. + 30.5 / 60.)]
    #[case("17959.9999", "W", -(179. + 59.9999 / 60.))]
    fn raw_fields(#[case] value: &str, #[case] hemisphere: &str, #[case] expected: f64) {
        assert_relative_eq!(
            parse_nmea_field(value, hemisphere).unwrap().get::<degree>(),
            expected,
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case("", "N")]
    #[case("12.5", "N")]
    #[case("5x30.0", "N")]
    #[case("51é0.00", "N")]
    // degree digits that don't fit the axis
    #[case("5130.0000", "E")]
    #[case("05130.0000", "N")]
    #[case("000007.0000", "W")]
    #[case("1e130.0", "N")]
    fn malformed_raw_fields(#[case] value: &str, #[case] hemisphere: &str) {
        assert!(matches!(
            parse_nmea_field(value, hemisphere),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn raw_field_hemisphere() {
        assert_eq!(
            parse_nmea_field("5130.0000", "X"),
            Err(ParseError::InvalidHemisphere {
                input: "5130.0000".into(),
                found: "X".into(),
                expected: "N, S, E or W",
            })
        );
        assert!(matches!(
            parse_nmea_field("5160.0000", "N"),
            Err(ParseError::MinutesOutOfRange { .. })
        ));
    }
}
