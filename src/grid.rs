//! Ordnance Survey National Grid references.
//!
//! The grid is divided into 500 km squares, each divided into 25 squares of 100 km. Both levels
//! are named by a letter from a 5x5 matrix of the alphabet without `I`, lettered row by row from
//! the north-west corner. A reference names the 100 km square by its two letters, followed by the
//! easting and northing within that square.

use crate::datum::Osgb36;
use crate::error::{ConversionError, ParseError, Stage};
use crate::projection::NATIONAL_GRID;
use crate::Geographic;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;
use uom::si::f64::{Angle, Length};
use uom::si::{angle::radian, length::meter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exclusive upper bound of the grid's eastings, in meters.
const GRID_WIDTH: u32 = 700_000;

/// Exclusive upper bound of the grid's northings, in meters.
const GRID_HEIGHT: u32 = 1_300_000;

/// Letters skip `I`, so any index from `I` onwards is one letter further along.
const SKIPPED_LETTER: u32 = 8;

/// A position on the Ordnance Survey National Grid, to the nearest meter.
///
/// Always lies within the grid's 700 km x 1300 km extent. Displays as the conventional reference
/// of two grid square letters followed by the five-digit easting and northing within that square:
///
/// ```rust
/// use osgrid::GridReference;
/// use uom::si::f64::Length;
/// use uom::si::length::meter;
///
/// let tg = GridReference::new(
///     Length::new::<meter>(651_409.9),
///     Length::new::<meter>(313_177.3),
/// )?;
/// assert_eq!(tg.to_string(), "TG 51410 13177");
/// assert_eq!("TG 51410 13177".parse::<GridReference>()?, tg);
/// # Ok::<(), osgrid::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
// serialize as the human-readable reference; going through a string also re-validates the range
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct GridReference {
    /// Meters east of the false origin
    easting: u32,
    /// Meters north of the false origin
    northing: u32,
}

impl GridReference {
    /// Constructs a grid reference from a full easting and northing, rounding each to the nearest
    /// meter.
    ///
    /// Fails with [`ConversionError::InvalidGridReference`] if the rounded position is not
    /// finite or falls outside the grid.
    pub fn new(
        easting: impl Into<Length>,
        northing: impl Into<Length>,
    ) -> Result<Self, ConversionError> {
        let easting = easting.into().get::<meter>();
        let northing = northing.into().get::<meter>();
        let (e, n) = (easting.round(), northing.round());

        // NOTE: written so that NaN fails the check
        let in_range = (0. ..f64::from(GRID_WIDTH)).contains(&e)
            && (0. ..f64::from(GRID_HEIGHT)).contains(&n);
        if !in_range {
            debug!(easting, northing, "position is off the national grid");
            return Err(ConversionError::InvalidGridReference { easting, northing });
        }

        // in range, so both fit comfortably in a u32
        Ok(Self {
            easting: e as u32,
            northing: n as u32,
        })
    }

    /// Full easting from the grid's false origin.
    #[must_use]
    pub fn easting(&self) -> Length {
        Length::new::<meter>(f64::from(self.easting))
    }

    /// Full northing from the grid's false origin.
    #[must_use]
    pub fn northing(&self) -> Length {
        Length::new::<meter>(f64::from(self.northing))
    }

    /// The two letters naming the 100 km square this reference lies in.
    #[must_use]
    pub fn square(&self) -> [char; 2] {
        let (e500k, n500k) = (self.easting / 500_000, self.northing / 500_000);
        // the false origin sits in the 500 km square S, which is index 17 after skipping I
        // NOTE: + 17 before subtracting keeps this unsigned for the whole grid
        let first = e500k + 17 - 5 * n500k;

        let e100k = (self.easting % 500_000) / 100_000;
        let n100k = (self.northing % 500_000) / 100_000;
        let second = e100k + 20 - 5 * n100k;

        [letter(first), letter(second)]
    }

    /// The two-letter 100 km square, five-digit easting, and five-digit northing, e.g.
    /// `TG 51524 13130`.
    #[doc(alias = "to_string")]
    #[must_use]
    pub fn code(&self) -> String {
        self.to_string()
    }

    /// Recovers the OSGB36 position this grid reference designates, at zero height.
    ///
    /// Exact up to the rounding to whole meters done when the reference was constructed.
    pub fn to_osgb36(&self) -> Result<Geographic<Osgb36>, ConversionError> {
        let (lat, lon) = NATIONAL_GRID.unproject(
            self.easting().get::<meter>(),
            self.northing().get::<meter>(),
        )?;
        let off_ellipsoid = ConversionError::NonFinite {
            stage: Stage::InverseProjection,
        };
        Ok(Geographic::builder()
            .latitude(Angle::new::<radian>(lat))
            .ok_or(off_ellipsoid)?
            .longitude(Angle::new::<radian>(lon))
            .ok_or(off_ellipsoid)?
            .height(Length::new::<meter>(0.))
            .build())
    }
}

impl Geographic<Osgb36> {
    /// Projects this position onto the National Grid.
    ///
    /// The grid is only defined on OSGB36; WGS84 positions must first be carried across with a
    /// [`HelmertTransform`](crate::HelmertTransform), or via [`crate::to_grid_reference`].
    pub fn to_grid_reference(&self) -> Result<GridReference, ConversionError> {
        let (easting, northing) = NATIONAL_GRID.project(
            self.latitude().get::<radian>(),
            self.longitude().get::<radian>(),
        )?;
        GridReference::new(
            Length::new::<meter>(easting),
            Length::new::<meter>(northing),
        )
    }
}

/// Maps a letter index in the 25-letter grid alphabet to its letter.
fn letter(index: u32) -> char {
    let index = if index >= SKIPPED_LETTER {
        index + 1
    } else {
        index
    };
    char::from(b'A' + index as u8)
}

/// Maps a letter to its index in the 25-letter grid alphabet.
fn letter_index(letter: char) -> Option<u32> {
    match letter.to_ascii_uppercase() {
        'I' => None,
        l @ 'A'..='Z' => {
            let index = u32::from(l) - u32::from('A');
            Some(if index > SKIPPED_LETTER { index - 1 } else { index })
        }
        _ => None,
    }
}

impl Display for GridReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [first, second] = self.square();
        write!(
            f,
            "{first}{second} {:05} {:05}",
            self.easting % 100_000,
            self.northing % 100_000
        )
    }
}

impl FromStr for GridReference {
    type Err = ParseError;

    /// Parses a reference such as `TG 51524 13130`, `tg5152413130`, `TG 515 131`, or just `TG`.
    ///
    /// Letters are case-insensitive. The digits are split evenly between easting and northing,
    /// either as one run of an even number of digits or as two runs of equal length, at most five
    /// each. Shorter references designate the south-west corner of the square they name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let bad_letters = || ParseError::InvalidGridLetters { input: s.into() };
        let bad_digits = || ParseError::InvalidGridDigits { input: s.into() };

        let mut chars = input.chars();
        let first = chars.next().and_then(letter_index).ok_or_else(bad_letters)?;
        let second = chars.next().and_then(letter_index).ok_or_else(bad_letters)?;

        let groups: Vec<&str> = chars.as_str().split_whitespace().collect();
        if !groups.iter().all(|g| g.bytes().all(|b| b.is_ascii_digit())) {
            return Err(bad_digits());
        }
        let (easting, northing) = match groups.as_slice() {
            [] => ("", ""),
            [digits] if digits.len() % 2 == 0 => digits.split_at(digits.len() / 2),
            [easting, northing] if easting.len() == northing.len() => (*easting, *northing),
            _ => return Err(bad_digits()),
        };
        let easting = within_square(easting).ok_or_else(bad_digits)?;
        let northing = within_square(northing).ok_or_else(bad_digits)?;

        // position of the 100 km square relative to the false origin
        let e100k = (i64::from(first) - 2).rem_euclid(5) * 5 + i64::from(second % 5);
        let n100k = (19 - i64::from(first / 5) * 5) - i64::from(second / 5);
        let on_grid = (0..i64::from(GRID_WIDTH / 100_000)).contains(&e100k)
            && (0..i64::from(GRID_HEIGHT / 100_000)).contains(&n100k);
        if !on_grid {
            return Err(bad_letters());
        }

        Self::new(
            Length::new::<meter>((e100k * 100_000) as f64 + easting),
            Length::new::<meter>((n100k * 100_000) as f64 + northing),
        )
        .map_err(|_| bad_letters())
    }
}

/// Scales a run of up to five ASCII digits to meters within a 100 km square.
fn within_square(digits: &str) -> Option<f64> {
    if digits.len() > 5 {
        return None;
    }
    if digits.is_empty() {
        return Some(0.);
    }
    let value: u32 = digits.parse().ok()?;
    Some(f64::from(value * 10_u32.pow(5 - digits.len() as u32)))
}

impl TryFrom<String> for GridReference {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GridReference> for String {
    fn from(value: GridReference) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::GridReference;
    use crate::datum::Osgb36;
    use crate::error::{ConversionError, ParseError};
    use crate::Geographic;
    use approx::assert_relative_eq;
    use quickcheck::{quickcheck, Arbitrary};
    use rstest::rstest;
    use uom::si::f64::{Angle, Length};
    use uom::si::{angle::degree, length::meter};

    fn m(meters: f64) -> Length {
        Length::new::<meter>(meters)
    }

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    fn grid(easting: f64, northing: f64) -> GridReference {
        GridReference::new(m(easting), m(northing)).unwrap()
    }

    /// An arbitrary whole-meter position on the grid.
    #[derive(Debug, Clone, Copy)]
    struct OnGrid(u32, u32);

    impl Arbitrary for OnGrid {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            Self(u32::arbitrary(g) % 700_000, u32::arbitrary(g) % 1_300_000)
        }
    }

    #[rstest]
    #[case(0., 0., "SV 00000 00000")]
    #[case(400_000., 0., "SZ 00000 00000")]
    #[case(500_000., 0., "TV 00000 00000")]
    #[case(0., 500_000., "NV 00000 00000")]
    #[case(200_000., 300_000., "SH 00000 00000")]
    #[case(300_000., 300_000., "SJ 00000 00000")]
    #[case(100_000., 400_000., "SB 00000 00000")]
    #[case(447_297., 1_140_915., "HU 47297 40915")]
    #[case(651_524.063, 313_129.815, "TG 51524 13130")]
    #[case(699_999., 1_299_999., "JM 99999 99999")]
    fn encodes(#[case] easting: f64, #[case] northing: f64, #[case] expected: &str) {
        assert_eq!(grid(easting, northing).code(), expected);
    }

    #[test]
    fn rounds_to_nearest_meter() {
        let g = grid(651_409.5, 313_177.49);
        assert_eq!(g.easting(), m(651_410.));
        assert_eq!(g.northing(), m(313_177.));
    }

    #[rstest]
    #[case(-0.6, 0.)]
    #[case(0., -1.)]
    #[case(700_000., 0.)]
    #[case(699_999.5, 0.)]
    #[case(0., 1_300_000.)]
    #[case(f64::NAN, 0.)]
    #[case(0., f64::INFINITY)]
    fn rejects_off_grid(#[case] easting: f64, #[case] northing: f64) {
        assert!(matches!(
            GridReference::new(m(easting), m(northing)),
            Err(ConversionError::InvalidGridReference { .. })
        ));
    }

    #[rstest]
    #[case("TG 51524 13130", 651_524., 313_130.)]
    #[case("tg5152413130", 651_524., 313_130.)]
    #[case("  TG 515 131 ", 651_500., 313_100.)]
    #[case("TG515131", 651_500., 313_100.)]
    #[case("TG", 600_000., 300_000.)]
    #[case("SV 0 0", 0., 0.)]
    #[case("HU 4729 4091", 447_290., 1_140_910.)]
    #[case("NT2573", 325_000., 673_000.)]
    fn parses(#[case] input: &str, #[case] easting: f64, #[case] northing: f64) {
        assert_eq!(input.parse::<GridReference>(), Ok(grid(easting, northing)));
    }

    #[rstest]
    #[case("TI 00000 00000")]
    #[case("IG 00000 00000")]
    #[case("T")]
    #[case("")]
    #[case("T1 00000 00000")]
    // lettered squares that are off the grid
    #[case("AA 00000 00000")]
    #[case("ZZ 00000 00000")]
    #[case("TC 00000 00000")]
    fn rejects_bad_letters(#[case] input: &str) {
        assert_eq!(
            input.parse::<GridReference>(),
            Err(ParseError::InvalidGridLetters {
                input: input.into()
            })
        );
    }

    #[rstest]
    #[case("TG 5152 131")]
    #[case("TG5152413")]
    #[case("TG 515241 313130")]
    #[case("TG 5152x 13130")]
    #[case("TG 1 2 3")]
    fn rejects_bad_digits(#[case] input: &str) {
        assert_eq!(
            input.parse::<GridReference>(),
            Err(ParseError::InvalidGridDigits {
                input: input.into()
            })
        );
    }

    #[test]
    fn projects_osgb36() {
        let osgb = Geographic::<Osgb36>::builder()
            .latitude(d(52. + 39. / 60. + 27.2531 / 3600.))
            .expect("latitude is in [-90º, 90º]")
            .longitude(d(1. + 43. / 60. + 4.5177 / 3600.))
            .expect("longitude is in [-180º, 180º]")
            .height(m(0.))
            .build();
        let g = osgb.to_grid_reference().unwrap();
        assert_eq!(g.code(), "TG 51410 13177");

        let back = g.to_osgb36().unwrap();
        // whole-meter rounding moves the position by at most ~0.7m
        assert!(osgb.haversine_distance_on_surface(&back) < m(1.));
        assert_relative_eq!(back.height().get::<meter>(), 0.);
    }

    #[test]
    fn far_off_grid_is_rejected() {
        let sydney = Geographic::<Osgb36>::builder()
            .latitude(d(-33.8688))
            .expect("latitude is in [-90º, 90º]")
            .longitude(d(151.2093))
            .expect("longitude is in [-180º, 180º]")
            .height(m(0.))
            .build();
        assert!(sydney.to_grid_reference().is_err());
    }

    #[test]
    fn display() {
        insta::assert_snapshot!(grid(325_785., 673_636.), @"NT 25785 73636");
    }

    #[test]
    fn serde() {
        let g = grid(134_266., 25_077.);
        let ser = serde_yaml::to_string(&g).unwrap();
        insta::assert_snapshot!(ser.trim_end(), @"SW 34266 25077");
        let de = serde_yaml::from_str::<GridReference>(&ser).unwrap();
        assert_eq!(g, de);
        assert!(serde_yaml::from_str::<GridReference>("IX 00000 00000").is_err());
    }

    quickcheck! {
        fn code_parses_back(at: OnGrid) -> bool {
            let OnGrid(easting, northing) = at;
            let g = grid(f64::from(easting), f64::from(northing));
            g.code().parse::<GridReference>() == Ok(g)
        }

        fn letters_name_the_100km_square(at: OnGrid) -> bool {
            let OnGrid(easting, northing) = at;
            let g = grid(f64::from(easting), f64::from(northing));
            let [first, second] = g.square();
            let corner: GridReference = format!("{first}{second}").parse().unwrap();
            corner.easting() == m(f64::from(easting / 100_000 * 100_000))
                && corner.northing() == m(f64::from(northing / 100_000 * 100_000))
        }
    }
}
