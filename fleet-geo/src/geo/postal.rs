//! Dutch postal codes and their offline approximation.
//!
//! This is the one place that turns a postal code into coordinates without
//! asking a remote service. The geocode resolver falls back to it when the
//! providers have nothing, and the trip matcher uses it directly to place a
//! trip's departure, so both always agree on where a code lies.

use std::fmt;

use super::{Accuracy, GeoLocation, Source};

/// Error returned when parsing an invalid postal code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid postal code: {reason}")]
pub struct InvalidPostalCode {
    reason: &'static str,
}

impl InvalidPostalCode {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A Dutch postal code: four digits, optionally followed by two letters.
///
/// Parsing is lenient about case and a single separating whitespace
/// character; the stored form is canonical (`1011AB`). Codes below 1000 are
/// not issued but still parse, and approximate to the low end of the range.
///
/// # Examples
///
/// ```
/// use fleet_geo::geo::PostalCode;
///
/// let code = PostalCode::parse(" 1011 ab ").unwrap();
/// assert_eq!(code.to_string(), "1011AB");
/// assert_eq!(code.prefix(), 10);
///
/// assert!(PostalCode::parse("1011").is_ok());
/// assert_eq!(PostalCode::parse("0123\tab").unwrap().to_string(), "0123AB");
/// assert!(PostalCode::parse("Damrak 1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostalCode {
    digits: u16,
    letters: Option<[u8; 2]>,
}

impl PostalCode {
    /// Parse a postal code from user input.
    pub fn parse(s: &str) -> Result<Self, InvalidPostalCode> {
        let s = s.trim();
        let bytes = s.as_bytes();

        if bytes.len() < 4 {
            return Err(InvalidPostalCode::new("expected four digits"));
        }

        let (digit_part, rest) = bytes.split_at(4);
        if !digit_part.iter().all(u8::is_ascii_digit) {
            return Err(InvalidPostalCode::new("expected four digits"));
        }

        let digits = digit_part
            .iter()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));

        let letters = match rest {
            [] => None,
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Some([a.to_ascii_uppercase(), b.to_ascii_uppercase()])
            }
            [sep, a, b]
                if sep.is_ascii_whitespace()
                    && a.is_ascii_alphabetic()
                    && b.is_ascii_alphabetic() =>
            {
                Some([a.to_ascii_uppercase(), b.to_ascii_uppercase()])
            }
            _ => return Err(InvalidPostalCode::new("expected two trailing letters")),
        };

        Ok(Self { digits, letters })
    }

    /// The numeric part (0-9999).
    pub fn digits(&self) -> u16 {
        self.digits
    }

    /// The two-digit region prefix (00-99).
    pub fn prefix(&self) -> u8 {
        (self.digits / 100) as u8
    }

    /// True if the code carries its two-letter suffix.
    pub fn is_full(&self) -> bool {
        self.letters.is_some()
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.digits)?;
        if let Some([a, b]) = self.letters {
            write!(f, "{}{}", a as char, b as char)?;
        }
        Ok(())
    }
}

/// Bounding box of the Netherlands used by the interpolation fallback.
const NL_SOUTH: f64 = 50.75;
const NL_NORTH: f64 = 53.55;
const NL_WEST: f64 = 3.36;
const NL_EAST: f64 = 7.23;

const LOWEST_CODE: f64 = 1000.0;
const HIGHEST_CODE: f64 = 9999.0;

/// Two-digit prefix → approximate centre of the region it serves.
///
/// Sorted by prefix. Not every prefix is listed; gaps fall through to
/// interpolation.
const PREFIX_TABLE: &[(u8, f64, f64, &str)] = &[
    (10, 52.3676, 4.9041, "Amsterdam"),
    (11, 52.3105, 4.9727, "Amsterdam-Zuidoost"),
    (12, 52.2292, 5.1669, "Hilversum"),
    (13, 52.3508, 5.2647, "Almere"),
    (15, 52.4389, 4.8264, "Zaandam"),
    (16, 52.6424, 5.0597, "Hoorn"),
    (18, 52.6324, 4.7534, "Alkmaar"),
    (19, 52.4832, 4.6576, "Beverwijk"),
    (20, 52.3874, 4.6462, "Haarlem"),
    (21, 52.3025, 4.6889, "Hoofddorp"),
    (23, 52.1601, 4.4970, "Leiden"),
    (24, 52.1243, 4.6571, "Alphen aan den Rijn"),
    (25, 52.0705, 4.3007, "Den Haag"),
    (26, 52.0116, 4.3571, "Delft"),
    (27, 52.0575, 4.4931, "Zoetermeer"),
    (28, 52.0115, 4.7105, "Gouda"),
    (29, 51.9292, 4.5779, "Capelle aan den IJssel"),
    (30, 51.9244, 4.4777, "Rotterdam"),
    (31, 51.9167, 4.3997, "Schiedam"),
    (32, 51.8447, 4.3298, "Spijkenisse"),
    (33, 51.8133, 4.6901, "Dordrecht"),
    (34, 52.0296, 5.0814, "Nieuwegein"),
    (35, 52.0907, 5.1214, "Utrecht"),
    (37, 52.0894, 5.2328, "Zeist"),
    (38, 52.1561, 5.3878, "Amersfoort"),
    (39, 52.0279, 5.5583, "Veenendaal"),
    (40, 51.8867, 5.4298, "Tiel"),
    (41, 51.9577, 5.2272, "Culemborg"),
    (42, 51.8372, 4.9744, "Gorinchem"),
    (44, 51.5043, 3.8884, "Goes"),
    (46, 51.4949, 4.2885, "Bergen op Zoom"),
    (47, 51.5308, 4.4653, "Roosendaal"),
    (48, 51.5719, 4.7683, "Breda"),
    (49, 51.6420, 4.8617, "Oosterhout"),
    (50, 51.5555, 5.0913, "Tilburg"),
    (52, 51.6978, 5.3037, "'s-Hertogenbosch"),
    (54, 51.6559, 5.6172, "Uden"),
    (55, 51.4185, 5.4040, "Veldhoven"),
    (56, 51.4416, 5.4697, "Eindhoven"),
    (57, 51.4816, 5.6611, "Helmond"),
    (58, 51.5267, 5.9742, "Venray"),
    (59, 51.3704, 6.1724, "Venlo"),
    (60, 51.2510, 5.7070, "Weert"),
    (61, 50.9980, 5.8697, "Sittard"),
    (62, 50.8514, 5.6910, "Maastricht"),
    (64, 50.8882, 5.9795, "Heerlen"),
    (65, 51.8126, 5.8372, "Nijmegen"),
    (67, 52.0402, 5.6649, "Ede"),
    (68, 51.9851, 5.8987, "Arnhem"),
    (70, 51.9653, 6.2886, "Doetinchem"),
    (71, 51.9658, 6.7195, "Winterswijk"),
    (72, 52.1383, 6.2011, "Zutphen"),
    (73, 52.2112, 5.9699, "Apeldoorn"),
    (74, 52.2551, 6.1639, "Deventer"),
    (75, 52.2215, 6.8937, "Enschede"),
    (76, 52.3570, 6.6625, "Almelo"),
    (78, 52.7792, 6.9069, "Emmen"),
    (79, 52.7236, 6.4764, "Hoogeveen"),
    (80, 52.5168, 6.0830, "Zwolle"),
    (82, 52.5185, 5.4714, "Lelystad"),
    (83, 52.7107, 5.7482, "Emmeloord"),
    (84, 52.9602, 5.9203, "Heerenveen"),
    (86, 53.0330, 5.6585, "Sneek"),
    (89, 53.2012, 5.7999, "Leeuwarden"),
    (91, 53.3265, 5.9990, "Dokkum"),
    (92, 53.1064, 6.0990, "Drachten"),
    (94, 52.9925, 6.5649, "Assen"),
    (96, 53.1614, 6.7606, "Hoogezand"),
    (97, 53.2194, 6.5665, "Groningen"),
    (99, 53.3194, 6.8631, "Appingedam"),
];

/// Look up the region centre for a two-digit prefix.
fn lookup_prefix(prefix: u8) -> Option<(f64, f64, &'static str)> {
    PREFIX_TABLE
        .binary_search_by_key(&prefix, |&(p, ..)| p)
        .ok()
        .map(|idx| {
            let (_, lat, lng, name) = PREFIX_TABLE[idx];
            (lat, lng, name)
        })
}

/// Approximate a postal code's location without any network access.
///
/// Known prefixes resolve to the centre of their region with
/// [`Accuracy::Approximate`]. Unknown prefixes are placed by linear
/// interpolation of the numeric code across the country's bounding box and
/// reported as [`Accuracy::Region`]. Both carry [`Source::LookupTable`].
pub fn approximate(code: &PostalCode) -> GeoLocation {
    if let Some((lat, lng, name)) = lookup_prefix(code.prefix()) {
        return GeoLocation::new(lat, lng, Accuracy::Approximate, Source::LookupTable)
            .with_address(format!("{code}, {name}"));
    }

    let t = ((f64::from(code.digits()) - LOWEST_CODE) / (HIGHEST_CODE - LOWEST_CODE)).clamp(0.0, 1.0);
    let lat = NL_SOUTH + t * (NL_NORTH - NL_SOUTH);
    let lng = NL_WEST + t * (NL_EAST - NL_WEST);

    GeoLocation::new(lat, lng, Accuracy::Region, Source::LookupTable).with_address(code.to_string())
}
