//! `date` rule
//!
//! Layouts use placeholders such as `YYYY-MM-DD`, `DD.MM.YY hh:mm` or
//! `h:mmpm ZZZ`. A layout containing `%` is taken as a raw strftime layout
//! instead.
//!
//! | placeholder | matches                              |
//! |-------------|--------------------------------------|
//! | `YYYY`/`YY` | four / two digit year                |
//! | `MMMM`/`MMM`| month name / abbreviation            |
//! | `MM`/`M`    | two digit / one or two digit month   |
//! | `DDDD`/`DDD`| weekday name / abbreviation          |
//! | `DD`/`D`    | two digit / one or two digit day     |
//! | `hh`/`h`    | two digit / one or two digit hour    |
//! | `mm`/`m`    | minute                               |
//! | `ss`/`s`    | second                               |
//! | `pm`        | `AM` or `PM`, makes `h` a 12-hour    |
//! | `ZZZZ`      | offset such as `-0700`               |
//! | `ZZZ`       | zone abbreviation such as `CET`      |
//! | `ZZ`        | `Z` or an offset such as `+01:00`    |
//!
//! Letters that belong to a word which is not made of placeholders alone are
//! literal text, so `Uhr` in `hh:mm Uhr` is matched verbatim. Multi-letter
//! placeholders are still found inside such words, as in `DDThh`.

use std::iter;

use chrono::format::{self, Fixed, Item, Numeric, Pad, ParseErrorKind, Parsed, StrftimeItems};
use thiserror::Error;

use crate::error::ValidationError;
use crate::reflect::{Kind, Primitive, Reflect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    LongYear,
    Year,
    MonthName,
    MonthAbbrev,
    MonthPadded,
    Month,
    Weekday,
    WeekdayAbbrev,
    DayPadded,
    Day,
    HourPadded,
    Hour,
    MinutePadded,
    Minute,
    SecondPadded,
    Second,
    Pm,
    ZoneOffset,
    ZoneName,
    ZoneColon,
}

/// Placeholders, longest first so `MMMM` wins over `MM`
const PLACEHOLDERS: &[(&str, Field)] = &[
    ("YYYY", Field::LongYear),
    ("YY", Field::Year),
    ("MMMM", Field::MonthName),
    ("MMM", Field::MonthAbbrev),
    ("MM", Field::MonthPadded),
    ("M", Field::Month),
    ("DDDD", Field::Weekday),
    ("DDD", Field::WeekdayAbbrev),
    ("DD", Field::DayPadded),
    ("D", Field::Day),
    ("hh", Field::HourPadded),
    ("h", Field::Hour),
    ("mm", Field::MinutePadded),
    ("m", Field::Minute),
    ("ss", Field::SecondPadded),
    ("s", Field::Second),
    ("pm", Field::Pm),
    ("ZZZZ", Field::ZoneOffset),
    ("ZZZ", Field::ZoneName),
    ("ZZ", Field::ZoneColon),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Field(Field),
    Literal(&'a str),
}

/// Why an input does not match its layout
#[derive(Debug, Error)]
enum DateError {
    #[error(transparent)]
    Parse(#[from] format::ParseError),
    #[error("expected {} digits", digit_count(.min, .max))]
    Digits { min: usize, max: usize },
    #[error("expected {0:?}")]
    Literal(String),
    #[error("invalid time zone abbreviation")]
    ZoneName,
    #[error("invalid time zone offset")]
    ZoneOffset,
    #[error("trailing input {0:?}")]
    Trailing(String),
}

fn digit_count(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{} to {}", min, max)
    }
}

/// `date=LAYOUT`: the string must parse as a date in `LAYOUT`
pub fn date(value: &dyn Reflect, name: &str, param: &str) -> Result<(), ValidationError> {
    match value.kind().resolve() {
        None => Ok(()),
        Some(Kind::Primitive(Primitive::Str(s))) => parse(param, s).map_err(|reason| {
            ValidationError::field(name, format!("{} is not a valid date. {}", name, reason))
        }),
        Some(_) => Err(ValidationError::field(
            name,
            format!("{} is not a valid date.", name),
        )),
    }
}

/// Split a placeholder layout into fields and literal text
fn segments(layout: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(c) = layout[pos..].chars().next() {
        if !c.is_ascii_alphabetic() {
            pos += c.len_utf8();
            continue;
        }

        let end = layout[pos..]
            .find(|c: char| !c.is_ascii_alphabetic())
            .map_or(layout.len(), |n| pos + n);
        let mut word_pos = pos;
        for piece in split_word(&layout[pos..end]) {
            match piece {
                Some((field, len)) => {
                    if literal_start < word_pos {
                        out.push(Segment::Literal(&layout[literal_start..word_pos]));
                    }
                    out.push(Segment::Field(field));
                    word_pos += len;
                    literal_start = word_pos;
                }
                None => word_pos += 1,
            }
        }
        pos = end;
    }

    if literal_start < layout.len() {
        out.push(Segment::Literal(&layout[literal_start..]));
    }
    out
}

/// Placeholders in one run of ASCII letters, `None` for a literal letter.
/// Single-letter placeholders only count when the whole word is placeholders.
fn split_word(word: &str) -> Vec<Option<(Field, usize)>> {
    let pieces = decompose(word, true);
    if pieces.iter().any(Option::is_none) {
        decompose(word, false)
    } else {
        pieces
    }
}

fn decompose(word: &str, singles: bool) -> Vec<Option<(Field, usize)>> {
    let mut pieces = Vec::new();
    let mut rest = word;

    'outer: while !rest.is_empty() {
        for &(placeholder, field) in PLACEHOLDERS {
            if (singles || placeholder.len() > 1) && rest.starts_with(placeholder) {
                pieces.push(Some((field, placeholder.len())));
                rest = &rest[placeholder.len()..];
                continue 'outer;
            }
        }
        pieces.push(None);
        rest = &rest[1..];
    }
    pieces
}

fn parse(layout: &str, input: &str) -> Result<(), DateError> {
    let mut parsed = Parsed::new();

    if layout.contains('%') {
        format::parse(&mut parsed, input, StrftimeItems::new(layout))?;
    } else {
        let parts = segments(layout);
        let twelve_hour = parts.contains(&Segment::Field(Field::Pm));

        let mut rest = input;
        for segment in &parts {
            rest = match *segment {
                Segment::Literal(text) => rest
                    .strip_prefix(text)
                    .ok_or_else(|| DateError::Literal(text.to_string()))?,
                Segment::Field(field) => field.consume(&mut parsed, rest, twelve_hour)?,
            };
        }
        if !rest.is_empty() {
            return Err(DateError::Trailing(rest.to_string()));
        }
    }

    // Time-only layouts leave the date incomplete, which is fine
    match parsed.to_naive_date() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ParseErrorKind::NotEnough => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl Field {
    /// Parse this field from the front of `input`, returning the rest
    fn consume<'s>(
        self,
        parsed: &mut Parsed,
        input: &'s str,
        twelve_hour: bool,
    ) -> Result<&'s str, DateError> {
        match self {
            Field::LongYear => digits(parsed, input, Numeric::Year, 4, 4),
            Field::Year => digits(parsed, input, Numeric::YearMod100, 2, 2),
            Field::MonthPadded => digits(parsed, input, Numeric::Month, 2, 2),
            Field::Month => digits(parsed, input, Numeric::Month, 1, 2),
            Field::DayPadded => digits(parsed, input, Numeric::Day, 2, 2),
            Field::Day => digits(parsed, input, Numeric::Day, 1, 2),
            Field::HourPadded => digits(parsed, input, Numeric::Hour, 2, 2),
            Field::Hour if twelve_hour => digits(parsed, input, Numeric::Hour12, 1, 2),
            Field::Hour => digits(parsed, input, Numeric::Hour, 1, 2),
            Field::MinutePadded => digits(parsed, input, Numeric::Minute, 2, 2),
            Field::Minute => digits(parsed, input, Numeric::Minute, 1, 2),
            Field::SecondPadded => digits(parsed, input, Numeric::Second, 2, 2),
            Field::Second => digits(parsed, input, Numeric::Second, 1, 2),
            Field::MonthName => fixed(parsed, input, Fixed::LongMonthName),
            Field::MonthAbbrev => fixed(parsed, input, Fixed::ShortMonthName),
            Field::Weekday => fixed(parsed, input, Fixed::LongWeekdayName),
            Field::WeekdayAbbrev => fixed(parsed, input, Fixed::ShortWeekdayName),
            Field::Pm => fixed(parsed, input, Fixed::UpperAmPm),
            Field::ZoneOffset => fixed(parsed, input, Fixed::TimezoneOffset),
            Field::ZoneName => zone_name(input),
            Field::ZoneColon => zone_colon(parsed, input),
        }
    }
}

/// Between `min` and `max` ASCII digits, then no further digit
fn digits<'s>(
    parsed: &mut Parsed,
    input: &'s str,
    numeric: Numeric,
    min: usize,
    max: usize,
) -> Result<&'s str, DateError> {
    let len = input.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return Err(DateError::Digits { min, max });
    }

    let (number, rest) = input.split_at(len);
    format::parse(parsed, number, iter::once(Item::Numeric(numeric, Pad::None)))?;
    Ok(rest)
}

fn fixed<'s>(parsed: &mut Parsed, input: &'s str, spec: Fixed) -> Result<&'s str, DateError> {
    Ok(format::parse_and_remainder(
        parsed,
        input,
        iter::once(Item::Fixed(spec)),
    )?)
}

/// Three or more letters, as in `CET` or `ChST`
fn zone_name(input: &str) -> Result<&str, DateError> {
    let len = input.bytes().take_while(u8::is_ascii_alphabetic).count();
    if len < 3 || !input.as_bytes()[0].is_ascii_uppercase() {
        return Err(DateError::ZoneName);
    }
    Ok(&input[len..])
}

/// `Z` or `±hh:mm`
fn zone_colon<'s>(parsed: &mut Parsed, input: &'s str) -> Result<&'s str, DateError> {
    if let Some(rest) = input.strip_prefix('Z') {
        parsed.set_offset(0)?;
        return Ok(rest);
    }

    let bytes = input.as_bytes();
    let sign = match bytes.first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(DateError::ZoneOffset),
    };
    let two = |at: usize| match bytes.get(at..at + 2) {
        Some([a, b]) if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(i64::from((a - b'0') * 10 + (b - b'0')))
        }
        _ => None,
    };
    let (hours, minutes) = match (two(1), bytes.get(3), two(4)) {
        (Some(h), Some(b':'), Some(m)) if h < 24 && m < 60 => (h, m),
        _ => return Err(DateError::ZoneOffset),
    };

    parsed.set_offset(sign * (hours * 3600 + minutes * 60))?;
    Ok(&input[6..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{with_rule, Validator};
    use crate::Reflect;

    #[test]
    fn test_layout_segments() {
        use Field::*;
        use Segment::Literal;

        assert_eq!(
            segments("YYYY-MM-DD"),
            vec![
                Segment::Field(LongYear),
                Literal("-"),
                Segment::Field(MonthPadded),
                Literal("-"),
                Segment::Field(DayPadded),
            ]
        );
        assert_eq!(
            segments("h:mmpm"),
            vec![
                Segment::Field(Hour),
                Literal(":"),
                Segment::Field(MinutePadded),
                Segment::Field(Pm),
            ]
        );
        assert_eq!(
            segments("hh:mm Uhr"),
            vec![
                Segment::Field(HourPadded),
                Literal(":"),
                Segment::Field(MinutePadded),
                Literal(" Uhr"),
            ]
        );
        assert_eq!(
            segments("DDThh"),
            vec![
                Segment::Field(DayPadded),
                Literal("T"),
                Segment::Field(HourPadded),
            ]
        );
        assert_eq!(
            segments("YYYY年MM月"),
            vec![
                Segment::Field(LongYear),
                Literal("年"),
                Segment::Field(MonthPadded),
                Literal("月"),
            ]
        );
    }

    #[test]
    fn test_layouts() {
        let accepted = [
            ("YYYY-MM-DD", "2006-01-02"),
            ("DD.MM.YY hh:mm:ss", "02.01.06 15:04:05"),
            ("DDDD, D MMMM YYYY", "Monday, 2 January 2006"),
            ("DDD MMM D", "Mon Jan 2"),
            ("YYYY-MM-DD ZZZZ", "2006-01-02 -0700"),
            ("hh:mm:ss ZZZ", "16:05:06 CET"),
            ("hh:mm:ss ZZ", "16:05:06 +01:00"),
            ("hh:mm:ss ZZ", "16:05:06 Z"),
            ("h:mmpm", "3:04PM"),
            ("hpm", "11PM"),
            ("h:mm:sspm", "03:04:05AM"),
            ("DD.MM.YYYY hh:mm Uhr", "02.01.2006 15:04 Uhr"),
            ("YYYY-MM-DDThh:mm", "2006-01-02T15:04"),
            ("M/D/YYYY", "1/2/2006"),
            ("%d/%m/%Y", "29/02/2024"),
        ];
        for (layout, input) in accepted {
            assert!(parse(layout, input).is_ok(), "{} / {}", layout, input);
        }

        let rejected = [
            ("YYYY-MM-DD", "2006-1-2"),
            ("YYYY-MM-DD", "06-01-02"),
            ("YYYY-MM-DD", "2006-01-02x"),
            ("hh:mm", "3:04"),
            ("h:mmpm", "13:04PM"),
            ("h:mmpm", "3:04"),
            ("hh:mm:ss ZZ", "16:05:06 +1:00"),
            ("hh:mm:ss ZZ", "16:05:06 +0100"),
            ("hh:mm:ss ZZZ", "16:05:06 X"),
            ("DD.MM.YYYY hh:mm Uhr", "02.01.2006 15:04 U15r"),
            ("DDDD, D MMMM YYYY", "Tuesday, 2 January 2006"),
        ];
        for (layout, input) in rejected {
            assert!(parse(layout, input).is_err(), "{} / {}", layout, input);
        }
    }

    #[test]
    fn test_width_reason() {
        let reason = parse("YYYY-MM-DD", "2006-1-2").unwrap_err();
        assert_eq!(reason.to_string(), "expected 2 digits");
    }

    #[derive(Reflect)]
    struct Event {
        #[tag(valid = "date=YYYY-MM-DD")]
        pub day: String,
        #[tag(valid = "date=hh:mm")]
        pub at: String,
        #[tag(valid = "date=%d/%m/%Y")]
        pub raw: Option<String>,
    }

    fn validator() -> Validator {
        Validator::new([with_rule("date", date)])
    }

    #[test]
    fn test_valid_dates() {
        let event = Event {
            day: "2006-01-02".into(),
            at: "15:04".into(),
            raw: Some("29/02/2024".into()),
        };
        assert!(validator().validate(&event).is_ok());

        let event = Event {
            day: "1999-12-31".into(),
            at: "00:00".into(),
            raw: None,
        };
        assert!(validator().validate(&event).is_ok());
    }

    #[test]
    fn test_invalid_dates() {
        let event = Event {
            day: "2006-13-02".into(),
            at: "25:00".into(),
            raw: Some("30/02/2023".into()),
        };

        let errors = validator().validate(&event).unwrap_err();
        assert_eq!(errors.len(), 3);
        for (error, field) in errors.iter().zip(["day", "at", "raw"]) {
            assert_eq!(error.field_name(), Some(field));
            assert!(error
                .to_string()
                .starts_with(&format!("{} is not a valid date. ", field)));
        }
    }

    #[derive(Reflect)]
    struct Stamp {
        #[tag(valid = "date=YYYY")]
        pub year: i32,
    }

    #[test]
    fn test_non_string_is_rejected() {
        let errors = validator().validate(&Stamp { year: 2006 }).unwrap_err();
        assert_eq!(errors.messages(), vec!["year is not a valid date."]);
    }
}
