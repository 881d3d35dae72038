//! Calibration record returned by `:WAVeform:PREamble?`.

use std::str::FromStr;

use crate::{Error, Result};

/// Field names of the preamble reply, in transfer order.
pub const PREAMBLE_FIELDS: [&str; 10] = [
    "format",
    "type",
    "points",
    "count",
    "xIncrement",
    "xOrigin",
    "xReference",
    "yIncrement",
    "yOrigin",
    "yReference",
];

const COUNT_INDEX: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preamble {
    /// Transfer format code (0 = BYTE, 1 = WORD, 4 = ASCII on most instruments).
    pub format: f64,
    /// Acquisition type code. Opaque here.
    pub kind: f64,
    /// Declared number of points in the capture.
    pub points: f64,
    /// Number of acquisitions combined into the capture (e.g. averages).
    pub count: i64,
    /// Seconds per sample.
    pub x_increment: f64,
    /// Seconds.
    pub x_origin: f64,
    /// Sample index.
    pub x_reference: f64,
    /// Volts per ADC code.
    pub y_increment: f64,
    /// Volts.
    pub y_origin: f64,
    /// ADC code.
    pub y_reference: f64,
}

fn too_short(len: usize) -> Error {
    Error::MalformedPreamble {
        index: len,
        reason: format!("({}) is missing, got {} of {} fields",
            PREAMBLE_FIELDS[len], len, PREAMBLE_FIELDS.len()),
    }
}

fn parse_float(index: usize, text: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|error| Error::MalformedPreamble {
        index,
        reason: format!("({}) {:?} is not a number: {}", PREAMBLE_FIELDS[index], text, error),
    })
}

fn parse_count(text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|error| Error::MalformedPreamble {
        index: COUNT_INDEX,
        reason: format!("(count) {:?} is not an integer: {}", text, error),
    })
}

impl Preamble {
    fn from_fields(fields: [f64; 10], count: i64) -> Preamble {
        let [format, kind, points, _, x_increment, x_origin, x_reference,
             y_increment, y_origin, y_reference] = fields;
        Preamble {
            format,
            kind,
            points,
            count,
            x_increment,
            x_origin,
            x_reference,
            y_increment,
            y_origin,
            y_reference,
        }
    }

    /// Parse the ten preamble fields from text, in transfer order.
    ///
    /// Every field must parse as a number and `count` must be an integer. Fields past the tenth
    /// are ignored.
    pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Result<Preamble> {
        if fields.len() < PREAMBLE_FIELDS.len() {
            return Err(too_short(fields.len()))
        }
        if fields.len() > PREAMBLE_FIELDS.len() {
            log::debug!("ignoring {} extra preamble fields", fields.len() - PREAMBLE_FIELDS.len());
        }
        let mut values = [0.0; 10];
        let mut count = 0;
        for (index, field) in fields.iter().take(PREAMBLE_FIELDS.len()).enumerate() {
            let field = field.as_ref();
            if index == COUNT_INDEX {
                count = parse_count(field)?;
                values[index] = count as f64;
            } else {
                values[index] = parse_float(index, field)?;
            }
        }
        Ok(Preamble::from_fields(values, count))
    }

    /// Build a preamble from already-numeric fields, in transfer order.
    ///
    /// `count` is truncated toward zero; it must be finite and fit in an `i64`.
    pub fn from_values(values: &[f64]) -> Result<Preamble> {
        if values.len() < PREAMBLE_FIELDS.len() {
            return Err(too_short(values.len()))
        }
        let count = values[COUNT_INDEX];
        if !count.is_finite() {
            return Err(Error::MalformedPreamble {
                index: COUNT_INDEX,
                reason: format!("(count) {} is not finite", count),
            })
        }
        let count = count.trunc();
        // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
        if count < i64::MIN as f64 || count >= i64::MAX as f64 {
            return Err(Error::MalformedPreamble {
                index: COUNT_INDEX,
                reason: format!("(count) {} does not fit in a 64-bit integer", count),
            })
        }
        let mut fields = [0.0; 10];
        fields.copy_from_slice(&values[..PREAMBLE_FIELDS.len()]);
        Ok(Preamble::from_fields(fields, count as i64))
    }
}

impl FromStr for Preamble {
    type Err = Error;

    /// Parse the comma separated reply to `:WAVeform:PREamble?`.
    fn from_str(reply: &str) -> Result<Preamble> {
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(too_short(0))
        }
        Preamble::parse_fields(&reply.split(',').collect::<Vec<_>>())
    }
}
