//! Grammar and resolution for Analog-style date expressions.
//!
//! An expression packs year, month and day fields (plus an optional
//! `:hhmm` group) into one string. A field starting with `+` or `-` is an
//! offset from the base instant; otherwise it replaces that calendar unit.
//! The two kinds mix freely within one expression, so `2000-0131` means
//! "year 2000, one month before the base month, day 31 (clamped to the
//! month's length)".
//!
//! Resolution takes the base instant as an explicit argument — these
//! functions never read the system clock except [`resolve_now`], which
//! samples it exactly once per call.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::error::{DateExprError, Result};

// ── Parsed representation ───────────────────────────────────────────────────

/// One date/time component of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldValue {
    /// Replace the corresponding unit of the base instant with this value.
    Absolute(i64),
    /// Add this signed offset to the base instant.
    Relative(i64),
}

/// The optional time-of-day group. Hour and minute travel together: the
/// `:hhmm` group is either fully present or fully absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeFields {
    pub hour: FieldValue,
    pub minute: FieldValue,
}

/// A parsed date expression, ready to be applied to a base instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateExpr {
    pub year: FieldValue,
    pub month: FieldValue,
    pub day: FieldValue,
    /// `None` means the expression had no `:hhmm` group; resolution then
    /// truncates the result to midnight.
    pub time: Option<TimeFields>,
}

impl DateExpr {
    /// Whether the expression carried an hour/minute group.
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Apply the expression to `base`, producing the resolved instant.
    ///
    /// Seconds and sub-seconds of the result are always zero. Without a
    /// time group the result is truncated to midnight before any day,
    /// month or year adjustment. Relative year/month offsets resolve as a
    /// single calendar step with the day-of-month clamped down to the last
    /// valid day of the target month; relative day/hour/minute offsets
    /// resolve as a single chronological delta with plain carry.
    ///
    /// # Errors
    ///
    /// Returns [`DateExprError::DateRange`] when an absolute unit has no
    /// valid interpretation (month 13, hour 99, day 0) or when the result
    /// falls outside the representable date range.
    pub fn apply(&self, base: NaiveDateTime) -> Result<NaiveDateTime> {
        let mut year = i64::from(base.year());
        let mut month = i64::from(base.month());
        let mut day = i64::from(base.day());
        // The format has no seconds; an absent time group also truncates
        // hour and minute to zero.
        let (mut hour, mut minute) = match self.time {
            Some(_) => (i64::from(base.hour()), i64::from(base.minute())),
            None => (0, 0),
        };

        let mut months_offset: i64 = 0;
        let mut days_offset: i64 = 0;
        let mut hours_offset: i64 = 0;
        let mut minutes_offset: i64 = 0;

        match self.year {
            FieldValue::Absolute(value) => year = value,
            FieldValue::Relative(offset) => {
                months_offset = offset
                    .checked_mul(12)
                    .ok_or_else(|| DateExprError::DateRange(format!("year offset {offset}")))?;
            }
        }
        match self.month {
            FieldValue::Absolute(value) => {
                if !(1..=12).contains(&value) {
                    return Err(DateExprError::DateRange(format!(
                        "month must be 1-12, got {value}"
                    )));
                }
                month = value;
            }
            FieldValue::Relative(offset) => {
                months_offset = months_offset
                    .checked_add(offset)
                    .ok_or_else(|| DateExprError::DateRange(format!("month offset {offset}")))?;
            }
        }
        match self.day {
            FieldValue::Absolute(value) => day = value,
            FieldValue::Relative(offset) => days_offset = offset,
        }
        if let Some(time) = self.time {
            match time.hour {
                FieldValue::Absolute(value) => hour = value,
                FieldValue::Relative(offset) => hours_offset = offset,
            }
            match time.minute {
                FieldValue::Absolute(value) => minute = value,
                FieldValue::Relative(offset) => minutes_offset = offset,
            }
        }

        // One combined calendar step for the year/month offsets. The pending
        // day (absolute value, or the base's day-of-month) clamps down to the
        // length of the target month instead of rolling over.
        let month_index = year
            .checked_mul(12)
            .and_then(|m| m.checked_add(month - 1))
            .and_then(|m| m.checked_add(months_offset))
            .ok_or_else(|| DateExprError::DateRange(format!("year {year} with month offset")))?;
        let year = i32::try_from(month_index.div_euclid(12))
            .map_err(|_| DateExprError::DateRange(format!("year {}", month_index.div_euclid(12))))?;
        let month = (month_index.rem_euclid(12) + 1) as u32;

        let day = day.min(i64::from(days_in_month(year, month)));
        let date = u32::try_from(day)
            .ok()
            .and_then(|day| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or_else(|| {
                DateExprError::DateRange(format!("no such date {year:04}-{month:02}-{day:02}"))
            })?;

        let resolved = u32::try_from(hour)
            .ok()
            .zip(u32::try_from(minute).ok())
            .and_then(|(hour, minute)| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(|| {
                DateExprError::DateRange(format!("no such time {hour:02}:{minute:02}"))
            })?;

        // One combined chronological delta for the day/hour/minute offsets:
        // plain carry across unit boundaries, no clamping.
        let offset_minutes = days_offset
            .checked_mul(24 * 60)
            .and_then(|m| hours_offset.checked_mul(60).and_then(|h| m.checked_add(h)))
            .and_then(|m| m.checked_add(minutes_offset))
            .ok_or_else(|| DateExprError::DateRange("combined offset".to_string()))?;
        Duration::try_minutes(offset_minutes)
            .and_then(|delta| resolved.checked_add_signed(delta))
            .ok_or_else(|| {
                DateExprError::DateRange(format!("{resolved} with offset of {offset_minutes}m"))
            })
    }
}

// ── Grammar ─────────────────────────────────────────────────────────────────

/// Minimum digit counts for the date fields (year, month, day).
const DATE_FIELDS: [usize; 3] = [4, 2, 2];
/// Minimum digit counts for the time fields (hour, minute).
const TIME_FIELDS: [usize; 2] = [2, 2];

/// Parse an expression into its typed fields.
///
/// The whole string must match
/// `[+-]?d{4,} [+-]?d{2,} [+-]?d{2,} (":" [+-]?d{2,} [+-]?d{2,})?`
/// with no whitespace or extra characters anywhere.
///
/// # Errors
///
/// Returns [`DateExprError::MalformedExpression`] (carrying the input) on
/// any grammar mismatch, or [`DateExprError::DateRange`] for a field whose
/// digits exceed the supported magnitude.
pub fn parse(expression: &str) -> Result<DateExpr> {
    let malformed = || DateExprError::MalformedExpression(expression.to_string());

    let (date_part, time_part) = match expression.split_once(':') {
        Some((date, time)) => (date, Some(time)),
        None => (expression, None),
    };

    let date = split_fields(date_part, &DATE_FIELDS).ok_or_else(malformed)?;
    let time = match time_part {
        Some(part) => {
            let fields = split_fields(part, &TIME_FIELDS).ok_or_else(malformed)?;
            Some(TimeFields {
                hour: classify(fields[0])?,
                minute: classify(fields[1])?,
            })
        }
        None => None,
    };

    Ok(DateExpr {
        year: classify(date[0])?,
        month: classify(date[1])?,
        day: classify(date[2])?,
        time,
    })
}

/// Split `s` into consecutive `[sign] digits` fields, one per entry in
/// `min_digits`, consuming the whole string or failing.
///
/// A sign always starts a new field, but an unsigned digit run can span
/// several fields. The split is greedy from the left with backtracking, so
/// `20000615` divides 4/2/2 while `200006151` divides 5/2/2 (the year takes
/// every digit the remaining fields can spare).
fn split_fields<'a>(s: &'a str, min_digits: &[usize]) -> Option<Vec<&'a str>> {
    let (&min, rest) = match min_digits.split_first() {
        Some(split) => split,
        None => return s.is_empty().then(Vec::new),
    };

    let bytes = s.as_bytes();
    let sign = matches!(bytes.first(), Some(b'+' | b'-')) as usize;
    let run = bytes[sign..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    for len in (min..=run).rev() {
        if let Some(mut fields) = split_fields(&s[sign + len..], rest) {
            fields.insert(0, &s[..sign + len]);
            return Some(fields);
        }
    }
    None
}

/// Classify one raw field: a leading sign makes it relative (the sign is
/// kept, so `-00` is relative zero), otherwise it is absolute.
fn classify(raw: &str) -> Result<FieldValue> {
    let relative = raw.starts_with(['+', '-']);
    let value: i64 = raw
        .parse()
        .map_err(|_| DateExprError::DateRange(format!("field {raw} exceeds supported magnitude")))?;
    Ok(if relative {
        FieldValue::Relative(value)
    } else {
        FieldValue::Absolute(value)
    })
}

// ── Resolution entry points ─────────────────────────────────────────────────

/// Parse `expression` and resolve it against `base`.
///
/// Pure: identical arguments always produce the identical instant, and
/// `base` is never mutated.
///
/// # Errors
///
/// Returns [`DateExprError::MalformedExpression`] on a grammar mismatch,
/// or [`DateExprError::DateRange`] when the computed date cannot be
/// represented.
///
/// # Examples
///
/// ```
/// use analog_datetime::resolve;
/// use chrono::NaiveDate;
///
/// let base = NaiveDate::from_ymd_opt(2024, 6, 15)
///     .unwrap()
///     .and_hms_opt(10, 30, 0)
///     .unwrap();
///
/// // Tomorrow, truncated to midnight.
/// let tomorrow = resolve("-0000-00+01", base).unwrap();
/// assert_eq!(tomorrow.to_string(), "2024-06-16 00:00:00");
///
/// // A fully absolute expression ignores the base entirely.
/// let fixed = resolve("19990701", base).unwrap();
/// assert_eq!(fixed.to_string(), "1999-07-01 00:00:00");
/// ```
pub fn resolve(expression: &str, base: NaiveDateTime) -> Result<NaiveDateTime> {
    parse(expression)?.apply(base)
}

/// Resolve `expression` against the local wall clock.
///
/// The clock is read once per call, at the call boundary.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn resolve_now(expression: &str) -> Result<NaiveDateTime> {
    resolve(expression, Local::now().naive_local())
}

// ── Internal helpers ────────────────────────────────────────────────────────

/// Number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = match month {
        12 => (year.checked_add(1), 1),
        _ => (Some(year), month + 1),
    };
    next_year
        .and_then(|next_year| NaiveDate::from_ymd_opt(next_year, next_month, 1))
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        // Only unreachable past the edge of chrono's year range, where the
        // month is December and 31 is the right answer anyway.
        .unwrap_or(31)
}

// ── Tests ───────────────────────────────────────────────────────────────────
