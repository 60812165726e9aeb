//! # analog-datetime
//!
//! Parser and resolver for the date expressions used by the Analog web log
//! analyser's `FROM` and `TO` configuration commands.
//!
//! Expressions pack a year, month, day and an optional hour/minute pair into
//! one fixed-shape string, e.g. `20000615` or `19990701:1300`. Any component
//! can instead carry a `+` or `-` prefix, turning it into an offset from a
//! base instant (by default "now"), so a fixed configuration string can name
//! a moving target:
//!
//! ```text
//! FROM -0001-00+01         # from tomorrow last year
//! TO   -0000-0131          # to the end of last month (even if last month
//!                          # did not have 31 days)
//! FROM -0000-00-112
//! TO   -0000-00-01         # the last 16 weeks
//! FROM -0000-00-00:-06+01  # the last 6 hours
//! ```
//!
//! Unlike Analog itself, years always take four or more digits.
//!
//! ## Design principle
//!
//! Resolution is a pure function: [`resolve`] takes the base instant as an
//! explicit argument and never touches the system clock, which keeps it
//! deterministic and trivially testable. [`resolve_now`] reads the local
//! clock exactly once per call for callers who just want "relative to now".
//!
//! Day numbers too large for their (possibly shifted) month always mean the
//! last day of that month, never a rollover into the next one.
//!
//! ## Modules
//!
//! - [`expr`] — grammar, parsed representation, resolution
//! - [`error`] — error types

pub mod error;
pub mod expr;

pub use error::DateExprError;
pub use expr::{parse, resolve, resolve_now, DateExpr, FieldValue, TimeFields};
