/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use crate::gl::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Serialize, Serializer};
use std::fmt;

/// Timestamp layouts accepted in addition to plain dates and RFC 3339. The
/// time of day is discarded; only the calendar date survives.
const TIMESTAMP_FORMATS: [&str; 2] =
	["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// The day-granularity key every ledger record is indexed by. However a date
/// arrives (plain date, naive timestamp, timestamp with an offset), equal
/// calendar days always produce equal keys, so nothing inside the ledger ever
/// compares raw date representations.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(NaiveDate);

impl Date {
	/// Parses "YYYY-MM-DD", optionally followed by a time of day, or any
	/// RFC 3339 timestamp. Offset-bearing timestamps keep the calendar date
	/// as written, not the date in UTC.
	pub fn from_str(date_str: &str) -> LedgerResult<Date> {
		let s = date_str.trim();

		if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
			return Ok(Date(d));
		}

		if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
			return Ok(Date::from_datetime(&dt));
		}

		TIMESTAMP_FORMATS
			.iter()
			.find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
			.map(|dt| Date::from_naive_datetime(&dt))
			.ok_or_else(|| LedgerError::InvalidDayKey(date_str.to_string()))
	}

	pub fn from_naive(date: NaiveDate) -> Date {
		Date(date)
	}

	pub fn from_naive_datetime(dt: &NaiveDateTime) -> Date {
		Date(dt.date())
	}

	pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Date {
		Date(dt.date_naive())
	}

	/// The calendar day immediately before this one, if representable.
	pub fn pred(&self) -> Option<Date> {
		self.0.pred_opt().map(Date)
	}

	/// Days since 0001-01-01 (which is day 1). Strictly increasing with the
	/// calendar, so consecutive days differ by exactly one.
	pub fn ordinal(&self) -> i32 {
		self.0.num_days_from_ce()
	}

	/// Number of days between two dates, always in positive terms.
	pub fn until(&self, other: &Date) -> u32 {
		(other.ordinal() - self.ordinal()).unsigned_abs()
	}
}

impl From<NaiveDate> for Date {
	fn from(date: NaiveDate) -> Self {
		Date::from_naive(date)
	}
}

impl fmt::Display for Date {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.format("%Y-%m-%d"))
	}
}

impl Serialize for Date {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}
