/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
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
use crate::util::date::Date;
use thiserror::Error;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors the ledger engine hands back to its caller. Values that are merely
/// missing for one commodity on one day are not errors; they read as zero.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
	#[error("invalid date: {0} (expected YYYY-MM-DD)")]
	InvalidDayKey(String),
	#[error("data not available for {0}")]
	NotFound(Date),
	#[error("invalid commodity name: {0:?}")]
	InvalidCommodity(String),
}
