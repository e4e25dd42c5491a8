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
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
	/// Commodities to register on every load, after the ledger file is read.
	pub commodities: Option<Vec<String>>,
	pub report: Option<Report>,
	pub log: Option<Log>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Report {
	/// Decimal places to show in tables; defaults to the most seen in input
	pub precision: Option<u32>,
	pub format: Option<OutputFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Log {
	/// Any tracing filter directive, e.g. "info" or "cropledr=debug".
	/// RUST_LOG takes priority when set.
	pub level: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	#[default]
	Table,
	Json,
}

impl Config {
	pub fn precision(&self) -> Option<u32> {
		self.report.as_ref().and_then(|r| r.precision)
	}

	pub fn format(&self) -> OutputFormat {
		self.report
			.as_ref()
			.and_then(|r| r.format)
			.unwrap_or_default()
	}

	pub fn log_level(&self) -> &str {
		self.log
			.as_ref()
			.and_then(|l| l.level.as_deref())
			.unwrap_or("warn")
	}
}
