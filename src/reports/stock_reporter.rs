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
use crate::config::config_file::OutputFormat;
use crate::gl::ledger::{Ledger, Quantities};
use crate::reports::table::Table;
use crate::util::date::Date;
use anyhow::Error;
use serde::Serialize;

/// Closing stock of one day, as derived by the ledger.
#[derive(Debug, PartialEq, Serialize)]
pub struct StockDay {
	pub date: Date,
	pub stock: Quantities,
}

/// Reports closing stock per commodity for every day with transactions.
pub struct StockReporter {
	commodities: Vec<String>,
	days: Vec<StockDay>,
}

impl StockReporter {
	pub fn new(ledger: &Ledger) -> Self {
		let days = ledger
			.transaction_days()
			.map(|day| StockDay {
				date: *day,
				stock: ledger.inventory(day).cloned().unwrap_or_default(),
			})
			.collect();

		Self {
			commodities: ledger
				.commodities()
				.into_iter()
				.map(String::from)
				.collect(),
			days,
		}
	}

	pub fn print(
		&self,
		precision: u32,
		format: OutputFormat,
	) -> Result<(), Error> {
		match format {
			OutputFormat::Json => {
				println!("{}", serde_json::to_string_pretty(&self.days)?)
			},
			OutputFormat::Table => {
				if self.days.is_empty() {
					println!("No data");
				} else {
					self.table(precision as usize).print();
				}
			},
		}
		Ok(())
	}

	/// One row per day, one column per commodity.
	fn table(&self, precision: usize) -> Table {
		let mut table = Table::new(self.commodities.len() + 1);
		table.right_align(&(1..=self.commodities.len()).collect::<Vec<_>>());

		let mut header = vec!["Date".to_string()];
		header.extend(self.commodities.iter().cloned());
		table.add_header(&header);
		table.add_separator();

		for day in &self.days {
			let mut row = vec![day.date.to_string()];
			for commodity in &self.commodities {
				let level = day.stock.get(commodity).copied().unwrap_or(0.0);
				row.push(format!("{:.*}", precision, level));
			}
			table.add_row(&row);
		}

		table
	}
}
