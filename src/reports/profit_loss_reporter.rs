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
use crate::gl::profit_loss::{DailyProfitLoss, PeriodProfitLoss};
use crate::reports::table::Table;
use anyhow::Error;

pub struct ProfitLossReporter {
	precision: usize,
	format: OutputFormat,
}

impl ProfitLossReporter {
	pub fn new(precision: u32, format: OutputFormat) -> Self {
		Self {
			precision: precision as usize,
			format,
		}
	}

	pub fn print_daily(&self, report: &DailyProfitLoss) -> Result<(), Error> {
		match self.format {
			OutputFormat::Json => {
				println!("{}", serde_json::to_string_pretty(report)?)
			},
			OutputFormat::Table => {
				println!("Profit/loss for {}", report.date);
				self.daily_table(report).print();
			},
		}
		Ok(())
	}

	pub fn print_period(&self, report: &PeriodProfitLoss) -> Result<(), Error> {
		match self.format {
			OutputFormat::Json => {
				println!("{}", serde_json::to_string_pretty(report)?)
			},
			OutputFormat::Table => {
				if let (Some(first), Some(last)) =
					(report.days.first(), report.days.last())
				{
					println!(
						"Profit/loss from {} to {} ({} days)",
						first.date,
						last.date,
						first.date.until(&last.date) + 1
					);
				}
				self.period_table(report).print()
			},
		}
		Ok(())
	}

	/// Stock here is what the day opened with.
	fn daily_table(&self, report: &DailyProfitLoss) -> Table {
		let mut table = Table::new(4);
		table.right_align(&[1, 2, 3]);
		table.add_header(&["Commodity", "Opening", "Price", "Inflow/Outflow"]);
		table.add_separator();

		for item in &report.items {
			table.add_row(&[
				item.commodity.clone(),
				self.num(item.closing_stock),
				self.num(item.daily_price),
				self.num(item.inflow_outflow),
			]);
		}

		table.add_partial_separator(&[3]);
		table.add_row(&["Total", "", "", self.num(report.total_profit_loss).as_str()]);
		table.add_row(&["Cash in", "", "", self.num(report.cash_inflow).as_str()]);
		table.add_row(&["Cash out", "", "", self.num(report.cash_outflow).as_str()]);
		table
	}

	/// Stock here is each day's closing stock.
	fn period_table(&self, report: &PeriodProfitLoss) -> Table {
		let mut table = Table::new(7);
		table.right_align(&[2, 3, 4, 5, 6]);
		table.add_header(&[
			"Date",
			"Commodity",
			"Closing",
			"Price",
			"Inflow/Outflow",
			"Cash In",
			"Cash Out",
		]);
		table.add_separator();

		for day in &report.days {
			let date = day.date.to_string();
			for (i, item) in day.items.iter().enumerate() {
				table.add_row(&[
					if i == 0 { date.clone() } else { String::new() },
					item.commodity.clone(),
					self.num(item.closing_stock),
					self.num(item.daily_price),
					self.num(item.inflow_outflow),
				]);
			}
			table.add_row(&[
				"",
				"",
				"",
				"",
				self.num(day.total_profit_loss).as_str(),
				self.num(day.cash_inflow).as_str(),
				self.num(day.cash_outflow).as_str(),
			]);
		}

		table.add_separator();
		table.add_row(&[
			"Period",
			"",
			"",
			"",
			self.num(report.total_period_profit_loss).as_str(),
			self.num(report.total_cash_inflow).as_str(),
			self.num(report.total_cash_outflow).as_str(),
		]);
		table
	}

	fn num(&self, value: f64) -> String {
		format!("{:.*}", self.precision, value)
	}
}
