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
use std::fmt::Write;

const COLUMN_GAP: &str = "   ";

/// Column-aligned text table for the profit/loss and stock reports. Rows are
/// collected first and rendered in one go, since every column's width
/// depends on its widest cell.
pub struct Table {
	column_count: usize,
	rows: Vec<Row>,
	right_align: Vec<bool>, // indicates columns by index
}

enum Row {
	Header(Vec<String>),
	Data(Vec<String>),
	Separator,
	PartialSeparator(Vec<bool>), // indicates columns by index
}

impl Table {
	pub fn new(column_count: usize) -> Self {
		Self {
			column_count,
			rows: Vec::new(),
			right_align: vec![false; column_count],
		}
	}

	pub fn add_header<S: ToString>(&mut self, row: &[S]) {
		let cells = self.fit(row);
		self.rows.push(Row::Header(cells));
	}

	pub fn add_row<S: ToString>(&mut self, row: &[S]) {
		let cells = self.fit(row);
		self.rows.push(Row::Data(cells));
	}

	pub fn add_separator(&mut self) {
		self.rows.push(Row::Separator);
	}

	/// Adds a separator row under the selected columns only.
	pub fn add_partial_separator(&mut self, indices: &[usize]) {
		let mut cols = vec![false; self.column_count];
		for &i in indices {
			if i < self.column_count {
				cols[i] = true;
			}
		}
		self.rows.push(Row::PartialSeparator(cols));
	}

	/// Specifies columns that should be right-aligned by index.
	pub fn right_align(&mut self, cols: &[usize]) {
		for &col in cols {
			if col < self.column_count {
				self.right_align[col] = true;
			}
		}
	}

	pub fn print(&self) {
		println!();
		print!("{}", self.render());
	}

	pub fn render(&self) -> String {
		let mut max_widths = vec![0; self.column_count];
		for row in &self.rows {
			if let Row::Data(cells) | Row::Header(cells) = row {
				for (i, value) in cells.iter().enumerate() {
					max_widths[i] = max_widths[i].max(value.chars().count());
				}
			}
		}

		let mut out = String::new();
		for row in &self.rows {
			let line = match row {
				Row::Header(cells) => cells
					.iter()
					.enumerate()
					.map(|(i, v)| Table::center_align(v, max_widths[i]))
					.collect::<Vec<_>>()
					.join(" | "),
				Row::Data(cells) => cells
					.iter()
					.enumerate()
					.map(|(i, v)| self.align(i, v, max_widths[i]))
					.collect::<Vec<_>>()
					.join(COLUMN_GAP),
				Row::Separator => {
					let total = max_widths.iter().sum::<usize>()
						+ COLUMN_GAP.len() * (self.column_count.max(1) - 1);
					"-".repeat(total)
				},
				Row::PartialSeparator(draw) => draw
					.iter()
					.enumerate()
					.map(|(i, &d)| {
						let fill = if d { "-" } else { " " };
						fill.repeat(max_widths[i])
					})
					.collect::<Vec<_>>()
					.join(COLUMN_GAP),
			};
			// writing to a String cannot fail
			let _ = writeln!(out, "{}", line.trim_end());
		}

		out
	}

	/// Pads or truncates a row to exactly column_count cells.
	fn fit<S: ToString>(&self, row: &[S]) -> Vec<String> {
		let mut cells: Vec<String> =
			row.iter().take(self.column_count).map(|s| s.to_string()).collect();
		cells.resize(self.column_count, String::new());
		cells
	}

	fn align(&self, col: usize, value: &str, width: usize) -> String {
		if self.right_align[col] {
			format!("{:>width$}", value, width = width)
		} else {
			format!("{:<width$}", value, width = width)
		}
	}

	fn center_align(value: &str, width: usize) -> String {
		let len = value.chars().count();
		if len >= width {
			return value.to_string();
		}
		let total_padding = width - len;
		let left_padding = total_padding / 2;
		let right_padding = total_padding - left_padding;

		format!(
			"{}{}{}",
			" ".repeat(left_padding),
			value,
			" ".repeat(right_padding)
		)
	}
}
