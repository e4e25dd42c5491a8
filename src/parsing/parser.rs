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
use crate::gl::ledger::{Ledger, Quantities};
use crate::parsing::filesystem::Filesystem;
use crate::util::date::Date;
use anyhow::{anyhow, bail, Error};
use regex::Regex;
use std::fs::File;
use std::io;
use std::io::{BufRead, Seek};
use tracing::debug;

pub struct Parser {
	fs: Filesystem,
	token_regex: Regex,
}

impl Parser {
	pub fn new() -> Self {
		let re = Regex::new(r#""([^"]*)"|(\S+)"#).unwrap();
		Self {
			token_regex: re,
			fs: Filesystem::new(),
		}
	}

	/// Opens and parses the file at file_path into the passed Ledger. We make
	/// two passes through the file: the first follows includes and collects
	/// directives, and the second records every day's quantities, prices and
	/// cash into the ledger in the order they appear.
	///
	/// Records are applied as they are read, so a day's inventory may be
	/// rolled forward before the days preceding it are known. Callers should
	/// finalize the ledger once everything else has been applied.
	pub fn parse(
		&mut self,
		file_path: &str,
		ledger: &mut Ledger,
	) -> Result<ParseResult, Error> {
		let mut file = self.fs.open(file_path)?;

		let mut output: ParseResult = Default::default();
		self.first_pass(file_path, &file, &mut output)?;
		file.rewind()?;

		self.second_pass(&file, ledger, &mut output)?;

		debug!(
			file = file_path,
			records = output.records,
			"ledger file parsed"
		);
		Ok(output)
	}

	/// First pass to process only includes and directive lines. Includes cause
	/// this to be called recursively, so the Filesystem keeps track of the
	/// files it has seen to block circular inclusion.
	fn first_pass(
		&mut self,
		path: &str,
		file: &File,
		parse_result: &mut ParseResult,
	) -> Result<(), Error> {
		self.fs.declare_file(path)?;

		let reader = io::BufReader::new(file);

		for (i, line) in reader.lines().enumerate() {
			let l = strip_comment(&line?);
			if l.is_empty() {
				continue;
			}

			if l.starts_with("include") {
				let include = self.tokenize(&l);
				if include.len() != 2 {
					bail!("Invalid include (line {})", i + 1)
				}

				let file = self.fs.open(&include[1])?;
				self.first_pass(&include[1], &file, parse_result)?;
				continue;
			}

			let Some(directive) = l.strip_prefix('!') else {
				continue;
			};

			let parts = self.tokenize(directive);
			match parts.first().map(String::as_str) {
				Some("commodity") if parts.len() == 2 => {
					if parts[1].trim().is_empty() {
						bail!("Empty commodity name (line {})", i + 1);
					}
					parse_result.commodities.push(parts[1].clone());
				},
				_ => bail!("Invalid directive (line {}): {}", i + 1, l),
			}
		}

		Ok(())
	}

	/// Second pass to record everything other than directives. Includes are
	/// followed again here without tracking, because first_pass would already
	/// have failed on a circular include.
	fn second_pass(
		&mut self,
		file: &File,
		ledger: &mut Ledger,
		parse_result: &mut ParseResult,
	) -> Result<(), Error> {
		let reader = io::BufReader::new(file);

		for (i, line) in reader.lines().enumerate() {
			let l = strip_comment(&line?);

			if l.is_empty() || l.starts_with('!') {
				continue;
			}

			if l.starts_with("include") {
				let include = self.tokenize(&l);
				let file = self.fs.open(&include[1])?;
				self.second_pass(&file, ledger, parse_result)?;
				continue;
			}

			self.record_line(&l, ledger, parse_result)
				.map_err(|e| anyhow!("{} (line {})", e, i + 1))?;
		}

		Ok(())
	}

	/// Handles one record line of the form
	/// `<date> <qty|price|cash> <commodity> <amount> [<commodity> <amount>...]`
	fn record_line(
		&self,
		line: &str,
		ledger: &mut Ledger,
		parse_result: &mut ParseResult,
	) -> Result<(), Error> {
		let parts = self.tokenize(line);
		if parts.len() < 4 || parts.len() % 2 != 0 {
			bail!("Invalid record: {}", line);
		}

		let date = Date::from_str(&parts[0])?;
		let kind = parts[1].as_str();

		let mut amounts = Vec::with_capacity((parts.len() - 2) / 2);
		for pair in parts[2..].chunks(2) {
			if pair[0].trim().is_empty() {
				bail!("Empty commodity name");
			}
			let (value, precision) = parse_amount(&pair[1])?;
			parse_result.note_precision(precision);
			amounts.push((pair[0].clone(), value));
		}

		match kind {
			"qty" => ledger.record_transaction(date, unique(amounts)?),
			"price" => {
				if let Some((commodity, _)) =
					amounts.iter().find(|(_, price)| *price < 0.0)
				{
					bail!("Negative price for {}", commodity);
				}
				ledger.record_prices(date, unique(amounts)?)
			},
			"cash" => ledger.record_cash_flow(date, amounts),
			_ => bail!("Unknown record type: {}", kind),
		}

		parse_result.records += 1;
		Ok(())
	}

	/// Splits by whitespace except terms surrounded by quotations, which
	/// allow commodity names and timestamps that contain spaces.
	fn tokenize(&self, input: &str) -> Vec<String> {
		self.token_regex
			.captures_iter(input)
			.map(|cap| {
				// Capture either the quoted group or the unquoted group
				cap.get(1).map_or_else(
					move || cap[2].to_string(),
					|m| m.as_str().to_string(),
				)
			})
			.collect()
	}
}

/// Cuts the line at the first `#` outside quotes.
fn strip_comment(line: &str) -> String {
	let mut quoted = false;
	let end = line
		.char_indices()
		.find(|&(_, c)| {
			if c == '"' {
				quoted = !quoted;
			}
			c == '#' && !quoted
		})
		.map_or(line.len(), |(i, _)| i);

	line[..end].trim().to_string()
}

/// Parses a decimal amount, also returning how many decimal places it was
/// written with. Thousands separators are allowed anywhere in the amount.
fn parse_amount(input: &str) -> Result<(f64, u32), Error> {
	let digits = input.replace(',', "");
	let value: f64 = digits
		.parse()
		.map_err(|_| anyhow!("Invalid amount: {}", input))?;
	if !value.is_finite() {
		bail!("Invalid amount: {}", input);
	}

	let precision = digits
		.split_once('.')
		.map(|(_, decimals)| decimals.len() as u32)
		.unwrap_or(0);

	Ok((value, precision))
}

/// Quantities and prices name each commodity at most once per line.
fn unique(amounts: Vec<(String, f64)>) -> Result<Quantities, Error> {
	let mut out = Quantities::new();
	for (commodity, value) in amounts {
		if out.insert(commodity.clone(), value).is_some() {
			bail!("Commodity {} listed twice", commodity);
		}
	}
	Ok(out)
}

#[derive(Debug, Default)]
pub struct ParseResult {
	/// Commodities declared with `!commodity`, in file order
	pub commodities: Vec<String>,
	/// Greatest number of decimal places used by any amount
	pub max_precision: u32,
	/// Number of record lines applied to the ledger
	pub records: usize,
}

impl ParseResult {
	fn note_precision(&mut self, precision: u32) {
		self.max_precision = self.max_precision.max(precision);
	}
}
