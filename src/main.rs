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
use crate::config::config_file::{Config, OutputFormat};
use crate::gl::ledger::Ledger;
use crate::gl::profit_loss::{DailyProfitLoss, PeriodProfitLoss};
use crate::parsing::filesystem::Filesystem;
use crate::parsing::parser::ParseResult;
use crate::reports::profit_loss_reporter::ProfitLossReporter;
use crate::reports::stock_reporter::StockReporter;
use crate::util::date::Date;
use anyhow::{bail, Error};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod gl;
mod parsing;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "cropledr",
	version = "1.0",
	about = "Daily commodity ledger and profit/loss tool"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	/// The date for the Daily command (YYYY-MM-DD)
	#[arg(required = false)]
	term: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// Specifies the input file
	#[arg(short)]
	file: String,

	/// Custom config file location (default: ~/.config/cropledr/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Register a commodity across all days after loading (repeatable)
	#[arg(short, long = "add")]
	add: Vec<String>,

	/// Print reports as JSON instead of tables
	#[arg(long)]
	json: bool,

	/// Decimal places to show for amounts in tables
	#[arg(short, long)]
	precision: Option<u32>,
}

impl Cli {
	/// The point is that this number exceeds what anyone wants; it's just to
	/// stop the program from printing e.g. millions of zeroes by accident
	const MAX_PRECISION: u32 = 50;

	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if let Some(prec) = self.precision {
			if prec > Cli::MAX_PRECISION {
				bail!("Maximum precision is {}", Cli::MAX_PRECISION);
			}
		}

		match (&self.command, &self.term) {
			(Directive::Daily, None) => bail!("No date specified"),
			(Directive::Daily, Some(_)) | (_, None) => {},
			(_, Some(term)) => bail!("Unexpected argument: {}", term),
		}

		Ok(())
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Daily, // profit/loss for one day
	Total, // profit/loss for every day, with period totals

	Stock, // closing stock per day

	Check, // find possible data integrity concerns
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;

	let fs = Filesystem::new();
	let config = fs.get_config(args.config.as_ref())?;
	init_tracing(config.log_level());
	debug!(
		path = args.config.as_deref().unwrap_or("default"),
		"config loaded"
	);

	let mut ledger = Ledger::new();
	let mut parser = parsing::parser::Parser::new();
	let parse_result = parser.parse(&args.file, &mut ledger)?;

	finalize_ledger(&mut ledger, &parse_result, &config, &args.add)?;

	let precision = args
		.precision
		.or(config.precision())
		.unwrap_or(parse_result.max_precision)
		.min(Cli::MAX_PRECISION);
	let format = if args.json {
		OutputFormat::Json
	} else {
		config.format()
	};

	match args.command {
		Directive::Daily => {
			let date = match &args.term {
				Some(term) => Date::from_str(term)?,
				None => bail!("No date specified"),
			};
			let report = DailyProfitLoss::for_day(&ledger, date)?;
			ProfitLossReporter::new(precision, format).print_daily(&report)?;
		},
		Directive::Total => {
			let report = PeriodProfitLoss::from_ledger(&ledger);
			ProfitLossReporter::new(precision, format).print_period(&report)?;
		},
		Directive::Stock => {
			StockReporter::new(&ledger).print(precision, format)?;
		},
		Directive::Check => {
			for warning in ledger.check() {
				println!("{}", warning);
			}
			println!("Done");
		},
	}

	Ok(())
}

/// Registers every declared commodity (ledger file directives first, then
/// config, then command line) and replays inventory across all days, so that
/// reports see a ledger consistent with the whole input.
fn finalize_ledger(
	ledger: &mut Ledger,
	parse_result: &ParseResult,
	config: &Config,
	extra: &[String],
) -> Result<(), Error> {
	let declared = parse_result
		.commodities
		.iter()
		.chain(config.commodities.iter().flatten())
		.chain(extra);

	for commodity in declared {
		let days = ledger.add_commodity(commodity)?;
		debug!(commodity = commodity.as_str(), days, "registered commodity");
	}

	if ledger.is_empty() {
		info!("ledger is empty");
	}

	ledger.finalize();
	Ok(())
}

/// Logs go to stderr so that reports on stdout stay machine-readable.
/// RUST_LOG takes priority over the configured level.
fn init_tracing(default_level: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_level))
		.unwrap_or_else(|_| EnvFilter::new("warn"));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
