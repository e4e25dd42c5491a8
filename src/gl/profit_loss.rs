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

use crate::gl::error::{LedgerError, LedgerResult};
use crate::gl::ledger::{CashFlow, CashFlows, Ledger, Quantities};
use crate::util::date::Date;
use serde::Serialize;

/// One commodity's contribution to a day's profit/loss.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineItem {
	pub commodity: String,
	pub closing_stock: f64,
	pub daily_price: f64,
	pub inflow_outflow: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyProfitLoss {
	pub date: Date,
	pub items: Vec<LineItem>,
	pub total_profit_loss: f64,
	pub cash_inflow: f64,
	pub cash_outflow: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PeriodProfitLoss {
	pub days: Vec<DailyProfitLoss>,
	pub total_period_profit_loss: f64,
	pub total_cash_inflow: f64,
	pub total_cash_outflow: f64,
}

impl DailyProfitLoss {
	/// Profit/loss for a single day. The day must have transactions, prices
	/// and cash flows on record.
	///
	/// The stock reported for each commodity is the stock the day opened
	/// with, i.e. the previous calendar day's closing stock. The period report
	/// reports each day's own closing stock instead.
	pub fn for_day(ledger: &Ledger, day: Date) -> LedgerResult<Self> {
		let (Some(transactions), Some(prices), Some(cash)) = (
			ledger.transactions(&day),
			ledger.prices(&day),
			ledger.cash_flow(&day),
		) else {
			return Err(LedgerError::NotFound(day));
		};

		let opening = day.pred().and_then(|prev| ledger.inventory(&prev));

		Ok(Self::tabulate(day, transactions, opening, Some(prices), Some(cash)))
	}

	/// Values missing from the stock, price or cash records count as zero.
	fn tabulate(
		date: Date,
		transactions: &Quantities,
		stock: Option<&Quantities>,
		prices: Option<&Quantities>,
		cash: Option<&CashFlows>,
	) -> Self {
		let lookup = |record: Option<&Quantities>, commodity: &str| {
			record
				.and_then(|r| r.get(commodity))
				.copied()
				.unwrap_or(0.0)
		};

		let items: Vec<LineItem> = transactions
			.iter()
			.map(|(commodity, quantity)| {
				let daily_price = lookup(prices, commodity);
				LineItem {
					commodity: commodity.clone(),
					closing_stock: lookup(stock, commodity),
					daily_price,
					inflow_outflow: unsigned_zero(quantity * daily_price),
				}
			})
			.collect();

		let cash = cash.map(aggregate_cash).unwrap_or_default();

		Self {
			date,
			total_profit_loss: items
				.iter()
				.fold(0.0, |total, item| total + item.inflow_outflow),
			items,
			cash_inflow: cash.cash_inflow,
			cash_outflow: cash.cash_outflow,
		}
	}
}

impl PeriodProfitLoss {
	/// Profit/loss for every day with transactions, in calendar order, with
	/// totals across the whole period. Days need not have prices or cash flows
	/// on record; whatever is missing counts as zero.
	pub fn from_ledger(ledger: &Ledger) -> Self {
		let mut out = Self::default();

		for day in ledger.transaction_days() {
			let Some(transactions) = ledger.transactions(day) else {
				continue;
			};

			let daily = DailyProfitLoss::tabulate(
				*day,
				transactions,
				ledger.inventory(day),
				ledger.prices(day),
				ledger.cash_flow(day),
			);

			out.total_period_profit_loss += daily.total_profit_loss;
			out.total_cash_inflow += daily.cash_inflow;
			out.total_cash_outflow += daily.cash_outflow;
			out.days.push(daily);
		}

		out
	}
}

/// A sale with no recorded price would otherwise report -0.
fn unsigned_zero(value: f64) -> f64 {
	if value == 0.0 {
		0.0
	} else {
		value
	}
}

/// A day's cash flows summed across every commodity.
fn aggregate_cash(flows: &CashFlows) -> CashFlow {
	flows.values().fold(CashFlow::default(), |acc, flow| CashFlow {
		cash_inflow: acc.cash_inflow + flow.cash_inflow,
		cash_outflow: acc.cash_outflow + flow.cash_outflow,
	})
}
