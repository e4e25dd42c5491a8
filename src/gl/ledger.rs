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
use crate::util::date::Date;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// commodity -> a number (quantity delta, closing stock, or unit price)
pub type Quantities = BTreeMap<String, f64>;

/// commodity -> cash moved on that commodity's account for one day
pub type CashFlows = BTreeMap<String, CashFlow>;

/// Cash received and paid out, each kept as a non-negative total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CashFlow {
	pub cash_inflow: f64,
	pub cash_outflow: f64,
}

impl CashFlow {
	/// Positive amounts are received, negative amounts are paid out.
	pub fn accumulate(&mut self, amount: f64) {
		if amount >= 0.0 {
			self.cash_inflow += amount;
		} else {
			self.cash_outflow += amount.abs();
		}
	}
}

/// The central data structure of this system. It keeps, for every day that
/// has data, the quantities traded, the resulting closing stock, the unit
/// prices and the cash that moved, all keyed by commodity name.
///
/// Closing stock is never set directly. It is derived from the previous
/// calendar day's closing stock plus the day's transactions whenever that
/// day's transactions are recorded. Later days are not recomputed on their
/// own; callers that change history replay them explicitly, either through
/// add_commodity or finalize.
#[derive(Debug, Default)]
pub struct Ledger {
	transactions: BTreeMap<Date, Quantities>,
	/// derived; see roll_forward
	inventory: BTreeMap<Date, Quantities>,
	prices: BTreeMap<Date, Quantities>,
	cash_flows: BTreeMap<Date, CashFlows>,
}

impl Ledger {
	pub fn new() -> Self {
		Default::default()
	}

	// -----------
	// -- INPUT --
	// -----------

	/// Sets the quantities traded on the given day, replacing whatever was
	/// recorded for that day before, and rolls that day's inventory forward.
	pub fn record_transaction(&mut self, day: Date, quantities: Quantities) {
		if self.transactions.insert(day, quantities).is_some() {
			warn!(%day, "transactions recorded twice; keeping the latest");
		}
		self.roll_forward(day);
	}

	pub fn record_prices(&mut self, day: Date, prices: Quantities) {
		if self.prices.insert(day, prices).is_some() {
			warn!(%day, "prices recorded twice; keeping the latest");
		}
	}

	/// Adds signed cash amounts to the given day. Unlike transactions and
	/// prices, repeated calls for the same day accumulate, and so does the
	/// same commodity appearing more than once in one call.
	pub fn record_cash_flow<I>(&mut self, day: Date, amounts: I)
	where
		I: IntoIterator<Item = (String, f64)>,
	{
		let record = self.cash_flows.entry(day).or_default();
		for (commodity, amount) in amounts {
			record.entry(commodity).or_default().accumulate(amount);
		}
	}

	// ------------------
	// -- ROLL-FORWARD --
	// ------------------

	/// Derives the closing stock of the given day from the closing stock of
	/// the calendar day before it (or nothing, if that day has no inventory)
	/// plus the day's transactions. Replaces any inventory previously derived
	/// for the day. Does nothing for days without transactions.
	pub fn roll_forward(&mut self, day: Date) {
		let Some(transactions) = self.transactions.get(&day) else {
			return;
		};

		let mut stock = day
			.pred()
			.and_then(|prev| self.inventory.get(&prev))
			.cloned()
			.unwrap_or_default();

		for (commodity, delta) in transactions {
			*stock.entry(commodity.clone()).or_insert(0.0) += delta;
		}

		debug!(%day, commodities = stock.len(), "rolled inventory forward");
		self.inventory.insert(day, stock);
	}

	/// Rolls every day with transactions forward again in ascending calendar
	/// order, so each day builds on its predecessor's final stock. Loaders
	/// call this once after all input is read; records that arrived out of
	/// order or were corrected partway through are only consistent after it.
	pub fn finalize(&mut self) {
		let days: Vec<Date> = self.transactions.keys().copied().collect();
		for day in &days {
			self.roll_forward(*day);
		}
		debug!(days = days.len(), "ledger finalized");
	}

	// ------------------
	// -- REGISTRATION --
	// ------------------

	/// Introduces a commodity into every day already on record: a zero
	/// quantity in each day's transactions (rolling each affected day forward
	/// in calendar order), a zero price in each day's prices, and an empty
	/// cash flow in each day's cash flows. Days that already know the
	/// commodity are left untouched, so calling this twice changes nothing
	/// the second time.
	///
	/// Returns the number of transaction days that needed back-filling.
	pub fn add_commodity(&mut self, name: &str) -> LedgerResult<usize> {
		let name = name.trim();
		if name.is_empty() {
			return Err(LedgerError::InvalidCommodity(name.to_string()));
		}

		// BTreeMap keys iterate in ascending order, which roll_forward
		// depends on: each day reads the stock the previous one just wrote.
		let backfill: Vec<Date> = self
			.transactions
			.iter()
			.filter(|(_, quantities)| !quantities.contains_key(name))
			.map(|(day, _)| *day)
			.collect();

		for day in &backfill {
			if let Some(quantities) = self.transactions.get_mut(day) {
				quantities.insert(name.to_string(), 0.0);
			}
			self.roll_forward(*day);
		}

		for prices in self.prices.values_mut() {
			prices.entry(name.to_string()).or_insert(0.0);
		}

		for flows in self.cash_flows.values_mut() {
			flows.entry(name.to_string()).or_default();
		}

		if !backfill.is_empty() {
			info!(commodity = name, days = backfill.len(), "commodity added");
		}

		Ok(backfill.len())
	}

	// ------------
	// -- CHECKS --
	// ------------

	/// Finds possible data integrity concerns without changing anything:
	/// days whose stored closing stock no longer matches the stock of the
	/// day before plus the day's transactions (history changed without a
	/// replay), commodities whose closing stock went negative, and days with
	/// transactions but no prices.
	pub fn check(&self) -> Vec<String> {
		let mut warnings = vec![];

		for (day, transactions) in &self.transactions {
			let opening = day.pred().and_then(|prev| self.inventory.get(&prev));
			let closing = self.inventory.get(day);

			for (commodity, delta) in transactions {
				let before = opening
					.and_then(|stock| stock.get(commodity))
					.copied()
					.unwrap_or(0.0);
				let after = closing
					.and_then(|stock| stock.get(commodity))
					.copied()
					.unwrap_or(0.0);

				if after != before + delta {
					warnings.push(format!(
						"[{}] closing stock of {} is {}, expected {}",
						day,
						commodity,
						after,
						before + delta
					));
				}
			}

			if let Some(stock) = closing {
				for (commodity, &level) in stock {
					if level < 0.0 {
						warnings.push(format!(
							"[{}] closing stock of {} is negative ({})",
							day, commodity, level
						));
					}
				}
			}

			if !self.prices.contains_key(day) {
				warnings.push(format!(
					"[{}] transactions recorded without prices",
					day
				));
			}
		}

		warnings
	}

	// ------------
	// -- ACCESS --
	// ------------

	pub fn transactions(&self, day: &Date) -> Option<&Quantities> {
		self.transactions.get(day)
	}

	pub fn inventory(&self, day: &Date) -> Option<&Quantities> {
		self.inventory.get(day)
	}

	pub fn prices(&self, day: &Date) -> Option<&Quantities> {
		self.prices.get(day)
	}

	pub fn cash_flow(&self, day: &Date) -> Option<&CashFlows> {
		self.cash_flows.get(day)
	}

	/// Days with transactions, in ascending calendar order.
	pub fn transaction_days(&self) -> impl Iterator<Item = &Date> {
		self.transactions.keys()
	}

	/// Every commodity that appears in any day's transactions.
	pub fn commodities(&self) -> BTreeSet<&str> {
		self.transactions
			.values()
			.flat_map(|quantities| quantities.keys())
			.map(String::as_str)
			.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.transactions.is_empty()
			&& self.prices.is_empty()
			&& self.cash_flows.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn day(s: &str) -> Date {
		Date::from_str(s).unwrap()
	}

	fn quantities(items: &[(&str, f64)]) -> Quantities {
		items.iter().map(|(c, q)| (c.to_string(), *q)).collect()
	}

	fn amounts(items: &[(&str, f64)]) -> Vec<(String, f64)> {
		items.iter().map(|(c, q)| (c.to_string(), *q)).collect()
	}

	#[test]
	fn test_ledger_initialization() {
		let ledger = Ledger::new();
		assert!(ledger.is_empty());
		assert!(ledger.commodities().is_empty());
		assert_eq!(ledger.transaction_days().count(), 0);
	}

	#[test]
	fn test_first_day_opens_at_zero() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(
			day("2024-01-01"),
			quantities(&[("wheat", 100.0), ("corn", -5.0)]),
		);

		let stock = ledger.inventory(&day("2024-01-01")).unwrap();
		assert_eq!(stock, &quantities(&[("wheat", 100.0), ("corn", -5.0)]));
	}

	#[test]
	fn test_roll_forward_over_consecutive_days() {
		let mut ledger = Ledger::new();
		let sequence = [
			("2024-01-01", quantities(&[("wheat", 100.0)])),
			("2024-01-02", quantities(&[("wheat", -30.0), ("corn", 12.5)])),
			("2024-01-03", quantities(&[("corn", -2.5)])),
			("2024-01-04", quantities(&[("wheat", 5.0), ("corn", 0.0)])),
		];
		for (d, q) in &sequence {
			ledger.record_transaction(day(d), q.clone());
		}

		for (d, q) in &sequence {
			let today = day(d);
			let prev = today.pred().unwrap();
			let closing = ledger.inventory(&today).unwrap();
			for commodity in ["wheat", "corn"] {
				let before = ledger
					.inventory(&prev)
					.and_then(|s| s.get(commodity))
					.copied()
					.unwrap_or(0.0);
				let delta = q.get(commodity).copied().unwrap_or(0.0);
				assert_eq!(
					closing.get(commodity).copied().unwrap_or(0.0),
					before + delta,
					"{} on {}",
					commodity,
					d
				);
			}
		}

		// wheat is absent from day 3 but still carried forward
		let day3 = ledger.inventory(&day("2024-01-03")).unwrap();
		assert_eq!(day3.get("wheat"), Some(&70.0));
		assert_eq!(day3.get("corn"), Some(&10.0));
	}

	#[test]
	fn test_gap_day_restarts_from_zero() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.record_transaction(day("2024-01-03"), quantities(&[("wheat", 10.0)]));

		let stock = ledger.inventory(&day("2024-01-03")).unwrap();
		assert_eq!(stock.get("wheat"), Some(&10.0));
	}

	#[test]
	fn test_roll_forward_is_idempotent() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", -30.0)]));

		let first = ledger.inventory(&day("2024-01-02")).cloned();
		ledger.roll_forward(day("2024-01-02"));
		ledger.roll_forward(day("2024-01-02"));
		assert_eq!(ledger.inventory(&day("2024-01-02")).cloned(), first);
	}

	#[test]
	fn test_roll_forward_without_transactions_is_noop() {
		let mut ledger = Ledger::new();
		ledger.record_prices(day("2024-01-01"), quantities(&[("wheat", 2.0)]));
		ledger.roll_forward(day("2024-01-01"));
		assert!(ledger.inventory(&day("2024-01-01")).is_none());
	}

	#[test]
	fn test_roll_forward_replaces_stale_inventory() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", 5.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("corn", 1.0)]));

		let stock = ledger.inventory(&day("2024-01-02")).unwrap();
		assert_eq!(stock, &quantities(&[("corn", 1.0)]));
	}

	#[test]
	fn test_correction_does_not_cascade_until_finalized() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", -30.0)]));

		// correct day one after day two was already derived from it
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 50.0)]));
		let stale = ledger.inventory(&day("2024-01-02")).unwrap();
		assert_eq!(stale.get("wheat"), Some(&70.0));
		let mismatches: Vec<String> = ledger
			.check()
			.into_iter()
			.filter(|w| w.contains("expected"))
			.collect();
		assert_eq!(mismatches, vec!["[2024-01-02] closing stock of wheat is 70, expected 20"]);

		ledger.finalize();
		let fixed = ledger.inventory(&day("2024-01-02")).unwrap();
		assert_eq!(fixed.get("wheat"), Some(&20.0));
	}

	#[test]
	fn test_finalize_repairs_out_of_order_input() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", -30.0)]));
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.finalize();

		let stock = ledger.inventory(&day("2024-01-02")).unwrap();
		assert_eq!(stock.get("wheat"), Some(&70.0));
	}

	#[test]
	fn test_prices_overwrite() {
		let mut ledger = Ledger::new();
		ledger.record_prices(day("2024-01-01"), quantities(&[("wheat", 2.0)]));
		ledger.record_prices(day("2024-01-01"), quantities(&[("corn", 3.0)]));

		let prices = ledger.prices(&day("2024-01-01")).unwrap();
		assert_eq!(prices, &quantities(&[("corn", 3.0)]));
		assert!(ledger.inventory(&day("2024-01-01")).is_none());
	}

	#[test]
	fn test_cash_flow_accumulates() {
		let mut ledger = Ledger::new();
		ledger.record_cash_flow(day("2024-01-01"), amounts(&[("wheat", 5.0)]));
		ledger.record_cash_flow(day("2024-01-01"), amounts(&[("wheat", -3.0)]));

		let flow = ledger.cash_flow(&day("2024-01-01")).unwrap();
		assert_eq!(
			flow.get("wheat"),
			Some(&CashFlow {
				cash_inflow: 5.0,
				cash_outflow: 3.0
			})
		);
	}

	#[test]
	fn test_cash_flow_repeated_commodity_in_one_call() {
		let mut ledger = Ledger::new();
		ledger.record_cash_flow(
			day("2024-01-01"),
			amounts(&[("wheat", 10.0), ("wheat", 2.5), ("wheat", -4.0)]),
		);

		let flow = ledger.cash_flow(&day("2024-01-01")).unwrap();
		assert_eq!(flow["wheat"].cash_inflow, 12.5);
		assert_eq!(flow["wheat"].cash_outflow, 4.0);
	}

	#[test]
	fn test_add_commodity_backfills_every_record() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", -30.0)]));
		ledger.record_prices(day("2024-01-01"), quantities(&[("wheat", 2.0)]));
		ledger.record_prices(day("2024-01-03"), quantities(&[("wheat", 2.5)]));
		ledger.record_cash_flow(day("2024-01-01"), amounts(&[("wheat", 200.0)]));

		assert_eq!(ledger.add_commodity("barley"), Ok(2));

		for d in ["2024-01-01", "2024-01-02"] {
			assert_eq!(ledger.transactions(&day(d)).unwrap()["barley"], 0.0);
			assert_eq!(ledger.inventory(&day(d)).unwrap()["barley"], 0.0);
		}
		for d in ["2024-01-01", "2024-01-03"] {
			assert_eq!(ledger.prices(&day(d)).unwrap()["barley"], 0.0);
		}
		assert_eq!(
			ledger.cash_flow(&day("2024-01-01")).unwrap()["barley"],
			CashFlow::default()
		);

		// existing values are untouched
		assert_eq!(ledger.inventory(&day("2024-01-02")).unwrap()["wheat"], 70.0);
		assert_eq!(ledger.prices(&day("2024-01-01")).unwrap()["wheat"], 2.0);
		assert!(ledger.commodities().contains("barley"));
		assert!(ledger.check().iter().all(|w| !w.contains("expected")));
	}

	#[test]
	fn test_add_commodity_keeps_existing_values() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("oats", 4.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", 1.0)]));
		ledger.record_prices(day("2024-01-01"), quantities(&[("oats", 9.0)]));
		ledger.record_cash_flow(day("2024-01-01"), amounts(&[("oats", -36.0)]));

		assert_eq!(ledger.add_commodity("oats"), Ok(1));

		assert_eq!(ledger.transactions(&day("2024-01-01")).unwrap()["oats"], 4.0);
		assert_eq!(ledger.inventory(&day("2024-01-02")).unwrap()["oats"], 4.0);
		assert_eq!(ledger.prices(&day("2024-01-01")).unwrap()["oats"], 9.0);
		assert_eq!(
			ledger.cash_flow(&day("2024-01-01")).unwrap()["oats"].cash_outflow,
			36.0
		);
	}

	#[test]
	fn test_add_commodity_is_idempotent() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 100.0)]));
		ledger.record_transaction(day("2024-01-02"), quantities(&[("wheat", -30.0)]));
		ledger.record_prices(day("2024-01-01"), quantities(&[("wheat", 2.0)]));
		ledger.record_cash_flow(day("2024-01-01"), amounts(&[("wheat", 200.0)]));

		ledger.add_commodity("barley").unwrap();
		let transactions = ledger.transactions.clone();
		let inventory = ledger.inventory.clone();
		let prices = ledger.prices.clone();
		let cash_flows = ledger.cash_flows.clone();

		assert_eq!(ledger.add_commodity("barley"), Ok(0));
		assert_eq!(ledger.transactions, transactions);
		assert_eq!(ledger.inventory, inventory);
		assert_eq!(ledger.prices, prices);
		assert_eq!(ledger.cash_flows, cash_flows);
	}

	#[test]
	fn test_add_commodity_rejects_blank_name() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", 1.0)]));

		assert_eq!(
			ledger.add_commodity("  "),
			Err(LedgerError::InvalidCommodity("".to_string()))
		);
		assert_eq!(ledger.transactions(&day("2024-01-01")).unwrap().len(), 1);
	}

	#[test]
	fn test_check_reports_negative_stock_and_missing_prices() {
		let mut ledger = Ledger::new();
		ledger.record_transaction(day("2024-01-01"), quantities(&[("wheat", -1.0)]));

		let warnings = ledger.check();
		assert_eq!(warnings.len(), 2);
		assert!(warnings[0].contains("negative"));
		assert!(warnings[1].contains("without prices"));
	}
}
