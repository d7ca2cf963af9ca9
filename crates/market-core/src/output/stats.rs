//! Summary Statistics
//!
//! Distribution summaries of consumer income and supplier revenue. These are
//! the numbers a histogram would be drawn from; drawing it is left to
//! reporting tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use market_events::MarketSnapshot;

/// Summary of one integer-valued quantity across a population
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub count: usize,
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    /// value -> number of agents holding exactly that value
    pub frequencies: BTreeMap<u32, usize>,
}

impl Distribution {
    pub fn from_values(values: impl IntoIterator<Item = u32>) -> Self {
        let mut frequencies = BTreeMap::new();
        let mut count = 0usize;
        let mut sum = 0u64;
        for value in values {
            *frequencies.entry(value).or_insert(0) += 1;
            count += 1;
            sum += u64::from(value);
        }

        if count == 0 {
            return Self::default();
        }
        Self {
            count,
            min: frequencies.keys().next().copied().unwrap_or(0),
            max: frequencies.keys().next_back().copied().unwrap_or(0),
            mean: sum as f64 / count as f64,
            frequencies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when every observed value is zero (or nothing was observed)
    pub fn all_zero(&self) -> bool {
        self.max == 0
    }
}

/// Income and revenue distributions of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub tick: u64,
    pub trade_count: u64,
    pub consumer_income: Distribution,
    pub supplier_revenue: Distribution,
}

impl MarketSummary {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            trade_count: snapshot.trade_count,
            consumer_income: Distribution::from_values(
                snapshot.consumers().filter_map(|a| a.income()),
            ),
            supplier_revenue: Distribution::from_values(
                snapshot.suppliers().filter_map(|a| a.revenue()),
            ),
        }
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "After {} ticks: {} trades", self.tick, self.trade_count)?;

        let income = &self.consumer_income;
        if income.is_empty() || income.all_zero() {
            writeln!(f, "No income left: every consumer spent everything")?;
        } else {
            writeln!(
                f,
                "Consumer income: n={} min={} max={} mean={:.2}",
                income.count, income.min, income.max, income.mean
            )?;
        }

        let revenue = &self.supplier_revenue;
        if revenue.is_empty() || revenue.all_zero() {
            writeln!(f, "No revenue generated")?;
        } else {
            writeln!(
                f,
                "Supplier revenue: n={} min={} max={} mean={:.2}",
                revenue.count, revenue.min, revenue.max, revenue.mean
            )?;
        }
        Ok(())
    }
}
