//! Formation harness: documented stop-limit outcomes checked against the engine.
//!
//! A formation file fixes one side, one bar shape and one stop/limit pair,
//! then slides the bar through the price levels row by row (`F1`, `F2`, ...).
//! File names carry the scenario: `Buy-Bullish-Bar-Formations.csv`,
//! `Sell-Bearish-Bar-Dipping-Formations.csv`.
//!
//! Columns: `Formation,Open,High,Low,Close,Stop,Limit,Stop Fill,Limit Fill`.
//! Fill cells read `Stop (151)`, `Open (148)`, `Limit (147)` or `No fill`.

use barfill_core::domain::{Bar, ExecutionResult, Order, OrderKind, OrderSide};
use barfill_core::engine::stop_limit::{evaluate_stop_limit, StopLimitPhase};
use barfill_core::execute;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormationError {
    #[error("cannot open formation file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot derive scenario from file name '{0}'")]
    FileName(String),

    #[error("{formation}: unreadable fill cell '{cell}'")]
    FillCell { formation: String, cell: String },

    #[error("{formation}: fixture says {expected}, engine produced {actual}")]
    Mismatch {
        formation: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarType {
    Bullish,
    Bearish,
}

/// Side, bar shape and stop/limit arrangement shared by a formation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub side: OrderSide,
    pub bar_type: BarType,
    /// Limit on the pullback side of the stop (buy: limit < stop).
    pub dipping: bool,
}

impl Scenario {
    /// Parse `Buy-Bullish-Bar[-Dipping]-Formations.csv`.
    pub fn from_file_name(name: &str) -> Result<Self, FormationError> {
        let stem = name.strip_suffix(".csv").unwrap_or(name);
        let parts: Vec<&str> = stem.split('-').collect();
        let bad = || FormationError::FileName(name.to_string());

        let side = match parts.first().map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("buy") => OrderSide::Buy,
            Some("sell") => OrderSide::Sell,
            _ => return Err(bad()),
        };
        let bar_type = match parts.get(1).map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("bullish") => BarType::Bullish,
            Some("bearish") => BarType::Bearish,
            _ => return Err(bad()),
        };
        let dipping = parts.iter().any(|p| p.eq_ignore_ascii_case("dipping"));
        Ok(Self {
            side,
            bar_type,
            dipping,
        })
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        let bar = match self.bar_type {
            BarType::Bullish => "bullish",
            BarType::Bearish => "bearish",
        };
        write!(f, "{side}_{bar}")?;
        if self.dipping {
            write!(f, "_dipping")?;
        }
        Ok(())
    }
}

/// Where a documented fill price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillSource {
    Stop,
    Open,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillCell {
    NoFill,
    At { source: FillSource, price: Decimal },
}

impl FillCell {
    pub fn price(self) -> Option<Decimal> {
        match self {
            FillCell::NoFill => None,
            FillCell::At { price, .. } => Some(price),
        }
    }
}

impl FromStr for FillCell {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("no fill") {
            return Ok(FillCell::NoFill);
        }
        let (label, rest) = s.split_once('(').ok_or(())?;
        let price = rest.trim().strip_suffix(')').ok_or(())?;
        let source = match label.trim() {
            "Stop" => FillSource::Stop,
            "Open" => FillSource::Open,
            "Limit" => FillSource::Limit,
            _ => return Err(()),
        };
        let price = Decimal::from_str(price.trim()).map_err(|_| ())?;
        Ok(FillCell::At { source, price })
    }
}

impl fmt::Display for FillCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillCell::NoFill => write!(f, "No fill"),
            FillCell::At { source, price } => write!(f, "{source:?} ({price})"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FormationRow {
    #[serde(rename = "Formation")]
    formation: String,
    #[serde(rename = "Open", with = "rust_decimal::serde::str")]
    open: Decimal,
    #[serde(rename = "High", with = "rust_decimal::serde::str")]
    high: Decimal,
    #[serde(rename = "Low", with = "rust_decimal::serde::str")]
    low: Decimal,
    #[serde(rename = "Close", with = "rust_decimal::serde::str")]
    close: Decimal,
    #[serde(rename = "Stop", with = "rust_decimal::serde::str")]
    stop: Decimal,
    #[serde(rename = "Limit", with = "rust_decimal::serde::str")]
    limit: Decimal,
    #[serde(rename = "Stop Fill")]
    stop_fill: String,
    #[serde(rename = "Limit Fill")]
    limit_fill: String,
}

/// One row of a formation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formation {
    pub scenario: Scenario,
    pub name: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub stop: Decimal,
    pub limit: Decimal,
    pub stop_fill: FillCell,
    pub limit_fill: FillCell,
}

/// Formations are single bars, so any fixed timestamp will do.
const FORMATION_TIME: DateTime<Utc> = DateTime::UNIX_EPOCH;

impl Formation {
    pub fn bar(&self) -> Bar {
        Bar::new(
            FORMATION_TIME,
            self.open,
            self.high,
            self.low,
            self.close,
            1_000_000,
        )
    }

    pub fn order(&self) -> Order {
        Order::stop_limit("1", self.scenario.side, Decimal::ONE_HUNDRED, self.stop, self.limit)
    }

    /// `BUY_bullish_dipping/F7` style label for messages.
    pub fn label(&self) -> String {
        format!("{}/{}", self.scenario, self.name)
    }
}

fn parse_cell(formation: &str, cell: &str) -> Result<FillCell, FormationError> {
    cell.parse().map_err(|_| FormationError::FillCell {
        formation: formation.to_string(),
        cell: cell.to_string(),
    })
}

pub fn read_formations<R: io::Read>(
    scenario: Scenario,
    reader: R,
) -> Result<Vec<Formation>, FormationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader
        .deserialize::<FormationRow>()
        .map(|row| {
            let row = row?;
            Ok(Formation {
                scenario,
                stop_fill: parse_cell(&row.formation, &row.stop_fill)?,
                limit_fill: parse_cell(&row.formation, &row.limit_fill)?,
                name: row.formation,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                stop: row.stop,
                limit: row.limit,
            })
        })
        .collect()
}

/// Load one formation file, taking the scenario from its name.
pub fn load_formations(path: &Path) -> Result<Vec<Formation>, FormationError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FormationError::FileName(path.display().to_string()))?;
    let scenario = Scenario::from_file_name(name)?;
    let file = std::fs::File::open(path).map_err(|source| FormationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_formations(scenario, io::BufReader::new(file))
}

fn describe(result: &ExecutionResult) -> String {
    let fills: Vec<String> = result.fills.iter().map(|f| f.price.to_string()).collect();
    let pending: Vec<String> = result
        .pending
        .iter()
        .map(|p| format!("{}:{:?}", p.order.id, p.order.kind_tag()))
        .collect();
    format!("fills [{}], pending [{}]", fills.join(", "), pending.join(", "))
}

/// Whether a cell's label names where the trigger point came from.
fn source_is(source: FillSource, trigger_point: Decimal, formation: &Formation) -> bool {
    match source {
        FillSource::Stop => trigger_point == formation.stop,
        FillSource::Open => trigger_point == formation.open,
        FillSource::Limit => false,
    }
}

/// The labels describe a path through the two phases; check it is the one taken.
fn labels_follow(formation: &Formation, phase: StopLimitPhase) -> bool {
    use FillCell::{At, NoFill};
    match (formation.stop_fill, formation.limit_fill, phase) {
        (NoFill, NoFill, StopLimitPhase::Pending) => true,
        (At { source, .. }, NoFill, StopLimitPhase::NoFill { trigger_point }) => {
            source_is(source, trigger_point, formation)
        }
        (
            At { source, .. },
            At {
                source: FillSource::Limit,
                ..
            },
            StopLimitPhase::FilledAtLimit { trigger_point, .. },
        ) => source_is(source, trigger_point, formation),
        (
            At { source, .. },
            At {
                source: limit_source,
                ..
            },
            StopLimitPhase::FilledAtTrigger { trigger_point },
        ) => {
            source_is(source, trigger_point, formation)
                && source_is(limit_source, trigger_point, formation)
        }
        _ => false,
    }
}

/// Run the formation through the engine and compare with the documented outcome.
///
/// - no stop fill: nothing fills and the order comes back unchanged
/// - stop fill only: one trigger fill, the limit child pending at the limit price
/// - both: trigger fill then the limit fill, linked by parent id
///
/// Cell labels must match the engine's path too: `Stop`/`Open` say where
/// the trigger point came from, `Limit` that the leg filled after the trigger.
pub fn check_formation(formation: &Formation) -> Result<(), FormationError> {
    let order = formation.order();
    let bar = formation.bar();
    if bar.is_bullish() != (formation.scenario.bar_type == BarType::Bullish) {
        return Err(FormationError::Mismatch {
            formation: formation.label(),
            expected: format!("{:?} bar", formation.scenario.bar_type),
            actual: format!("open {} close {}", bar.open, bar.close),
        });
    }

    let phase = evaluate_stop_limit(formation.scenario.side, formation.stop, formation.limit, &bar);
    if !labels_follow(formation, phase) {
        return Err(FormationError::Mismatch {
            formation: formation.label(),
            expected: format!("{} / {}", formation.stop_fill, formation.limit_fill),
            actual: format!("{phase:?}"),
        });
    }

    let result = execute(&order, &bar, None);
    let mismatch = |expected: String| FormationError::Mismatch {
        formation: formation.label(),
        expected,
        actual: describe(&result),
    };

    match (formation.stop_fill, formation.limit_fill) {
        (FillCell::NoFill, FillCell::NoFill) => {
            let unchanged = result.pending.len() == 1 && result.pending[0].order == order;
            if !result.fills.is_empty() || !unchanged {
                return Err(mismatch("no fill, order pending unchanged".to_string()));
            }
        }
        (FillCell::NoFill, limit @ FillCell::At { .. }) => {
            return Err(mismatch(format!("limit fill {limit} without a stop fill")));
        }
        (stop @ FillCell::At { price: stop_price, .. }, FillCell::NoFill) => {
            let child_ok = result.pending.len() == 1
                && result.pending[0].parent_id.as_ref() == Some(&order.id)
                && result.pending[0].order.kind
                    == OrderKind::Limit {
                        limit_price: formation.limit,
                    };
            if result.fills.len() != 1 || result.fills[0].price != stop_price || !child_ok {
                return Err(mismatch(format!("{stop}, limit child pending")));
            }
        }
        (
            stop @ FillCell::At { price: stop_price, .. },
            limit @ FillCell::At { price: limit_price, .. },
        ) => {
            let linked = result.fills.len() == 2
                && result.fills[1].parent_id.as_ref() == Some(&result.fills[0].order_id);
            if !linked
                || result.fills[0].price != stop_price
                || result.fills[1].price != limit_price
                || !result.pending.is_empty()
            {
                return Err(mismatch(format!("{stop} then {limit}")));
            }
        }
    }
    tracing::trace!(formation = %formation.label(), "formation matches");
    Ok(())
}
