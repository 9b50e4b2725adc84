//! Subscription periods and their English titles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    /// Singular duration title ("month").
    pub fn duration_title(&self) -> &'static str {
        match self {
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "week",
            PeriodUnit::Month => "month",
            PeriodUnit::Year => "year",
        }
    }

    /// Short unit used after a price ("$4.99/mo").
    pub fn abbreviation(&self) -> &'static str {
        match self {
            PeriodUnit::Day => "day",
            PeriodUnit::Week => "wk",
            PeriodUnit::Month => "mo",
            PeriodUnit::Year => "yr",
        }
    }
}

/// A billing period, e.g. 3 months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionPeriod {
    pub value: u32,
    pub unit: PeriodUnit,
}

impl SubscriptionPeriod {
    pub fn new(value: u32, unit: PeriodUnit) -> Self {
        Self { value, unit }
    }

    pub fn monthly() -> Self {
        Self::new(1, PeriodUnit::Month)
    }

    pub fn yearly() -> Self {
        Self::new(1, PeriodUnit::Year)
    }

    /// "1 month", "3 months".
    pub fn period_title(&self) -> String {
        pluralize(self.value, self.unit)
    }

    /// Unit shown after a per-period price: "mo" for one month, "3 mo" for
    /// a quarter.
    pub fn abbreviated_unit(&self) -> String {
        if self.value == 1 {
            self.unit.abbreviation().to_string()
        } else {
            format!("{} {}", self.value, self.unit.abbreviation())
        }
    }
}

/// "1 week", "2 weeks".
pub fn pluralize(count: u32, unit: PeriodUnit) -> String {
    let title = format!("{count} {}", unit.duration_title());
    if count > 1 { title + "s" } else { title }
}
