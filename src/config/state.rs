use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::invoice::LineItem;
use crate::money::Money;

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
    #[serde(default)]
    pub history: Vec<InvoiceRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Counter {
    pub last_number: u32,
    pub last_year: u32,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            last_number: 0,
            last_year: chrono::Utc::now().year() as u32,
        }
    }
}

impl Counter {
    /// Sequence number the next invoice issued in `year` will take
    pub fn next_sequence(&self, year: u32) -> u32 {
        if self.last_year == year {
            self.last_number + 1
        } else {
            1 // Reset for new year
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvoiceRecord {
    pub number: String,
    pub customer: String,
    pub inv_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Money,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    pub file: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Overdue,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => f.pad("PAID"),
            PaymentStatus::Unpaid => f.pad("UNPAID"),
            PaymentStatus::Overdue => f.pad("OVERDUE"),
        }
    }
}

impl InvoiceRecord {
    pub fn status(&self, today: NaiveDate) -> PaymentStatus {
        if self.is_paid {
            PaymentStatus::Paid
        } else if self.due_date < today {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Unpaid
        }
    }

    pub fn outstanding(&self) -> Money {
        if self.is_paid {
            Money::ZERO
        } else {
            self.total_amount
        }
    }
}
