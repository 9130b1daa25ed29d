//! # Split Payment Form
//!
//! Editable tender rows for one settlement.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Settle 80.00 for Sita                                                  │
//! │                                                                         │
//! │   Cash     [ 50      ]                                                  │
//! │   Fonepay  [ 30.00   ]                                                  │
//! │                                                                         │
//! │   Tendered 80.00   Remaining 0.00          [ Confirm ]  ◄── enabled     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows keep the raw text the cashier typed. Every read goes through
//! [`parse_amount`], so `is_confirm_enabled` always reflects the latest edit.

use serde::{Deserialize, Serialize};

use tally_core::split::{parse_amount, validate_split};
use tally_core::{Money, PaymentMethod, SplitPaymentRow};

/// One row as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRow {
    pub method: PaymentMethod,
    pub raw: String,
}

impl FormRow {
    pub fn amount(&self) -> Money {
        parse_amount(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitForm {
    target: Money,
    rows: Vec<FormRow>,
}

impl SplitForm {
    /// A form with no rows.
    pub fn new(target: Money) -> Self {
        SplitForm {
            target,
            rows: Vec::new(),
        }
    }

    /// A form with one row pre-filled with the whole target, the usual
    /// single-tender case.
    pub fn single(method: PaymentMethod, target: Money) -> Self {
        let mut form = Self::new(target);
        form.rows.push(FormRow {
            method,
            raw: target.to_string(),
        });
        form
    }

    pub fn target(&self) -> Money {
        self.target
    }

    pub fn raw_rows(&self) -> &[FormRow] {
        &self.rows
    }

    /// Appends an empty row and returns its index.
    pub fn add_row(&mut self, method: PaymentMethod) -> usize {
        self.rows.push(FormRow {
            method,
            raw: String::new(),
        });
        self.rows.len() - 1
    }

    /// Replaces a row's text. Returns false for an unknown index.
    pub fn set_amount(&mut self, index: usize, raw: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.raw = raw.into();
                true
            }
            None => false,
        }
    }

    pub fn set_method(&mut self, index: usize, method: PaymentMethod) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.method = method;
                true
            }
            None => false,
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Option<FormRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Parsed rows, skipping rows that parse to zero.
    pub fn rows(&self) -> Vec<SplitPaymentRow> {
        self.rows
            .iter()
            .map(|row| SplitPaymentRow::new(row.method, row.amount()))
            .filter(|row| !row.amount.is_zero())
            .collect()
    }

    pub fn tendered(&self) -> Money {
        self.rows.iter().map(FormRow::amount).sum()
    }

    /// Target minus tendered; negative when over-tendered.
    pub fn remaining(&self) -> Money {
        self.target - self.tendered()
    }

    pub fn is_confirm_enabled(&self) -> bool {
        validate_split(&self.rows(), self.target)
    }
}
