use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Completed,
    Partial,
    Pending,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Pending => "Pending",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" | "paid" => Ok(PaymentStatus::Completed),
            "partial" => Ok(PaymentStatus::Partial),
            "pending" | "unpaid" => Ok(PaymentStatus::Pending),
            _ => Err(format!("unknown payment status '{}'", s)),
        }
    }
}

/// A batch of pieces received from a client, later dispatched and paid for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trunk {
    pub trunk_number: String,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub expected_payment: f64,
    #[serde(default)]
    pub payment_amount: f64,
    #[serde(default)]
    pub is_dispatched: bool,
    #[serde(default)]
    pub received_date: Option<String>,
}

impl Trunk {
    /// A trunk only counts as completed once it is both paid in full and
    /// dispatched; a paid trunk still on the floor stays pending.
    pub fn payment_status(&self) -> PaymentStatus {
        if self.payment_amount >= self.expected_payment && self.is_dispatched {
            PaymentStatus::Completed
        } else if self.payment_amount > 0.0 && self.payment_amount < self.expected_payment {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }

    pub fn outstanding(&self) -> f64 {
        (self.expected_payment - self.payment_amount).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrunkFilter {
    pub dispatched: Option<bool>,
    pub status: Option<PaymentStatus>,
}

impl TrunkFilter {
    pub fn matches(&self, trunk: &Trunk) -> bool {
        if let Some(dispatched) = self.dispatched {
            if trunk.is_dispatched != dispatched {
                return false;
            }
        }
        if let Some(status) = self.status {
            if trunk.payment_status() != status {
                return false;
            }
        }
        true
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct TrunkTotals {
    pub count: usize,
    pub quantity: u64,
    pub expected: f64,
    pub paid: f64,
    pub outstanding: f64,
}
