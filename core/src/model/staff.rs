use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::projection::FieldMapping;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Tailor,
    Helper,
}

impl Role {
    /// How this role's daily entries are read: stitching entries for
    /// tailors, attendance entries for helpers.
    pub fn mapping(self) -> FieldMapping {
        match self {
            Role::Tailor => FieldMapping::stitching(),
            Role::Helper => FieldMapping::attendance(),
        }
    }
}

/// A staff member together with the daily entries fetched for them.
///
/// Entries are kept as the backend sent them (shift names, staff ids and
/// status words included) and projected by role when salaries are computed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecords {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub records: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRates {
    pub rate_per_piece: f64,
    pub rate_per_shift: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TailorSalary {
    pub id: String,
    pub name: String,
    pub total_pieces: f64,
    pub salary: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelperSalary {
    pub id: String,
    pub name: String,
    pub present_shifts: f64,
    pub salary: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryTotals {
    pub pieces: f64,
    pub shifts: f64,
    pub payout: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SalarySummary {
    pub month: String, // YYYY-MM
    pub tailors: Vec<TailorSalary>,
    pub helpers: Vec<HelperSalary>,
    pub totals: SalaryTotals,
    pub rates: SalaryRates,
}
