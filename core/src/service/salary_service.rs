use crate::error::SalaryError;
use crate::model::attendance::PRESENT_SHIFTS;
use crate::model::bucket::Granularity;
use crate::model::staff::{
    HelperSalary, Role, SalaryRates, SalarySummary, SalaryTotals, StaffRecords, TailorSalary,
};
use crate::service::aggregator::TimeSeriesAggregator;
use tracing::debug;

pub const STITCHED_COUNT: &str = "stitchedCount";

/// Monthly pay: tailors by pieces stitched, helpers by shifts present.
pub struct SalaryService {
    aggregator: TimeSeriesAggregator,
}

impl SalaryService {
    pub fn new(aggregator: TimeSeriesAggregator) -> Self {
        Self { aggregator }
    }

    pub fn compute(
        &self,
        staff: &[StaffRecords],
        year: i32,
        month: u32,
        rates: SalaryRates,
    ) -> Result<SalarySummary, SalaryError> {
        check_rate("ratePerPiece", rates.rate_per_piece)?;
        check_rate("ratePerShift", rates.rate_per_shift)?;

        let mut tailors = Vec::new();
        let mut helpers = Vec::new();
        let mut totals = SalaryTotals::default();

        for member in staff {
            match member.role {
                Role::Tailor => {
                    let pieces = self.monthly_total(member, year, month, STITCHED_COUNT)?;
                    let salary = pieces * rates.rate_per_piece;
                    totals.pieces += pieces;
                    totals.payout += salary;
                    tailors.push(TailorSalary {
                        id: member.id.clone(),
                        name: member.name.clone(),
                        total_pieces: pieces,
                        salary,
                    });
                }
                Role::Helper => {
                    let shifts = self.monthly_total(member, year, month, PRESENT_SHIFTS)?;
                    let salary = shifts * rates.rate_per_shift;
                    totals.shifts += shifts;
                    totals.payout += salary;
                    helpers.push(HelperSalary {
                        id: member.id.clone(),
                        name: member.name.clone(),
                        present_shifts: shifts,
                        salary,
                    });
                }
            }
        }

        debug!(
            tailors = tailors.len(),
            helpers = helpers.len(),
            payout = totals.payout,
            "computed salaries"
        );

        Ok(SalarySummary {
            month: format!("{:04}-{:02}", year, month),
            tailors,
            helpers,
            totals,
            rates,
        })
    }

    fn monthly_total(
        &self,
        member: &StaffRecords,
        year: i32,
        month: u32,
        metric: &str,
    ) -> Result<f64, SalaryError> {
        let records = member
            .role
            .mapping()
            .project_all(&member.records)
            .map_err(|source| SalaryError::Records { id: member.id.clone(), source })?;
        let in_month = self.aggregator.filter_by_period(&records, year, month)?;
        let buckets = self.aggregator.aggregate(&in_month, Granularity::Monthly, &[metric])?;
        let stats = self.aggregator.summarize(&buckets, &[metric], None)?;
        Ok(stats.metric(metric).map(|m| m.total).unwrap_or(0.0))
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), SalaryError> {
    if value < 0.0 || !value.is_finite() {
        return Err(SalaryError::InvalidRate { name, value });
    }
    Ok(())
}
