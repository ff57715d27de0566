use crate::error::ProjectionError;
use crate::model::record::DatedRecord;
use crate::model::trunk::{Trunk, TrunkFilter, TrunkTotals};

pub fn filter_trunks<'a>(trunks: &'a [Trunk], filter: &TrunkFilter) -> Vec<&'a Trunk> {
    trunks.iter().filter(|t| filter.matches(t)).collect()
}

pub fn trunk_totals(trunks: &[&Trunk]) -> TrunkTotals {
    let mut totals = TrunkTotals::default();
    for trunk in trunks {
        totals.count += 1;
        totals.quantity += u64::from(trunk.quantity);
        totals.expected += trunk.expected_payment;
        totals.paid += trunk.payment_amount;
        totals.outstanding += trunk.outstanding();
    }
    totals
}

/// Trunks as dated records keyed by their received date, for charting
/// payments over time. A trunk without a received date cannot be placed.
pub fn trunk_records(trunks: &[&Trunk]) -> Result<Vec<DatedRecord>, ProjectionError> {
    trunks
        .iter()
        .enumerate()
        .map(|(index, t)| {
            let date = t.received_date.clone().ok_or_else(|| ProjectionError::MissingDate {
                index,
                field: "receivedDate".to_string(),
            })?;
            Ok(DatedRecord::new(date)
                .with_metric("expectedPayment", t.expected_payment)
                .with_metric("totalPaid", t.payment_amount)
                .with_metric("quantity", f64::from(t.quantity)))
        })
        .collect()
}
