use stitchline_core::model::staff::SalarySummary;
use stitchline_core::model::trunk::{Trunk, TrunkTotals};
use stitchline_core::{Dataset, Report};
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SalaryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Worked")]
    worked: String,
    #[tabled(rename = "Salary (₹)")]
    salary: String,
}

#[derive(Tabled)]
struct TrunkRow {
    #[tabled(rename = "Trunk")]
    number: String,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Dispatched")]
    dispatched: String,
    #[tabled(rename = "Expected (₹)")]
    expected: String,
    #[tabled(rename = "Paid (₹)")]
    paid: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn show_report(dataset: Dataset, report: &Report) {
    let query = &report.query;
    let period = match (query.year, query.month) {
        (Some(y), Some(m)) => format!("{:04}-{:02}", y, m),
        (Some(y), None) => y.to_string(),
        _ => "all dates".to_string(),
    };

    println!("\n\x1b[1;36m{} by {}\x1b[0m ({}, {} buckets)", dataset, query.granularity, period, report.buckets.len());

    if report.buckets.is_empty() {
        println!("No records in this period.");
        return;
    }

    // Bucket table: one column per metric
    let mut builder = Builder::default();
    let mut header = vec!["Bucket".to_string()];
    header.extend(query.metrics.iter().cloned());
    builder.push_record(header);

    for bucket in &report.buckets {
        let mut row = vec![bucket.label.clone()];
        row.extend(query.metrics.iter().map(|m| format_value(bucket.value(m))));
        builder.push_record(row);
    }
    print_table(builder.build());

    // Summary table
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Total", "Peak", "Average", "Consistency"].map(String::from));
    for metric in &query.metrics {
        if let Some(s) = report.summary.metric(metric) {
            let consistency = s
                .consistency_ratio
                .map(|r| format!("{:.0}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                metric.clone(),
                format_value(s.total),
                format_value(s.peak),
                format!("{:.2}", s.average),
                consistency,
            ]);
        }
    }
    print_table(builder.build());
}

pub fn show_salary(summary: &SalarySummary) {
    println!(
        "\n\x1b[1;36mSalaries for {}\x1b[0m (₹{}/piece, ₹{}/shift)",
        summary.month,
        format_value(summary.rates.rate_per_piece),
        format_value(summary.rates.rate_per_shift)
    );

    let mut rows = Vec::new();
    for t in &summary.tailors {
        rows.push(SalaryRow {
            name: t.name.clone(),
            role: "Tailor".to_string(),
            worked: format!("{} pieces", format_value(t.total_pieces)),
            salary: format!("{:.2}", t.salary),
        });
    }
    for h in &summary.helpers {
        rows.push(SalaryRow {
            name: h.name.clone(),
            role: "Helper".to_string(),
            worked: format!("{} shifts", format_value(h.present_shifts)),
            salary: format!("{:.2}", h.salary),
        });
    }

    if rows.is_empty() {
        println!("No staff found.");
        return;
    }
    print_table(Table::new(rows));

    let totals = &summary.totals;
    println!(
        "Total pieces: {}  Total shifts: {}  Total payout: ₹{:.2}",
        format_value(totals.pieces),
        format_value(totals.shifts),
        totals.payout
    );
}

pub fn show_trunks(trunks: &[&Trunk], totals: &TrunkTotals) {
    if trunks.is_empty() {
        println!("No trunks match.");
        return;
    }

    let rows: Vec<TrunkRow> = trunks
        .iter()
        .map(|t| TrunkRow {
            number: t.trunk_number.clone(),
            item: t.item_type.clone(),
            quantity: t.quantity,
            dispatched: if t.is_dispatched { "yes" } else { "no" }.to_string(),
            expected: format!("{:.2}", t.expected_payment),
            paid: format!("{:.2}", t.payment_amount),
            status: t.payment_status().to_string(),
        })
        .collect();
    print_table(Table::new(rows));

    println!(
        "{} trunks, {} pieces  Expected: ₹{:.2}  Paid: ₹{:.2}  Outstanding: ₹{:.2}",
        totals.count, totals.quantity, totals.expected, totals.paid, totals.outstanding
    );
}

fn print_table(mut table: Table) {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN)); // Header color
    println!("{}", table);
}

/// Whole numbers print without decimals (counts), the rest with two (money).
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
