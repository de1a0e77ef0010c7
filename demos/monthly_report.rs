use chrono::NaiveDate;
use financial_report_engine::*;

fn main() {
    println!("📊 Monthly Profit Report Demo\n");

    let records = RecordSet {
        orders: vec![
            Order {
                id: "o1".to_string(),
                created_at: Some("2024-03-01T09:00:00".to_string()),
                total_amount: 100_000.0,
                owner_id: "downtown".to_string(),
                items: vec![OrderItem {
                    unit_price: 100_000.0,
                    min_price: None,
                    quantity: 1,
                    service_name: "Wash & Fold".to_string(),
                }],
            },
            Order {
                id: "o2".to_string(),
                created_at: Some("2024-03-15T14:30:00".to_string()),
                total_amount: 200_000.0,
                owner_id: "downtown".to_string(),
                items: vec![OrderItem {
                    unit_price: 40_000.0,
                    min_price: Some(200_000.0),
                    quantity: 2,
                    service_name: "Dry Cleaning".to_string(),
                }],
            },
            Order {
                id: "o3".to_string(),
                created_at: Some("2024-03-16T10:00:00".to_string()),
                total_amount: 80_000.0,
                owner_id: "riverside".to_string(),
                items: Vec::new(),
            },
        ],
        variable_costs: vec![VariableCost {
            id: "c1".to_string(),
            date: Some("2024-03-10".to_string()),
            amount: 45_000.0,
            owner_id: "downtown".to_string(),
            category: CostCategory::Materials,
        }],
        fixed_costs: vec![
            FixedCostItem {
                id: "rent".to_string(),
                name: "Rent".to_string(),
                amount: 3_100_000.0,
                owner_id: "downtown".to_string(),
            },
            FixedCostItem {
                id: "rent-r".to_string(),
                name: "Rent".to_string(),
                amount: 1_550_000.0,
                owner_id: "riverside".to_string(),
            },
        ],
        ..Default::default()
    };

    let config = ReportingConfig {
        organization_name: "Demo Laundry".to_string(),
        ..Default::default()
    };
    let engine = ReportEngine::new(&records, config);
    let now = NaiveDate::from_ymd_opt(2024, 3, 20)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();

    for period in ReportPeriod::ALL {
        let totals = engine.aggregate(&TenantScope::single("downtown"), period, now);
        println!(
            "  {:<13} revenue {:>12.2}  costs {:>12.2}  profit {:>13.2}",
            period.as_str(),
            totals.total_revenue,
            totals.total_costs,
            totals.profit
        );
    }

    let report = engine.report(&TenantScope::single("downtown"), ReportPeriod::ThisMonth, now);
    println!("\n🧾 Revenue by service:");
    for service in &report.summary.revenue_by_service {
        println!("  {:<14} {:>12.2} ({} units)", service.name, service.revenue, service.count);
    }

    match report.series_csv() {
        Ok(csv) => {
            println!("\n📈 First week of the series:");
            for line in csv.lines().take(8) {
                println!("  {}", line);
            }
        }
        Err(e) => eprintln!("❌ Error: {}", e),
    }

    let tenants = vec!["downtown".to_string(), "riverside".to_string()];
    if let Err(e) = engine.config().check_comparison_selection(&tenants) {
        eprintln!("❌ Error: {}", e);
        return;
    }

    println!("\n🏪 Store comparison (this month):");
    for row in engine.compare(&tenants, ReportPeriod::ThisMonth, now) {
        println!(
            "  {:<10} revenue {:>12.2}  profit {:>13.2}  AOV {:>10.2}",
            row.tenant_id,
            row.aggregate.total_revenue,
            row.aggregate.profit,
            row.aggregate.average_order_value()
        );
    }
}
