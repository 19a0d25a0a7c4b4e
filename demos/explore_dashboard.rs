// Walks through one dashboard session: summary, forecast, holiday scenario, export, segments
use std::env;
use store_forecast_workspace::demand_forecast::export::export_file_name;
use store_forecast_workspace::{Dashboard, DashboardConfig, ModelKind};

fn main() -> store_forecast_workspace::Result<()> {
    // Optional path to a JSON config; defaults otherwise
    let config = match env::args().nth(1) {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    let dashboard = Dashboard::open(config)?;
    let stores = dashboard.store_ids();
    println!("Loaded {} stores\n", stores.len());

    let Some(&store_id) = stores.first() else {
        return Ok(());
    };

    println!("=== Store {} ===", store_id);
    println!("{}", dashboard.store_summary(store_id)?);

    for kind in [ModelKind::Sarima, ModelKind::Prophet] {
        println!("\n=== {} forecast, 14 days ===", kind);
        let forecast = match dashboard.forecast(store_id, kind, 14) {
            Ok(forecast) => forecast,
            Err(e) => {
                println!("unavailable: {}", e);
                continue;
            }
        };

        let holiday = dashboard.holiday_scenario(&forecast, 15.0)?;
        for (base, up) in forecast.rows().iter().zip(holiday.rows()) {
            println!(
                "{}  {:>10.1}  holiday {:>10.1}  [{:.1}, {:.1}]",
                base.date, base.predicted, up.predicted, up.lower_bound, up.upper_bound
            );
        }

        println!("\n{}:", export_file_name(store_id));
        print!("{}", dashboard.export_csv(&holiday)?);
    }

    println!("\n=== Store segments ===");
    match dashboard.segment_stores() {
        Ok(segmentation) => {
            for label in 0..segmentation.k() {
                println!("cluster {}: {:?}", label, segmentation.members(label));
            }
        }
        Err(e) => println!("unavailable: {}", e),
    }

    Ok(())
}
