use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::loader::{load_file, REQUIRED_COLUMNS};
use crate::models::{month_abbrev, SalesRecord, YearRange, MONTHS};
use crate::settings::{default_data_dir, load_settings, save_settings, shellexpand_path};

const DEMO_FILE: &str = "demo_automobile_sales.csv";

/// Vehicle classes with a typical monthly sales volume and advertising spend.
struct VehicleProfile {
    name: &'static str,
    base_sales: f64,
    base_expenditure: f64,
}

const VEHICLES: &[VehicleProfile] = &[
    VehicleProfile {
        name: "Superminicar",
        base_sales: 2400.0,
        base_expenditure: 2600.0,
    },
    VehicleProfile {
        name: "Smallfamiliycar",
        base_sales: 2900.0,
        base_expenditure: 3100.0,
    },
    VehicleProfile {
        name: "Mediumfamilycar",
        base_sales: 3100.0,
        base_expenditure: 3400.0,
    },
    VehicleProfile {
        name: "Executivecar",
        base_sales: 1700.0,
        base_expenditure: 4200.0,
    },
    VehicleProfile {
        name: "Sports",
        base_sales: 1300.0,
        base_expenditure: 3800.0,
    },
];

/// Years flagged as recession periods.
const RECESSION_YEARS: &[i32] = &[1980, 1981, 1982, 1991, 2000, 2001, 2007, 2008, 2009, 2020];

/// Seasonal multiplier per calendar month.
const SEASONALITY: [f64; 12] = [
    0.85, 0.88, 1.02, 1.05, 1.08, 1.10, 1.04, 1.06, 0.98, 0.96, 0.97, 1.01,
];

fn round_to(v: f64, places: i32) -> f64 {
    let m = 10f64.powi(places);
    (v * m).round() / m
}

/// One record per month for every year in `years`, reproducible for a given seed.
pub fn generate(seed: u64, years: YearRange) -> Vec<SalesRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(years.len() * 12);

    for year in years.years() {
        let recession = RECESSION_YEARS.contains(&year);
        // Slow upward trend across the decades.
        let trend = 1.0 + (year - years.start()) as f64 * 0.01;
        for (i, month) in MONTHS.iter().enumerate() {
            let vehicle = &VEHICLES[rng.gen_range(0..VEHICLES.len())];
            let (sales_factor, spend_factor, unemployment) = if recession {
                (rng.gen_range(0.45..0.7), rng.gen_range(0.6..0.85), rng.gen_range(6.5..11.0))
            } else {
                (rng.gen_range(0.9..1.15), rng.gen_range(0.9..1.2), rng.gen_range(3.0..6.5))
            };
            records.push(SalesRecord {
                year,
                month: *month,
                automobile_sales: round_to(
                    vehicle.base_sales * trend * sales_factor * SEASONALITY[i],
                    1,
                ),
                vehicle_type: vehicle.name.to_string(),
                total_expenditure: round_to(vehicle.base_expenditure * trend * spend_factor, 0),
                unemployment_rate: round_to(unemployment, 1),
                recession,
            });
        }
    }
    records
}

pub fn write_csv(path: &Path, records: &[SalesRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(REQUIRED_COLUMNS)?;
    for r in records {
        wtr.write_record([
            r.year.to_string(),
            month_abbrev(r.month).to_string(),
            r.automobile_sales.to_string(),
            r.vehicle_type.clone(),
            r.total_expenditure.to_string(),
            r.unemployment_rate.to_string(),
            if r.recession { "1" } else { "0" }.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(output: Option<String>, seed: u64) -> Result<()> {
    let mut settings = load_settings();
    let years = settings.year_range()?;
    let path = output
        .map(|o| PathBuf::from(shellexpand_path(&o)))
        .unwrap_or_else(|| default_data_dir().join(DEMO_FILE));

    let records = generate(seed, years);
    write_csv(&path, &records)?;
    let data = load_file(&path)?;

    settings.data_file = path.to_string_lossy().to_string();
    save_settings(&settings)?;

    println!("Wrote {} demo records to {}", data.len(), path.display());
    println!("Run `autosales` to open the dashboard.");
    Ok(())
}
