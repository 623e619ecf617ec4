//! Truckload Headless Allocation Harness
//!
//! Validates the planner and the stock fleet fixture without any UI.
//! Runs entirely in-process — no files written, no rendering.
//!
//! Usage:
//!   cargo run -p truckload-simtest
//!   cargo run -p truckload-simtest -- --verbose
//!   cargo run -p truckload-simtest -- --seed 7 --iterations 500
//!   cargo run -p truckload-simtest -- --fleet my_fleet.json --config strict.json

use std::path::{Path, PathBuf};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::filter::LevelFilter;

use truckload_core::depot::Depot;
use truckload_core::persistence::{load_fleet_json, load_snapshot, save_snapshot};
use truckload_core::seed::STOCK_FLEET_JSON;
use truckload_core::store::{FleetSnapshot, MemoryStore, RecordStore};
use truckload_logic::allocator::{allocate, load_transporter, AllocationPlan, DevicePool};
use truckload_logic::config::PackingConfig;
use truckload_logic::manifest::render_plan;
use truckload_logic::priority::{is_priority_ordered, sort_by_priority};
use truckload_logic::records::{Device, Driver, Transporter};

// ── Command line ────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(about = "Headless allocation harness for Truckload")]
struct Cli {
    /// Print manifests, per-check details and debug logs.
    #[arg(long)]
    verbose: bool,

    /// Seed for the random fleet sweep.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of random fleets to plan.
    #[arg(long, default_value_t = 200)]
    iterations: usize,

    /// Fleet fixture to load instead of the stock fleet.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    fleet: Option<PathBuf>,

    /// Packing config (JSON) to use instead of the defaults.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let opts = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(opts.verbose))
        .with_target(false)
        .init();

    println!("=== Truckload Allocation Harness ===\n");

    let config = match load_config(opts.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            std::process::exit(2);
        }
    };

    log::debug!("packing config: {:?}", config);

    let mut results = Vec::new();

    // 1. Fleet fixture validation
    let fleet = match load_fleet(opts.fleet.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("fleet error: {}", e);
            std::process::exit(2);
        }
    };
    results.extend(validate_fleet(&fleet, opts.verbose));

    // 2. Depot run over the fleet
    results.extend(validate_depot_run(&fleet, &config, opts.verbose));

    // 3. Reference scenarios
    results.extend(validate_scenarios());

    // 4. Snapshot persistence
    results.extend(validate_snapshot(&fleet));

    // 5. Seeded random sweep
    results.extend(validate_random_sweep(opts.seed, opts.iterations, opts.verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Driverless transporters are listed in the manifests; their warnings only
/// print with `--verbose`.
fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::ERROR
    }
}

fn load_config(path: Option<&Path>) -> Result<PackingConfig, String> {
    match path {
        None => Ok(PackingConfig::default()),
        Some(p) => {
            let text =
                std::fs::read_to_string(p).map_err(|e| format!("{}: {}", p.display(), e))?;
            serde_json::from_str(&text).map_err(|e| format!("{}: {}", p.display(), e))
        }
    }
}

fn load_fleet(path: Option<&Path>) -> Result<FleetSnapshot, String> {
    let text = match path {
        None => STOCK_FLEET_JSON.to_string(),
        Some(p) => std::fs::read_to_string(p).map_err(|e| format!("{}: {}", p.display(), e))?,
    };
    load_fleet_json(&text).map_err(|e| e.to_string())
}

// ── Property checks shared by every section ─────────────────────────────

/// Units before == units after + units packed, for every device.
fn check_conservation(
    before: &[Device],
    after: &[Device],
    plan: &AllocationPlan,
) -> Result<(), String> {
    for d in before {
        let left = after
            .iter()
            .find(|a| a.id == d.id)
            .map(|a| a.units as u64)
            .unwrap_or(0);
        let packed = plan.units_packed(d.id);
        if d.units as u64 != left + packed {
            return Err(format!(
                "{}: {} != {} left + {} packed",
                d.name, d.units, left, packed
            ));
        }
    }
    Ok(())
}

/// Driver + cargo never exceeds capacity.
fn check_feasibility(plan: &AllocationPlan, drivers: &[Driver]) -> Result<(), String> {
    for load in &plan.loads {
        let driver_g = load
            .driver
            .and_then(|id| drivers.iter().find(|d| d.id == id))
            .map(|d| d.weight_g())
            .unwrap_or(0);
        if load.is_empty() {
            continue;
        }
        if load.cargo_g() as i64 + driver_g > load.capacity_g {
            return Err(format!(
                "{} overloaded: {} g cargo + {} g driver > {} g",
                load.transporter,
                load.cargo_g(),
                driver_g,
                load.capacity_g
            ));
        }
    }
    Ok(())
}

/// Step through transporters one at a time; after each step no device with
/// stock left may still fit. That is the greedy guarantee.
fn check_greedy(
    devices: &[Device],
    transporters: &[Transporter],
    drivers: &[Driver],
) -> Result<(), String> {
    let mut pool = DevicePool::new(devices.to_vec());
    for (transporter, driver) in transporters.iter().zip(drivers) {
        let load = load_transporter(&mut pool, transporter, driver);
        if let Some(d) = pool
            .devices()
            .iter()
            .find(|d| d.units > 0 && (d.weight_g as i64) <= load.remaining_capacity_g())
        {
            return Err(format!(
                "{} still fits on {} ({} g free)",
                d.name,
                transporter.id,
                load.remaining_capacity_g()
            ));
        }
    }
    Ok(())
}

fn outcome(name: &str, check: Result<(), String>, ok_detail: &str) -> TestResult {
    match check {
        Ok(()) => TestResult {
            name: name.into(),
            passed: true,
            detail: ok_detail.into(),
        },
        Err(detail) => TestResult {
            name: name.into(),
            passed: false,
            detail,
        },
    }
}

// ── 1. Fleet Fixture ────────────────────────────────────────────────────

fn validate_fleet(fleet: &FleetSnapshot, verbose: bool) -> Vec<TestResult> {
    println!("--- Fleet Fixture ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "fleet_not_empty".into(),
        passed: !fleet.devices.is_empty() && !fleet.transporters.is_empty(),
        detail: format!(
            "{} devices, {} drivers, {} transporters",
            fleet.devices.len(),
            fleet.drivers.len(),
            fleet.transporters.len()
        ),
    });

    let errors = truckload_logic::validation::validate_inputs(
        &fleet.devices,
        &fleet.transporters,
        &fleet.drivers,
    );
    results.push(TestResult {
        name: "fleet_valid_records".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "all records valid".into()
        } else {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let mut sorted = fleet.devices.clone();
    sort_by_priority(&mut sorted);
    results.push(TestResult {
        name: "fleet_priority_sort".into(),
        passed: is_priority_ordered(&sorted),
        detail: format!(
            "best ratio first: {}",
            sorted.first().map(|d| d.name.as_str()).unwrap_or("-")
        ),
    });

    if verbose {
        println!("  Priority order (g per benefit point):");
        for d in &sorted {
            println!(
                "    {:26} {:>8.2}  [{}]",
                d.name,
                d.weight_g as f64 / d.benefit.max(1) as f64,
                d.kind().label()
            );
        }
    }

    results
}

// ── 2. Depot Run ────────────────────────────────────────────────────────

fn validate_depot_run(
    fleet: &FleetSnapshot,
    config: &PackingConfig,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Depot Run ---");
    let mut results = Vec::new();

    let mut depot = Depot::new(MemoryStore::from_snapshot(fleet.clone()), config.clone());

    let first = depot.preview();
    let second = depot.preview();
    let (first, second) = match (first, second) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            results.push(TestResult {
                name: "depot_preview".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "depot_preview_deterministic".into(),
        passed: first.plan == second.plan,
        detail: "two previews of unconsumed stock agree".into(),
    });

    let report = match depot.run() {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "depot_run".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "depot_run_matches_preview".into(),
        passed: report.plan == first.plan,
        detail: format!("total benefit {}", report.plan.total_benefit()),
    });

    results.push(outcome(
        "depot_conservation",
        check_conservation(&fleet.devices, &report.remaining, &report.plan),
        "every unit accounted for",
    ));
    results.push(outcome(
        "depot_capacity_feasible",
        check_feasibility(&report.plan, &fleet.drivers),
        "no transporter overloaded",
    ));

    let mut sorted = fleet.devices.clone();
    sort_by_priority(&mut sorted);
    results.push(outcome(
        "depot_greedy_maximal",
        check_greedy(&sorted, &fleet.transporters, &fleet.drivers),
        "no remaining device fits anywhere it was skipped",
    ));

    let stored_loads = depot.store().loads().map(|l| l.len()).unwrap_or(0);
    let planned_lines: usize = report.plan.loads.iter().map(|l| l.entries.len()).sum();
    results.push(TestResult {
        name: "depot_audit_written".into(),
        passed: stored_loads == planned_lines,
        detail: format!("{} load lines recorded", stored_loads),
    });

    if verbose {
        println!();
        for line in render_plan(&report.plan).lines() {
            println!("  {}", line);
        }
    }

    results
}

// ── 3. Reference Scenarios ──────────────────────────────────────────────

fn validate_scenarios() -> Vec<TestResult> {
    println!("--- Reference Scenarios ---");
    let mut results = Vec::new();
    let config = PackingConfig::default();

    // One device, one 5 kg transporter, 1 kg driver.
    let mut pool = DevicePool::new(vec![Device::new(1, "Tablet", 3, 1000, 50)]);
    match allocate(
        &mut pool,
        &[Transporter::new(1, 5.0)],
        &[Driver::new(1, 1.0)],
        &config,
    ) {
        Ok(plan) => {
            let load = &plan.loads[0];
            let ok = load.entries.len() == 1
                && load.entries[0].units == 3
                && load.benefit_total == 150
                && load.remaining_capacity_g() == 1000
                && pool.devices()[0].units == 0;
            results.push(TestResult {
                name: "scenario_single_transporter".into(),
                passed: ok,
                detail: format!(
                    "took {} units, benefit {}, {} g free",
                    load.units_of(pool.devices()[0].id),
                    load.benefit_total,
                    load.remaining_capacity_g()
                ),
            });
        }
        Err(e) => results.push(TestResult {
            name: "scenario_single_transporter".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    // Two transporters share five units.
    let mut pool = DevicePool::new(vec![Device::new(1, "Tablet", 5, 1000, 10)]);
    match allocate(
        &mut pool,
        &[Transporter::new(1, 4.0), Transporter::new(2, 4.0)],
        &[Driver::new(1, 1.0), Driver::new(2, 1.0)],
        &config,
    ) {
        Ok(plan) => {
            let ok = plan.loads[0].entries[0].units == 3
                && plan.loads[1].entries[0].units == 2
                && plan.loads[1].benefit_total == 20
                && plan.loads[1].remaining_capacity_g() == 1000;
            results.push(TestResult {
                name: "scenario_shared_pool".into(),
                passed: ok,
                detail: "3 units then 2 units".into(),
            });
        }
        Err(e) => results.push(TestResult {
            name: "scenario_shared_pool".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    // More transporters than drivers.
    let mut pool = DevicePool::new(vec![Device::new(1, "Tablet", 10, 1000, 10)]);
    match allocate(
        &mut pool,
        &[Transporter::new(1, 4.0), Transporter::new(2, 4.0)],
        &[Driver::new(1, 1.0)],
        &config,
    ) {
        Ok(plan) => {
            let ok = plan.loads[1].is_empty()
                && plan.unfulfilled().len() == 1
                && pool.devices()[0].units == 7;
            results.push(TestResult {
                name: "scenario_no_driver_skip".into(),
                passed: ok,
                detail: format!("{} diagnostic(s)", plan.diagnostics.len()),
            });
        }
        Err(e) => results.push(TestResult {
            name: "scenario_no_driver_skip".into(),
            passed: false,
            detail: e.to_string(),
        }),
    }

    results
}

// ── 4. Snapshot Persistence ─────────────────────────────────────────────

fn validate_snapshot(fleet: &FleetSnapshot) -> Vec<TestResult> {
    println!("--- Snapshot Persistence ---");
    let mut buffer = Vec::new();
    let loaded = save_snapshot(&mut buffer, fleet).and_then(|_| load_snapshot(&buffer[..]));
    let (passed, detail) = match loaded {
        Ok(f) => (f == *fleet, format!("{} bytes", buffer.len())),
        Err(e) => (false, e.to_string()),
    };
    vec![TestResult {
        name: "snapshot_reload".into(),
        passed,
        detail,
    }]
}

// ── 5. Random Sweep ─────────────────────────────────────────────────────

fn random_fleet(rng: &mut StdRng) -> (Vec<Device>, Vec<Transporter>, Vec<Driver>) {
    let device_count = rng.gen_range(1..=12);
    let mut devices: Vec<Device> = (0..device_count)
        .map(|i| {
            Device::new(
                i + 1,
                format!("device-{}", i + 1),
                rng.gen_range(0..=300),
                rng.gen_range(1..=5_000),
                rng.gen_range(1..=100),
            )
        })
        .collect();
    sort_by_priority(&mut devices);

    let transporter_count = rng.gen_range(1..=5);
    let transporters = (0..transporter_count)
        .map(|i| Transporter::new(i + 1, rng.gen_range(50..=2_000) as f64))
        .collect();

    let driver_count = rng.gen_range(0..=transporter_count + 1);
    let drivers = (0..driver_count)
        .map(|i| Driver::new(i + 1, rng.gen_range(550..=1_200) as f64 / 10.0))
        .collect();

    (devices, transporters, drivers)
}

fn validate_random_sweep(seed: u64, iterations: usize, verbose: bool) -> Vec<TestResult> {
    println!("--- Random Sweep (seed {}) ---", seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let config = PackingConfig::default();

    let mut failures: Vec<String> = Vec::new();
    let mut skipped = 0usize;

    for i in 0..iterations {
        let (devices, transporters, drivers) = random_fleet(&mut rng);

        let mut pool = DevicePool::new(devices.clone());
        let plan = match allocate(&mut pool, &transporters, &drivers, &config) {
            Ok(p) => p,
            Err(e) => {
                failures.push(format!("#{}: {}", i, e));
                continue;
            }
        };
        skipped += plan.unfulfilled().len();

        let checks = [
            check_conservation(&devices, pool.devices(), &plan),
            check_feasibility(&plan, &drivers),
            check_greedy(&devices, &transporters, &drivers),
        ];
        for err in checks.into_iter().filter_map(Result::err) {
            failures.push(format!("#{}: {}", i, err));
        }

        let expected_skips = transporters.len().saturating_sub(drivers.len());
        if plan.unfulfilled().len() != expected_skips {
            failures.push(format!(
                "#{}: {} skipped transporters, expected {}",
                i,
                plan.unfulfilled().len(),
                expected_skips
            ));
        }
    }

    if verbose {
        println!(
            "  {} fleets, {} driverless transporters skipped",
            iterations, skipped
        );
    }

    vec![TestResult {
        name: "sweep_properties".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("{} random fleets hold every property", iterations)
        } else {
            format!("{} failures, first: {}", failures.len(), failures[0])
        },
    }]
}
