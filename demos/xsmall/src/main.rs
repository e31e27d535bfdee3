//! xsmall — smallest demo for the rust_drt dispatch engine.
//!
//! Runs a 6-vehicle shared-taxi service on a synthetic 4×4 street grid for
//! two hours of Poisson demand, then prints what happened to every request.
//! Scenario settings live in the embedded JSON below; set `RUST_LOG=debug`
//! to watch individual passes.

mod network;

use std::io::Cursor;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drt_core::{DemandRng, DispatchConfig, NodeId, SimConfig, SimTime, VehicleId};
use drt_dispatch::PassReport;
use drt_fleet::{FleetBuilder, RequestSpec, RequestStatus, load_vehicles_reader};
use drt_schedule::{Task, TaskStatus, TaskType};
use drt_sim::{DispatchObserver, FleetSimBuilder};
use drt_spatial::NetworkPathCost;

use network::build_network;

// ── Scenario ──────────────────────────────────────────────────────────────────

const SCENARIO_JSON: &str = r#"{
    "seed": 42,
    "requests_per_hour": 40.0,
    "max_lead_secs": 900,
    "sim": { "start": 21600, "step_secs": 10, "end": 30600 },
    "dispatch": {
        "pickup_duration_secs": 60,
        "dropoff_duration_secs": 60,
        "max_wait_secs": 1200,
        "candidate_vehicles": 4,
        "unschedule_awaiting_requests": true,
        "vehicle_diversion": true,
        "matching": "sequential"
    }
}"#;

// Service 06:00–09:00; two vehicles join for the morning peak.
const VEHICLES_CSV: &str = "\
start_node,capacity,window_start,window_end\n\
0,4,21600,32400\n\
3,4,21600,32400\n\
5,4,21600,32400\n\
12,4,21600,32400\n\
10,6,25200,32400\n\
15,6,25200,32400\n\
";

#[derive(Deserialize)]
struct Scenario {
    seed:              u64,
    requests_per_hour: f64,
    /// Requests ask for pickup up to this far ahead of submission.
    max_lead_secs:     u64,
    sim:               SimConfig,
    dispatch:          DispatchConfig,
}

/// Poisson arrivals over the run, origin and destination drawn uniformly
/// from distinct grid nodes.
fn generate_demand(scenario: &Scenario, nodes: &[NodeId]) -> Vec<(SimTime, RequestSpec)> {
    let mut rng = DemandRng::new(scenario.seed);
    let mut demand = Vec::new();
    let mut at = scenario.sim.start;
    loop {
        at = at + rng.arrival_gap_secs(scenario.requests_per_hour);
        if at >= scenario.sim.end {
            return demand;
        }
        let (Some(&from), Some(&to)) = (rng.choose(nodes), rng.choose(nodes)) else {
            return demand;
        };
        if from == to {
            continue;
        }
        let lead = rng.gen_range(0..=scenario.max_lead_secs);
        demand.push((at, RequestSpec { from, to: Some(to), t0: at + lead }));
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct ServiceStats {
    passes:      usize,
    planned:     usize,
    unassigned:  usize,
    stale:       usize,
    unscheduled: usize,
    diverted:    usize,
    pickups:     usize,
    dropoffs:    usize,
    busiest:     Vec<usize>,
}

impl DispatchObserver for ServiceStats {
    fn on_task_started(&mut self, vehicle: VehicleId, task: &Task) {
        match task.task_type() {
            TaskType::Pickup => self.pickups += 1,
            TaskType::Dropoff => {
                self.dropoffs += 1;
                if self.busiest.len() <= vehicle.index() {
                    self.busiest.resize(vehicle.index() + 1, 0);
                }
                self.busiest[vehicle.index()] += 1;
            }
            _ => {}
        }
    }

    fn on_step_end(&mut self, _now: SimTime, report: &PassReport) {
        if report.is_noop() && report.unassigned.is_empty() {
            return;
        }
        self.passes      += 1;
        self.planned     += report.planned.len();
        self.unassigned  += report.unassigned.len();
        self.stale       += report.stale.len();
        self.unscheduled += report.unscheduled.len();
        self.diverted    += report.diverted.len();
    }

    fn on_sim_end(&mut self, now: SimTime) {
        info!(at = %now, dropoffs = self.dropoffs, "service closed");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let scenario: Scenario =
        serde_json::from_str(SCENARIO_JSON).context("parsing embedded scenario")?;

    println!("=== xsmall — rust_drt dispatch ===");
    println!(
        "Service {} – {}  |  {} req/h  |  Seed: {}",
        scenario.sim.start, scenario.sim.end, scenario.requests_per_hour, scenario.seed
    );
    println!();

    // 1. Road network.
    let (network, nodes) = build_network();
    println!(
        "Road network: {} nodes, {} links",
        network.node_count(),
        network.link_count()
    );

    // 2. Fleet from the embedded CSV.
    let vehicles = load_vehicles_reader(Cursor::new(VEHICLES_CSV))?;
    let fleet = FleetBuilder::with_capacity(vehicles.len()).extend(vehicles).build()?;
    println!("Fleet: {} vehicles", fleet.len());

    // 3. Demand.
    let demand = generate_demand(&scenario, &nodes);
    println!("Demand: {} requests", demand.len());
    println!();

    // 4. Build and run.
    let mut sim = FleetSimBuilder::new(
        scenario.sim.clone(),
        scenario.dispatch.clone(),
        fleet,
        NetworkPathCost::dijkstra(network),
    )
    .requests(demand)
    .build()?;

    let mut stats = ServiceStats::default();
    let t0 = Instant::now();
    sim.run(&mut stats)?;
    let elapsed = t0.elapsed();
    sim.optimizer.check_invariants()?;

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  passes: {}  planned: {}  unassigned: {}  stale: {}",
        stats.passes, stats.planned, stats.unassigned, stats.stale
    );
    println!(
        "  unscheduled: {}  diverted: {}  pickups: {}  dropoffs: {}",
        stats.unscheduled, stats.diverted, stats.pickups, stats.dropoffs
    );
    let driven_m: f32 = sim
        .optimizer
        .fleet()
        .vehicles()
        .iter()
        .flat_map(|v| v.schedule().tasks())
        .filter(|t| t.status() == TaskStatus::Performed)
        .filter_map(Task::leg)
        .map(|leg| sim.optimizer.paths().distance_m(leg))
        .sum();
    println!("  fleet distance: {:.1} km", driven_m / 1_000.0);
    println!();

    // 6. Per-request outcome table.
    println!("{:<10} {:<6} {:<6} {:<10} {:<12} {:<8}", "Request", "From", "To", "t0", "Status", "Vehicle");
    println!("{}", "-".repeat(56));
    for r in sim.optimizer.requests().iter() {
        println!(
            "{:<10} {:<6} {:<6} {:<10} {:<12} {:<8}",
            r.id().0,
            r.origin().0,
            r.destination().map_or_else(|| "?".to_string(), |n| n.0.to_string()),
            r.t0().to_string(),
            format!("{:?}", r.status()),
            r.vehicle().map_or_else(|| "-".to_string(), |v| v.0.to_string()),
        );
    }

    let served = sim
        .optimizer
        .requests()
        .iter()
        .filter(|r| r.status() == RequestStatus::Performed)
        .count();
    println!();
    println!("Served {served} of {} requests", sim.optimizer.requests().len());
    for (v, n) in stats.busiest.iter().enumerate() {
        println!("  vehicle {v}: {n} drop-offs");
    }

    Ok(())
}
