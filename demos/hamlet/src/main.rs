//! hamlet: a small colony for the colony citizen AI.
//!
//! Two knights spar at the academy, a sifter works through a gravel pile,
//! a miner cuts into a quarry wall and a hungry idler goes looking for a
//! meal.  A pretend warehouse fills open item requests every few seconds.
//!
//! ```text
//! cargo run -p hamlet -- [config.json] [sieve.csv]
//! RUST_LOG=debug cargo run -p hamlet
//! ```

mod village;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use col_agent::{Arena, Job, JobKind};
use col_core::{ColonyConfig, SimClock, Tick, Vec3};
use col_sim::{Citizen, Sim, SimBuilder, SimObserver, TICKS_PER_DAY};
use col_tasks::{Colony, ItemRequest, SieveTable};
use col_world::container;
use col_world::TracingSink;

use village::{build_colony, build_world};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:              u64 = 7;
const LEVEL_CAP:         u32 = 10;
const SIM_DAYS:          u64 = 1;
/// Status table once per in-game minute.
const REPORT_INTERVAL:   u64 = SimClock::ticks_for_minutes(1);
const DELIVERY_INTERVAL: u64 = SimClock::ticks_for_secs(10);

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct StatusPrinter {
    reports: u32,
    days:    u32,
}

impl SimObserver for StatusPrinter {
    fn on_new_day(&mut self, tick: Tick) {
        self.days += 1;
        println!("── day {} begins at tick {tick} ──", self.days + 1);
    }

    fn on_snapshot(&mut self, tick: Tick, citizens: &Arena<Citizen>, colony: &Colony) {
        self.reports += 1;
        println!();
        println!("tick {tick}  |  open requests: {}", colony.requests().len());
        print_table(citizens);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        println!();
        println!("stopped at tick {final_tick} after {} reports", self.reports);
    }
}

fn print_table(citizens: &Arena<Citizen>) {
    println!("{:<8} {:<8} {:<28} {:<18} {:>5}  {}", "Name", "Job", "Job state", "Eat state", "Sat", "Position");
    println!("{}", "-".repeat(90));
    for (_, c) in citizens.iter() {
        let data = c.data();
        let job = data.job().map_or_else(|| "-".to_string(), |j| j.kind.to_string());
        let job_state = c.job_ai().map_or_else(|| "-".to_string(), |j| j.state_name());
        println!(
            "{:<8} {:<8} {:<28} {:<18} {:>5.1}  {}",
            data.name(),
            job,
            job_state,
            format!("{:?}", c.eat_task().state()),
            data.saturation(),
            c.position(),
        );
    }
}

// ── Warehouse ─────────────────────────────────────────────────────────────────

/// Hand every open request straight to its requester.  The behaviour that
/// asked closes the request once it sees the item.
fn deliver_requests(sim: &mut Sim) -> usize {
    let open: Vec<ItemRequest> = sim.colony.requests().to_vec();
    let mut delivered = 0;
    for req in open {
        let Some(citizen) = sim.find(req.requester).and_then(|h| sim.citizen_mut(h)) else {
            continue;
        };
        let inventory = citizen.data_mut().inventory_mut();
        if container::count_matching(&*inventory, |s| s.kind == req.stack.kind) >= req.stack.count {
            continue;
        }
        match container::insert_anywhere(inventory, req.stack) {
            None => {
                delivered += 1;
                tracing::info!(citizen = %req.requester, item = ?req.stack.kind, count = req.stack.count, "delivered");
            }
            Some(rest) => tracing::warn!(citizen = %req.requester, ?rest, "inventory full, delivery incomplete"),
        }
    }
    delivered
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: &Path) -> Result<ColonyConfig> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => ColonyConfig { seed: SEED, ..ColonyConfig::default() },
    };
    let sieve = match args.next() {
        Some(path) => SieveTable::load_csv(Path::new(&path))?,
        None => SieveTable::builtin(),
    };

    println!("=== hamlet colony citizen AI ===");
    println!(
        "Days: {SIM_DAYS}  |  Seed: {}  |  Path threads: {}",
        config.seed, config.pathfinding_max_threads
    );

    // 1. World and colony.
    let (colony, sites) = build_colony(LEVEL_CAP);
    let mut sim = SimBuilder::new(Arc::new(build_world()))
        .config(config)
        .colony(colony)
        .effects(Arc::new(TracingSink))
        .sieve_table(sieve)
        .snapshot_interval(REPORT_INTERVAL)
        .build()?;

    // 2. Citizens.
    let staff = [
        ("Aldric", Vec3::new(-9.5, 1.0, 9.5), Job::new(JobKind::Knight, Some(sites.academy))),
        ("Brenna", Vec3::new(-10.5, 1.0, 10.5), Job::new(JobKind::Knight, Some(sites.academy))),
        ("Cedric", Vec3::new(-3.5, 1.0, -9.5), Job::new(JobKind::Sifter, Some(sites.sifter))),
        ("Dagny", Vec3::new(8.5, 1.0, 0.5), Job::new(JobKind::Miner, Some(sites.mine))),
    ];
    for (name, pos, job) in staff {
        let handle = sim.spawn_random(name, pos)?;
        sim.set_job(handle, Some(job))?;
    }
    let idler = sim.spawn_random("Edwin", Vec3::new(-5.5, 1.0, 1.5))?;
    if let Some(edwin) = sim.citizen_mut(idler) {
        edwin.data_mut().set_saturation(4.0);
    }
    println!(
        "Citizens: {}  |  hut {} restaurant {}",
        sim.population(),
        sites.hut,
        sites.restaurant
    );

    // 3. Run.
    let mut obs = StatusPrinter::default();
    let t0 = Instant::now();
    let mut delivered = 0;
    for _ in 0..SIM_DAYS * TICKS_PER_DAY {
        sim.step(&mut obs);
        if sim.now().0.is_multiple_of(DELIVERY_INTERVAL) {
            delivered += deliver_requests(&mut sim);
        }
    }
    sim.shutdown(&mut obs);
    let elapsed = t0.elapsed();

    // 4. Summary.
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  deliveries      : {delivered}");
    if let Some(mine) = sim.colony.building(sites.mine).and_then(|b| b.mine()) {
        println!("  blocks mined    : {}  ({} left in plan)", mine.blocks_dug(), mine.remaining());
    }
    if let Some(sifter) = sim.colony.building(sites.sifter).and_then(|b| b.sifter()) {
        println!("  sifted today    : {} / {}", sifter.current_daily_quantity, sifter.daily_quantity);
    }
    println!();
    print_table(sim.citizens());
    Ok(())
}
