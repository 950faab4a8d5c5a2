use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use rand::Rng;
use serde::Serialize;
use tokio::time::{Duration, sleep};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spindle_core::impls::InMemoryConnectionPool;
use spindle_core::{
    ActorModel, Phase, PoolBuilder, PoolConfig, PoolCounts, Request, RequestState, WorkerPool,
};

#[derive(Parser)]
#[command(name = "spindle", version, about = "Worker pool demo driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Push synthetic requests through a pool and print its counters as JSON.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// io-in-worker | io-external (overrides SPINDLE_ACTOR_MODEL)
    #[arg(long)]
    actor_model: Option<ActorModel>,

    /// Worker threads (overrides SPINDLE_THREADS)
    #[arg(long)]
    threads: Option<usize>,

    /// Queue capacity (overrides SPINDLE_MAX_REQUESTS)
    #[arg(long)]
    max_requests: Option<usize>,

    #[arg(long, default_value_t = 1000)]
    requests: usize,

    /// Connections in the demo pool (at least 1)
    #[arg(long, default_value_t = 4, value_parser = parse_connections)]
    connections: usize,

    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    read_failure_rate: f64,

    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    write_failure_rate: f64,
}

/// 0 だと全ワーカーが acquire で止まったままになる
fn parse_connections(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("at least one connection is required".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("{raw:?}: {e}")),
    }
}

fn parse_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|e| format!("{raw:?}: {e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is not within 0.0..=1.0"))
    }
}

/// 疑似 DB 接続。何件処理したかだけ数える
struct DemoConn {
    id: usize,
    served: u64,
}

/// デモ用リクエスト。I/O の成否は生成時に決めておく
struct DemoRequest {
    id: usize,
    state: RequestState,
    read_fails: bool,
    write_fails: bool,
    processed: AtomicBool,
}

impl DemoRequest {
    fn new(id: usize, read_fails: bool, write_fails: bool) -> Self {
        Self {
            id,
            state: RequestState::default(),
            read_fails,
            write_fails,
            processed: AtomicBool::new(false),
        }
    }

    fn is_processed(&self) -> bool {
        self.processed.load(Ordering::Acquire)
    }
}

impl Request for DemoRequest {
    type Conn = DemoConn;

    fn state(&self) -> &RequestState {
        &self.state
    }

    fn perform_read(&self) -> bool {
        !self.read_fails
    }

    fn perform_write(&self) -> bool {
        !self.write_fails
    }

    fn process(&self, conn: Option<&mut DemoConn>) {
        match conn {
            Some(conn) => {
                conn.served += 1;
                tracing::trace!(request = self.id, conn = conn.id, "processed");
            }
            None => tracing::warn!(request = self.id, "processed without a connection"),
        }
        self.processed.store(true, Ordering::Release);
    }
}

#[derive(Debug, Default)]
struct Tally {
    completed: AtomicU64,
    io_failed: AtomicU64,
    retries: AtomicU64,
}

#[derive(Serialize)]
struct Report {
    actor_model: ActorModel,
    requests: usize,
    completed: u64,
    io_failed: u64,
    retries: u64,
    elapsed_ms: u128,
    pool: PoolCounts,
}

const POLL: Duration = Duration::from_millis(1);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spindle=info,spindle_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = PoolConfig::from_env().context("reading SPINDLE_* environment")?;
    if let Some(model) = args.actor_model {
        config.actor_model = model;
    }
    if let Some(n) = args.threads {
        config.thread_number = n;
    }
    if let Some(n) = args.max_requests {
        config.max_requests = n;
    }
    let actor_model = config.actor_model;

    tracing::info!(?args, %actor_model, "spindle demo starting");

    let conns = Arc::new(InMemoryConnectionPool::from_fn(args.connections, |id| {
        DemoConn { id, served: 0 }
    }));
    let pool: Arc<WorkerPool<DemoRequest>> =
        Arc::new(PoolBuilder::from_config(config).build(Arc::clone(&conns))?);
    let tally = Arc::new(Tally::default());

    // ThreadRng は Send ではないので、成否は spawn 前にまとめて決める
    let requests: Vec<Arc<DemoRequest>> = {
        let mut rng = rand::thread_rng();
        (0..args.requests)
            .map(|id| {
                Arc::new(DemoRequest::new(
                    id,
                    rng.gen_bool(args.read_failure_rate),
                    rng.gen_bool(args.write_failure_rate),
                ))
            })
            .collect()
    };

    let started = Instant::now();
    let mut tasks = Vec::with_capacity(requests.len());
    for request in requests {
        let pool = Arc::clone(&pool);
        let tally = Arc::clone(&tally);
        tasks.push(tokio::spawn(async move {
            match actor_model {
                ActorModel::IoInWorker => drive_in_worker(&pool, request, &tally).await,
                ActorModel::IoExternal => drive_external(&pool, request, &tally).await,
            }
        }));
    }
    for task in tasks {
        task.await.context("request driver task failed")?;
    }
    let elapsed = started.elapsed();

    let report = Report {
        actor_model,
        requests: args.requests,
        completed: tally.completed.load(Ordering::Relaxed),
        io_failed: tally.io_failed.load(Ordering::Relaxed),
        retries: tally.retries.load(Ordering::Relaxed),
        elapsed_ms: elapsed.as_millis(),
        pool: pool.counts(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    let pool = Arc::try_unwrap(pool).map_err(|_| anyhow!("worker pool is still shared"))?;
    let leftovers = pool.shutdown();
    tracing::info!(
        leftovers = leftovers.len(),
        outstanding = conns.outstanding(),
        "spindle demo finished"
    );
    Ok(())
}

/// 満杯で弾かれたら少し待って再送する
async fn submit_until_accepted(
    pool: &WorkerPool<DemoRequest>,
    request: &Arc<DemoRequest>,
    phase: Option<Phase>,
    tally: &Tally,
) {
    loop {
        let accepted = match phase {
            Some(phase) => pool.submit_with_phase(Arc::clone(request), phase),
            None => pool.submit(Arc::clone(request)),
        };
        if accepted {
            return;
        }
        tally.retries.fetch_add(1, Ordering::Relaxed);
        sleep(POLL).await;
    }
}

/// I/O もワーカー側で行うモデル。read → (process) → write の 2 往復
async fn drive_in_worker(pool: &WorkerPool<DemoRequest>, request: Arc<DemoRequest>, tally: &Tally) {
    submit_until_accepted(pool, &request, Some(Phase::Read), tally).await;

    // improved が立った後も process はまだ走っているかもしれない
    loop {
        let state = request.state();
        if state.is_improved() && (state.is_timed_out() || request.is_processed()) {
            break;
        }
        sleep(POLL).await;
    }
    // phase を書き換える前に、ワーカーが接続と参照を手放すのを待つ
    until_released(&request).await;
    request.state().take_improved();
    if request.state().is_timed_out() {
        tally.io_failed.fetch_add(1, Ordering::Relaxed);
        return;
    }

    submit_until_accepted(pool, &request, Some(Phase::Write), tally).await;
    while !request.state().take_improved() {
        sleep(POLL).await;
    }
    until_released(&request).await;
    if request.state().is_timed_out() {
        tally.io_failed.fetch_add(1, Ordering::Relaxed);
    } else {
        tally.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// プールが持っていた `Arc` が落ちるまで待つ。
/// ワーカーはその dispatch を終えた後でしか参照を手放さない。
async fn until_released(request: &Arc<DemoRequest>) {
    while Arc::strong_count(request) > 1 {
        sleep(POLL).await;
    }
}

/// I/O はこちら（tokio 側）で済ませ、ワーカーには process だけ任せるモデル
async fn drive_external(pool: &WorkerPool<DemoRequest>, request: Arc<DemoRequest>, tally: &Tally) {
    sleep(simulated_latency(request.id)).await;
    if !request.perform_read() {
        request.state().mark_timed_out();
        tally.io_failed.fetch_add(1, Ordering::Relaxed);
        return;
    }

    submit_until_accepted(pool, &request, None, tally).await;
    while !request.is_processed() {
        sleep(POLL).await;
    }

    sleep(simulated_latency(request.id)).await;
    if request.perform_write() {
        tally.completed.fetch_add(1, Ordering::Relaxed);
    } else {
        request.state().mark_timed_out();
        tally.io_failed.fetch_add(1, Ordering::Relaxed);
    }
}

fn simulated_latency(id: usize) -> Duration {
    Duration::from_micros(200 + (id as u64 % 7) * 100)
}
