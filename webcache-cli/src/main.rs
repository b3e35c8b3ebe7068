//! webcache CLI
//!
//! Runs the demo server or hammers a `CachedPage` from many threads to
//! look for locking problems.

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use webcache_core::{CachedPage, Statistics};
use webcache_server::{ApiServer, ServerConfig};

/// Length of every page the bench publishes: "Test_Caching HH:MM:SS".
const BENCH_BODY_LEN: usize = 21;

/// webcache - single-slot TTL cache for slow pages
#[derive(Parser)]
#[command(name = "webcache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
        /// Seconds a generated page stays valid
        #[arg(long, env = "WEBCACHE_MAX_AGE_SECS")]
        max_age: Option<u64>,
        /// Simulated backend latency in milliseconds
        #[arg(long, env = "WEBCACHE_BACKEND_DELAY_MS")]
        backend_delay_ms: Option<u64>,
        /// Seconds between statistics reports (0 disables)
        #[arg(long, env = "WEBCACHE_STATS_INTERVAL_SECS")]
        stats_interval: Option<u64>,
    },

    /// Hammer a cache from concurrent clients
    Bench {
        /// Number of concurrent clients
        #[arg(short, long, default_value = "5")]
        clients: usize,
        /// How long to run, in seconds
        #[arg(short, long, default_value = "5")]
        duration_secs: u64,
        /// Cache max age in milliseconds
        #[arg(long, default_value = "100")]
        max_age_ms: u64,
        /// Simulated generation time in milliseconds
        #[arg(long, default_value = "50")]
        work_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "webcache=debug,webcache_core=debug,webcache_server=debug,tower_http=debug,info"
    } else {
        "webcache=info,webcache_server=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            max_age,
            backend_delay_ms,
            stats_interval,
        } => cmd_serve(port, &bind, max_age, backend_delay_ms, stats_interval).await,
        Commands::Bench {
            clients,
            duration_secs,
            max_age_ms,
            work_ms,
        } => {
            let config = BenchConfig {
                clients,
                duration: Duration::from_secs(duration_secs),
                max_age: Duration::from_millis(max_age_ms),
                work: Duration::from_millis(work_ms),
                sample_every: Duration::from_secs(1),
            };
            cmd_bench(config).await
        }
    }
}

/// Run the demo server
async fn cmd_serve(
    port: u16,
    bind: &str,
    max_age: Option<u64>,
    backend_delay_ms: Option<u64>,
    stats_interval: Option<u64>,
) -> Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(secs) = max_age {
        config.max_age = Duration::from_secs(secs);
    }
    if let Some(ms) = backend_delay_ms {
        config.backend_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = stats_interval {
        config.stats_interval = Duration::from_secs(secs);
    }
    config
        .cache_config()
        .validate()
        .context("Invalid cache configuration")?;
    let addr = bind_addr(bind, port)?;

    println!("{}", "🚀 Starting webcache demo server...".cyan().bold());
    println!("   {} http://{}", "Listening on:".green(), addr);
    println!("   {} http://{}/clear/", "Clear cache:".dimmed(), addr);
    println!(
        "   {} {}s, backend {}ms",
        "Max age:".dimmed(),
        config.max_age.as_secs(),
        config.backend_delay.as_millis()
    );
    println!("\n   Press Ctrl+C to stop.\n");

    info!(%addr, "Starting server");
    ApiServer::new(config).run(addr).await?;

    Ok(())
}

/// Accepts bare IPv4 or IPv6 addresses, e.g. `0.0.0.0` or `::`.
fn bind_addr(bind: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = bind
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;
    Ok(SocketAddr::new(ip, port))
}

/// Settings for one bench run.
#[derive(Clone, Debug)]
struct BenchConfig {
    clients: usize,
    duration: Duration,
    max_age: Duration,
    work: Duration,
    sample_every: Duration,
}

/// Outcome of a bench run.
#[derive(Clone, Debug, Default)]
struct BenchReport {
    totals: Statistics,
    malformed: u64,
    /// Sample windows in which reads or updates stayed at zero
    stalled_windows: u64,
    windows: u64,
    elapsed: Duration,
}

impl BenchReport {
    fn passed(&self) -> bool {
        self.malformed == 0 && self.totals.requests > 0 && self.totals.updates > 0
    }
}

fn bench_body() -> Vec<u8> {
    format!("Test_Caching {}", Utc::now().format("%H:%M:%S")).into_bytes()
}

/// Runs `config.clients` threads looping check → update → read against one
/// page, resetting the statistics every `sample_every` like the server's
/// reporter does.
fn run_bench(config: &BenchConfig, progress: &ProgressBar) -> BenchReport {
    let page = CachedPage::new(config.max_age);
    let stop = AtomicBool::new(false);
    let malformed = AtomicU64::new(0);
    let mut report = BenchReport::default();

    let fetch = || {
        page.fetch_with(|| {
            std::thread::sleep(config.work);
            bench_body()
        })
    };
    fetch();

    let start = Instant::now();
    std::thread::scope(|s| {
        for _ in 0..config.clients {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    if fetch().len() != BENCH_BODY_LEN {
                        malformed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }

        while start.elapsed() < config.duration {
            std::thread::sleep(config.sample_every);
            let window = page.reset_statistics();
            report.windows += 1;
            if window.requests == 0 || window.updates == 0 {
                report.stalled_windows += 1;
            }
            report.totals.requests += window.requests;
            report.totals.updates += window.updates;
            progress.inc(1);
        }
        stop.store(true, Ordering::Relaxed);
    });

    let rest = page.reset_statistics();
    report.totals.requests += rest.requests;
    report.totals.updates += rest.updates;
    report.malformed = malformed.load(Ordering::Relaxed);
    report.elapsed = start.elapsed();
    report
}

/// Run the concurrency bench
async fn cmd_bench(config: BenchConfig) -> Result<()> {
    println!(
        "{} {} clients for {:?} (max age {:?}, work {:?})",
        "📊 Benchmarking with".cyan().bold(),
        config.clients,
        config.duration,
        config.max_age,
        config.work
    );

    let windows = config.duration.as_millis() / config.sample_every.as_millis().max(1);
    let pb = ProgressBar::new(windows.max(1) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len} samples")?
            .progress_chars("#>-"),
    );

    let bench_pb = pb.clone();
    let report = tokio::task::spawn_blocking(move || run_bench(&config, &bench_pb))
        .await
        .context("Bench thread panicked")?;
    pb.finish();
    info!(
        requests = report.totals.requests,
        updates = report.totals.updates,
        malformed = report.malformed,
        "Bench finished"
    );

    let secs = report.elapsed.as_secs_f64();
    println!("\n{}", "📈 Results:".green().bold());
    println!(
        "   Reads:   {} ({:.0}/sec)",
        report.totals.requests,
        report.totals.requests as f64 / secs
    );
    println!("   Updates: {}", report.totals.updates);
    println!(
        "   Stalled windows: {}/{}",
        report.stalled_windows, report.windows
    );

    if report.malformed > 0 {
        println!("   {} {} malformed reads", "❌".red(), report.malformed);
    }
    if !report.passed() {
        bail!(
            "lock problem: reads={}, updates={}, malformed={}",
            report.totals.requests,
            report.totals.updates,
            report.malformed
        );
    }

    println!("   {} Every read returned a complete page", "✅".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_body_length() {
        assert_eq!(bench_body().len(), BENCH_BODY_LEN);
    }

    #[test]
    fn test_run_bench_short() {
        let config = BenchConfig {
            clients: 4,
            duration: Duration::from_millis(300),
            max_age: Duration::from_millis(20),
            work: Duration::from_millis(5),
            sample_every: Duration::from_millis(100),
        };
        let report = run_bench(&config, &ProgressBar::hidden());

        assert!(report.passed(), "{:?}", report);
        assert_eq!(report.malformed, 0);
        assert!(report.windows >= 3);
    }

    #[test]
    fn test_parse_serve_args() {
        let cli = Cli::try_parse_from(["webcache", "serve", "--port", "9000", "--max-age", "30"])
            .unwrap();
        match cli.command {
            Commands::Serve { port, max_age, .. } => {
                assert_eq!(port, 9000);
                assert_eq!(max_age, Some(30));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_bind_addr_ipv4_and_ipv6() {
        assert_eq!(bind_addr("0.0.0.0", 8080).unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(bind_addr("::", 8080).unwrap().to_string(), "[::]:8080");
        assert_eq!(bind_addr("[::1]", 9000).unwrap().to_string(), "[::1]:9000");
        assert!(bind_addr("localhost", 8080).is_err());
    }

    #[test]
    fn test_parse_bench_defaults() {
        let cli = Cli::try_parse_from(["webcache", "-v", "bench"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Bench {
                clients,
                max_age_ms,
                work_ms,
                ..
            } => {
                assert_eq!(clients, 5);
                assert_eq!(max_age_ms, 100);
                assert_eq!(work_ms, 50);
            }
            _ => panic!("expected bench"),
        }
    }
}
