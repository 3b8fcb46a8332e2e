//  Copyright 2026 The Regexcache Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Load generator for the pattern cache: `concurrency` workers hammer a
//! bounded pool of patterns through `Cache::matches`, reporting the
//! resulting cache hit ratio and compile/match latency percentiles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use rand::Rng;
use regexcache::{Cache, PatternCacheConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "regexcache-bench", about = "load generator for regexcache")]
struct Args {
    /// Number of concurrent worker tasks issuing match requests.
    #[arg(long, default_value_t = 64)]
    concurrency: usize,

    /// Number of distinct patterns drawn from to build the working set.
    /// A small pool relative to `max-entries` yields a high hit ratio; a
    /// large one exercises LRU eviction under pressure.
    #[arg(long, default_value_t = 256)]
    pattern_pool: usize,

    /// Soft cap on the number of simultaneously cached patterns.
    #[arg(long, default_value_t = 128)]
    max_entries: usize,

    /// How long to run the load generator.
    #[arg(long, value_parser = parse_duration, default_value = "10s")]
    duration: Duration,

    /// Length, in bytes, of the haystack each match is run against.
    #[arg(long, default_value_t = 64)]
    haystack_len: usize,
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Some(secs) = raw.strip_suffix('s') {
        secs.parse::<u64>().map(Duration::from_secs).map_err(|e| e.to_string())
    } else if let Some(ms) = raw.strip_suffix("ms") {
        ms.parse::<u64>().map(Duration::from_millis).map_err(|e| e.to_string())
    } else {
        raw.parse::<u64>().map(Duration::from_secs).map_err(|e| e.to_string())
    }
}

/// Deterministic per-index pattern text, so repeated draws of the same
/// index are genuine cache hits rather than accidental misses from
/// regenerating different pattern text each time.
fn pattern_for_index(index: usize) -> String {
    format!("bench-pattern-{index}-[a-z0-9]+")
}

fn random_haystack(rng: &mut impl Rng, len: usize) -> Vec<u8> {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789 ";
    (0..len).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())]).collect()
}

struct Report {
    requests: AtomicU64,
    errors: AtomicU64,
    latency_nanos: Mutex<Histogram<u64>>,
}

impl Report {
    fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            latency_nanos: Mutex::new(Histogram::new(3).expect("valid histogram precision")),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let config = PatternCacheConfig::builder().max_entries(args.max_entries).build();
    let cache = Arc::new(Cache::new(config));
    let report = Arc::new(Report::new());
    let deadline = Instant::now() + args.duration;

    let mut workers = Vec::with_capacity(args.concurrency);
    for _ in 0..args.concurrency {
        let cache = Arc::clone(&cache);
        let report = Arc::clone(&report);
        let pattern_pool = args.pattern_pool;
        let haystack_len = args.haystack_len;
        workers.push(tokio::spawn(async move {
            let mut rng = rand::thread_rng();
            while Instant::now() < deadline {
                let index = rng.gen_range(0..pattern_pool);
                let pattern = pattern_for_index(index);
                let haystack = random_haystack(&mut rng, haystack_len);

                let start = Instant::now();
                let outcome = cache.matches(&pattern, true, &haystack).await;
                let elapsed = start.elapsed();

                report.requests.fetch_add(1, Ordering::Relaxed);
                match outcome {
                    Ok(_) => {
                        report.latency_nanos.lock().record(elapsed.as_nanos() as u64).ok();
                    }
                    Err(_) => {
                        report.errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }));
    }

    for worker in workers {
        let _ = worker.await;
    }

    let stats = cache.statistics();
    let histogram = report.latency_nanos.lock();
    println!("requests:          {}", report.requests.load(Ordering::Relaxed));
    println!("errors:             {}", report.errors.load(Ordering::Relaxed));
    println!("cache hits:         {}", stats.cache_hits_total);
    println!("cache misses:       {}", stats.cache_misses_total);
    println!(
        "hit ratio:          {:.2}%",
        100.0 * stats.cache_hits_total as f64
            / (stats.cache_hits_total + stats.cache_misses_total).max(1) as f64
    );
    println!("lru evictions:      {}", stats.evictions_lru_total);
    println!("patterns current:   {}", stats.cache_patterns_current);
    println!("native bytes peak:  {}", stats.cache_native_memory_peak);
    println!("latency p50 (us):   {:.1}", histogram.value_at_quantile(0.50) as f64 / 1_000.0);
    println!("latency p99 (us):   {:.1}", histogram.value_at_quantile(0.99) as f64 / 1_000.0);
    println!("latency p999 (us):  {:.1}", histogram.value_at_quantile(0.999) as f64 / 1_000.0);
}
