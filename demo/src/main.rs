use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{self, Parser};
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use mqueue::{MessageQueue, Policy, QueueConfig};

#[derive(clap::Parser)]
#[clap()]
struct Opts {
    #[clap(short = 'c', long = "config", default_value = "mqueue-demo.toml")]
    config: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DemoConfig {
    queue: QueueConfig,
    readers: usize,
    writers: usize,
    run_secs: u64,
    min_sleep_ms: u64,
    max_sleep_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> DemoConfig {
        DemoConfig {
            queue: QueueConfig::default(),
            readers: 3,
            writers: 5,
            run_secs: 5,
            min_sleep_ms: 1,
            max_sleep_ms: 1000,
        }
    }
}

fn random_interval(cfg: &DemoConfig) -> Duration {
    let ms = rand::thread_rng().gen_range(cfg.min_sleep_ms..=cfg.max_sleep_ms);
    Duration::from_millis(ms)
}

// just emulate some routing logic, as the reader index decides the operation
fn reader_loop(i: usize, queue: &MessageQueue<String>, stop: &AtomicBool, cfg: &DemoConfig) {
    let id = format!("reader {}", i);
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(random_interval(cfg));

        let outcome: Result<String, Box<dyn Error>> = if i % 3 == 0 {
            queue.pop(Policy::NonBlocking).map_err(Into::into)
        } else if i % 3 == 1 {
            queue.pop(Policy::Blocking).map_err(Into::into)
        } else {
            queue.get(|message| message == "3").map_err(Into::into)
        };

        match outcome {
            Ok(message) => println!("{}: {}", id, message),
            Err(e) => println!("{}: pop failed: {}", id, e),
        }
    }
}

fn writer_loop(i: usize, queue: &MessageQueue<String>, stop: &AtomicBool, cfg: &DemoConfig) {
    let id = format!("writer {}", i);
    while !stop.load(Ordering::Relaxed) {
        thread::sleep(random_interval(cfg));

        // odd writers push their bare index, so "3" shows up for the
        // predicate readers to extract
        let result = if i % 2 == 1 {
            queue.push(i.to_string(), Policy::NonBlocking)
        } else {
            queue.push(id.clone(), Policy::Blocking)
        };

        match result {
            Ok(()) => println!("{}: push succeeded", id),
            Err(e) => println!("{}: push failed: {}", id, e),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let opts: Opts = Opts::parse();
    let cfg: DemoConfig = confy::load_path(&opts.config)?;
    println!("{:?}", &cfg);

    let cfg = Arc::new(cfg);
    let queue = Arc::new(MessageQueue::<String>::from_config(&cfg.queue)?);
    // to stop all readers/writers from the main thread
    let stop = Arc::new(AtomicBool::new(false));

    // turn SIGINT/SIGTERM into an early stop
    {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        let mut signals = Signals::new(&[SIGINT, SIGTERM])?;
        thread::spawn(move || {
            for _ in signals.forever() {
                stop.store(true, Ordering::Relaxed);
                queue.close();
            }
        });
    }

    let mut workers = Vec::with_capacity(cfg.readers + cfg.writers);
    for i in 0..cfg.readers {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        let cfg = Arc::clone(&cfg);
        workers.push(thread::spawn(move || reader_loop(i, &queue, &stop, &cfg)));
    }
    for i in 0..cfg.writers {
        let queue = Arc::clone(&queue);
        let stop = Arc::clone(&stop);
        let cfg = Arc::clone(&cfg);
        workers.push(thread::spawn(move || writer_loop(i, &queue, &stop, &cfg)));
    }

    thread::sleep(Duration::from_secs(cfg.run_secs));

    // close first so every parked reader/writer unblocks, then stop the loops
    queue.close();
    stop.store(true, Ordering::Relaxed);

    for worker in workers {
        worker.join().map_err(|_| "a worker thread panicked")?;
    }

    println!("The demo finished successfully");
    Ok(())
}
