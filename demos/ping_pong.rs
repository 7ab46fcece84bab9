//! Ping-pong between two workers over a line pipe.
//!
//! Run with the real socket transport (default) or the in-process queue:
//!
//! ```text
//! cargo run --example ping_pong
//! cargo run --example ping_pong -- queue
//! ```
//!
//! The main thread floods the pipe without reading replies to show the
//! rate-limited "pipe full" diagnostics.

use std::thread;
use std::time::Duration;

use nbpipe::{line_pipe_with_config, pipe, LineChannel, PipeConfig, TransportKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let transport = match std::env::args().nth(1).as_deref() {
        Some("queue") => TransportKind::Queue,
        _ => TransportKind::Socket,
    };
    let config = PipeConfig::with_transport(transport);

    let (mut main_end, mut worker_end) = line_pipe_with_config("ping", &config)?;

    let worker = thread::spawn(move || -> nbpipe::Result<u32> {
        let mut answered = 0;
        loop {
            match worker_end.readline()? {
                Some(line) if line == "quit" => return Ok(answered),
                Some(line) => {
                    worker_end.send(&line.replace("ping", "pong"))?;
                    answered += 1;
                }
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
    });

    for i in 0..5 {
        main_end.send(&format!("ping {}", i))?;
    }

    let mut replies = 0;
    while replies < 5 {
        match main_end.readline()? {
            Some(reply) => {
                tracing::info!(%reply, "got reply");
                replies += 1;
            }
            None => thread::sleep(Duration::from_millis(1)),
        }
    }

    while !main_end.send("quit")? {
        thread::sleep(Duration::from_millis(1));
    }
    let answered = worker.join().map_err(|_| "worker panicked")??;
    tracing::info!(answered, ?transport, "worker finished");

    // Nobody reads this one: watch the warnings thin out
    let (mut flood, _silent) = pipe::<Vec<u8>>("flood")?;
    let payload = vec![0u8; 256];
    for _ in 0..2000 {
        flood.send(&payload)?;
    }
    tracing::info!(failures = flood.failure_count(), "flood done");

    Ok(())
}
