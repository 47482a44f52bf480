// src/shutdown.rs
// Signal driven shutdown of the running server

use actix_web::dev::ServerHandle;
use futures_util::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook_tokio::{Handle, Signals};
use std::io;

use crate::logger::Logger;

/// Signals that terminate the server.
pub const TERM_SIGNALS: [i32; 5] = [SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2];

pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        SIGUSR1 => "SIGUSR1",
        SIGUSR2 => "SIGUSR2",
        _ => "unknown",
    }
}

/// Stop `server` gracefully on the first termination signal and exit
/// immediately on the second one.
///
/// Must be called from within a tokio runtime. The returned handle closes the
/// signal stream when the server went down on its own.
pub fn listen_for_termination(server: ServerHandle, logger: &'static Logger) -> io::Result<Handle> {
    let mut signals = Signals::new(TERM_SIGNALS)?;
    let handle = signals.handle();

    tokio::spawn(async move {
        let mut stopping = false;

        while let Some(signal) = signals.next().await {
            if stopping {
                logger.force_shutdown_message();
                std::process::exit(0);
            }

            logger.termination_message(signal_name(signal));
            stopping = true;

            // Keep receiving signals while the server drains.
            let server = server.clone();
            tokio::spawn(async move {
                server.stop(true).await;
            });
        }
    });

    Ok(handle)
}
