//! Signal handling for the long-running watch loop.
//!
//! SIGINT, SIGTERM and SIGHUP request a clean shutdown; SIGUSR1 asks the
//! loop to run a cycle immediately instead of waiting out its sleep.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1},
    iterator::Signals,
};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

/// Messages delivered to a scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Stop after the current cycle without starting another.
    Shutdown,
    /// Cut the current sleep short and run a cycle now.
    Refresh,
}

/// Channel ends shared between the signal thread and the loop.
pub struct SignalState {
    pub signal_receiver: Receiver<SignalMessage>,
    pub signal_sender: Sender<SignalMessage>,
}

/// Install handlers and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let (signal_sender, signal_receiver) = channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1])
        .context("failed to register signal handlers")?;

    let sender = signal_sender.clone();
    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGUSR1 => SignalMessage::Refresh,
                _ => SignalMessage::Shutdown,
            };

            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {sig}, forwarding {message:?}");
            }

            if sender.send(message).is_err() || message == SignalMessage::Shutdown {
                break;
            }
        }
    });

    Ok(SignalState {
        signal_receiver,
        signal_sender,
    })
}

/// Fan one receiver out to several loops, one sender per loop.
///
/// Returns the receivers for the loops. A `Shutdown` is delivered to every
/// loop; the forwarding thread exits after forwarding it.
pub fn fan_out(source: Receiver<SignalMessage>, count: usize) -> Vec<Receiver<SignalMessage>> {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..count).map(|_| channel()).unzip();

    thread::spawn(move || {
        while let Ok(message) = source.recv() {
            for sender in &senders {
                let _ = sender.send(message);
            }
            if message == SignalMessage::Shutdown {
                break;
            }
        }
    });

    receivers
}
