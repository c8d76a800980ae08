//! Process-level signal capture feeding the reactor.
//!
//! Rather than a single shared `(int, bool)` slot written directly from a
//! signal handler context, this is exposed as a `mio`-pollable event
//! source the [`Reactor`](crate::reactor::Reactor) selects on alongside
//! its acceptors. `signal_hook` still does the actual handler
//! registration (there is still exactly one OS-level handler per signal
//! number; see the docs on `SignalSet::received` for what "shared" means
//! in this design).

use std::io;

use signal_hook::consts::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_mio::v0_8::Signals;

/// The signals this server shuts down on: `SIGINT`, `SIGTERM`, and
/// `SIGQUIT` where the platform defines it.
pub const SHUTDOWN_SIGNALS: &[i32] = &[SIGINT, SIGTERM, SIGQUIT];

/// A registered interest in the shutdown signals, deliverable to a
/// [`Reactor`](crate::reactor::Reactor) as a normal pollable source.
///
/// Multiple `SignalSet` instances in one process still cooperate on the
/// same underlying OS handler slot per signal number — that is
/// unavoidable at the OS level — but each `SignalSet` gets its own
/// pending-signal queue from `signal_hook`, so there's no shared mutable
/// flag in this process's own code for two instances to race on.
pub struct SignalSet {
    signals: Signals,
}

impl SignalSet {
    pub fn new() -> io::Result<SignalSet> {
        Ok(SignalSet { signals: Signals::new(SHUTDOWN_SIGNALS)? })
    }

    /// Returns the first pending signal, if any have been delivered since
    /// the last call.
    pub fn received(&mut self) -> Option<i32> {
        self.signals.pending().next()
    }

    pub(crate) fn source(&mut self) -> &mut Signals {
        &mut self.signals
    }
}
