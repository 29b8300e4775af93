use tokio::time::{self, Instant, MissedTickBehavior};

use crate::clock;
use crate::config::MonitorConfig;
use crate::framer::LineFramer;
use crate::logger::Logger;
use crate::ports::SerialSystem;
use crate::stream::{DeviceEvent, DeviceStream};

/// One attached session: the open device stream plus its line framer.
/// Dropping it closes the stream and discards any pending partial line.
struct Session {
    stream: DeviceStream,
    framer: LineFramer,
}

/// Reattachment state machine.
///
/// Polls the serial system on a fixed interval, opens the target device
/// when it appears, closes it when it vanishes, and routes stream events
/// to the logger. The watchdog is the sole owner of the session, and poll
/// ticks and stream events are handled on one task, so every transition
/// is serialized; a close racing a poll-driven disconnect degrades to a
/// no-op.
pub struct Watchdog<S: SerialSystem> {
    config: MonitorConfig,
    system: S,
    logger: Logger,
    session: Option<Session>,
}

impl<S: SerialSystem> Watchdog<S> {
    pub fn new(config: MonitorConfig, system: S, logger: Logger) -> Watchdog<S> {
        Watchdog {
            config,
            system,
            logger,
            session: None,
        }
    }

    /// Run until the process is killed. There is no graceful shutdown.
    pub async fn run(mut self) {
        // First check fires one full interval after startup, matching the
        // repeating-timer contract.
        let mut poll = time::interval_at(
            Instant::now() + self.config.poll_interval,
            self.config.poll_interval,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.logger.console(&format!(
            "Monitoring port {} (baudRate={})...",
            self.config.port, self.config.baud_rate
        ));

        loop {
            tokio::select! {
                _ = poll.tick() => self.poll_tick(),
                event = Self::next_event(&mut self.session) => self.handle_event(event),
            }
        }
    }

    /// Resolve the next device-stream event, or park forever while
    /// disconnected so only the poll timer can wake the loop.
    async fn next_event(session: &mut Option<Session>) -> DeviceEvent {
        match session {
            Some(session) => session.stream.next_event().await,
            None => std::future::pending().await,
        }
    }

    /// One poll cycle: compare the target against the current snapshot and
    /// open or close the session accordingly.
    fn poll_tick(&mut self) {
        let ports = match self.system.list_ports() {
            Ok(ports) => ports,
            Err(detail) => {
                // Transient enumeration failure: skip this cycle, keep any
                // open session attached.
                self.logger
                    .log(&format!("Error while checking ports: {detail}"));
                return;
            }
        };

        let found = ports
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&self.config.port));
        tracing::debug!(found, connected = self.session.is_some(), "poll tick");

        if found && self.session.is_none() {
            match self.system.open(&self.config.port, self.config.baud_rate) {
                Ok(stream) => {
                    self.logger.console(&format!(
                        "[{}] Port {} opened (baudRate={})",
                        clock::date_time_stamp(),
                        self.config.port,
                        self.config.baud_rate
                    ));
                    self.session = Some(Session {
                        stream,
                        framer: LineFramer::new(),
                    });
                }
                Err(message) => {
                    // Stay disconnected; the next tick retries, unbounded.
                    self.logger.log(&format!("Error: {message}"));
                }
            }
        } else if !found && self.session.is_some() {
            self.logger
                .log(&format!("Port {} disconnected", self.config.port));
            // Dropping the session cancels the reader and closes the port;
            // its pending partial line is discarded with the framer.
            self.session = None;
        }
    }

    fn handle_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Data(chunk) => {
                if let Some(session) = self.session.as_mut() {
                    for line in session.framer.feed(&chunk) {
                        self.logger.log(&line);
                    }
                }
            }
            DeviceEvent::Closed => {
                // Idempotent: a Closed arriving after a poll-driven
                // disconnect finds no session and changes nothing.
                if self.session.take().is_some() {
                    self.logger.log(&format!("Port {} closed", self.config.port));
                }
            }
            DeviceEvent::Error(message) => {
                // No transition; a Closed event or poll miss follows.
                self.logger.log(&format!("Error: {message}"));
            }
        }
    }
}
