use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serialport::SerialPort;
use tokio::sync::mpsc;

/// Read timeout for the blocking serial loop. Short enough that a raised
/// cancel flag is noticed promptly.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

const READ_BUF_SIZE: usize = 1024;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications delivered by an open device stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A chunk of raw bytes arrived.
    Data(Vec<u8>),
    /// The stream ended, from either side.
    Closed,
    /// Stream-level I/O error. Not itself a state transition; a Closed
    /// event follows when the stream is done.
    Error(String),
}

/// Handle to one open serial session.
///
/// Owns the receiving end of the reader's event channel and the cancel
/// flag. Dropping the handle raises the flag, and the reader exits on its
/// next read timeout.
pub struct DeviceStream {
    events: mpsc::Receiver<DeviceEvent>,
    cancel: Arc<AtomicBool>,
}

impl DeviceStream {
    pub(crate) fn new(events: mpsc::Receiver<DeviceEvent>, cancel: Arc<AtomicBool>) -> DeviceStream {
        DeviceStream { events, cancel }
    }

    /// Await the next event. A reader whose channel has drained and closed
    /// reads as `Closed`.
    pub async fn next_event(&mut self) -> DeviceEvent {
        self.events.recv().await.unwrap_or(DeviceEvent::Closed)
    }
}

impl Drop for DeviceStream {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Open a serial device and spawn its blocking reader.
pub fn open_device(path: &str, baud_rate: u32) -> Result<DeviceStream, String> {
    let port = serialport::new(path, baud_rate)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|e| format!("Failed to open {path}: {e}"))?;

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = cancel.clone();

    tokio::task::spawn_blocking(move || read_loop(port, cancel_flag, tx));

    Ok(DeviceStream::new(rx, cancel))
}

/// Blocking read loop: translate reads into channel events until cancelled
/// or the stream ends.
fn read_loop(
    mut port: Box<dyn SerialPort>,
    cancel: Arc<AtomicBool>,
    tx: mpsc::Sender<DeviceEvent>,
) {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        if cancel.load(Ordering::Relaxed) {
            // Cancellation comes from the watchdog, which has already
            // logged the disconnect; exit without an event.
            tracing::debug!("serial reader cancelled");
            return;
        }

        match port.read(&mut buf) {
            Ok(0) => {
                let _ = tx.blocking_send(DeviceEvent::Closed);
                return;
            }
            Ok(n) => {
                if tx.blocking_send(DeviceEvent::Data(buf[..n].to_vec())).is_err() {
                    // Receiver dropped; session is gone.
                    return;
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.blocking_send(DeviceEvent::Error(e.to_string()));
                let _ = tx.blocking_send(DeviceEvent::Closed);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (tx, rx) = mpsc::channel(8);
        let mut stream = DeviceStream::new(rx, Arc::new(AtomicBool::new(false)));

        tx.send(DeviceEvent::Data(b"abc".to_vec())).await.unwrap();
        tx.send(DeviceEvent::Closed).await.unwrap();

        assert_eq!(stream.next_event().await, DeviceEvent::Data(b"abc".to_vec()));
        assert_eq!(stream.next_event().await, DeviceEvent::Closed);
    }

    #[tokio::test]
    async fn dropped_sender_reads_as_closed() {
        let (tx, rx) = mpsc::channel::<DeviceEvent>(8);
        let mut stream = DeviceStream::new(rx, Arc::new(AtomicBool::new(false)));
        drop(tx);

        assert_eq!(stream.next_event().await, DeviceEvent::Closed);
    }

    #[tokio::test]
    async fn dropping_the_stream_raises_the_cancel_flag() {
        let (_tx, rx) = mpsc::channel::<DeviceEvent>(8);
        let cancel = Arc::new(AtomicBool::new(false));
        let stream = DeviceStream::new(rx, cancel.clone());

        drop(stream);
        assert!(cancel.load(Ordering::Relaxed));
    }
}
