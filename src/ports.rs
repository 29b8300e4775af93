use crate::stream::{self, DeviceStream};

/// Seam over the operating system's serial layer: enumeration of visible
/// device paths, and opening one of them as a byte stream.
pub trait SerialSystem {
    /// Point-in-time snapshot of currently visible device paths. A failure
    /// is transient and non-fatal; the caller skips that poll cycle.
    fn list_ports(&self) -> Result<Vec<String>, String>;

    /// Open the device and start delivering its bytes.
    fn open(&self, path: &str, baud_rate: u32) -> Result<DeviceStream, String>;
}

/// Production implementation backed by the `serialport` crate.
pub struct SystemSerial;

impl SerialSystem for SystemSerial {
    fn list_ports(&self) -> Result<Vec<String>, String> {
        let ports = serialport::available_ports()
            .map_err(|e| format!("Failed to enumerate ports: {e}"))?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(&self, path: &str, baud_rate: u32) -> Result<DeviceStream, String> {
        stream::open_device(path, baud_rate)
    }
}
