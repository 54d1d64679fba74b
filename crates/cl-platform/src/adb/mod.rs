mod devices;
mod transport;

pub use devices::parse_device_list;
pub use transport::{AdbError, AdbTransport};
