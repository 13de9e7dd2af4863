use fugit::MicrosDurationU64;
use smart_leds::RGB8;

/// ADC reference voltage.
pub const ADC_REFERENCE_VOLTS: f32 = 3.3;
/// Largest raw value of the 12-bit ADC.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Heartbeat counter wraps after this many ticks; the LED is on for the second half.
pub const HEARTBEAT_PERIOD: u16 = 100;
pub const HEARTBEAT_TICK: MicrosDurationU64 = MicrosDurationU64::millis(10);
pub const HEARTBEAT_ON_COLOUR: RGB8 = RGB8 { r: 0, g: 24, b: 8 };
pub const HEARTBEAT_OFF_COLOUR: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

pub const USB_VID: u16 = 0x16c2;
pub const USB_PID: u16 = 0x27dd;
pub const USB_MANUFACTURER: &str = "NELC";
pub const USB_PRODUCT: &str = "KB2040-MULTICORE";
pub const USB_SERIAL_NUMBER: &str = "TEST";

pub const CONSOLE_QUEUE_SIZE: usize = 512;
pub const WORKER_LOG_SIZE: usize = 256;
/// Longest single line pushed into a log queue, including the line ending.
pub const LINE_CAPACITY: usize = 160;
/// Bytes taken from the host per console read, matching one full-speed USB packet.
pub const INPUT_CAPACITY: usize = 64;
/// Longest selector token accepted from the operator.
pub const TOKEN_CAPACITY: usize = 16;
