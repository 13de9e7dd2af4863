pub mod led_task;
pub mod usb_task;
