pub mod device;
pub mod events;
mod number;
pub mod sensor;
pub mod sensor_key;
pub mod snapshot;

pub use number::Number;
