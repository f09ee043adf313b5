//! Adapters, concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to               |
//! |-------------|--------------------|---------------------------|
//! | `hardware`  | SensorPort         | Sensor simulator          |
//! |             | ActuatorPort       | Valve and fan drivers     |
//! | `log_sink`  | EventSink          | `log` output              |
//! | `settings`  | ConfigPort         | postcard blob (mem/file)  |
//! | `simulator` |                    | Synthetic sensor frames   |
//! | `time`      |                    | Host monotonic + local clock |

pub mod hardware;
pub mod log_sink;
pub mod settings;
pub mod simulator;
pub mod time;
