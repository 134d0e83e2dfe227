//! Device-bus and operator-bus ingress handling (components C6, C7), the
//! in-memory transport abstraction (§6.1), and client-connection tracking
//! (component C9) for the smartfarm fleet controller.
//!
//! # Crate layout
//!
//! | Module            | Contents                                          |
//! |--------------------|---------------------------------------------------|
//! | [`transport`]      | `InboundBus`/`OutboundBus`, `InMemoryBus`          |
//! | [`device_event`]   | Device-bus topic parsing, `DeviceEvent`            |
//! | [`operator_event`] | `OperatorEvent`, the `mapName`/`farmName` alias    |
//! | [`battery`]        | Voltage-to-percent conversion                      |
//! | [`device_handler`] | `DeviceBusHandler` (C6)                            |
//! | [`operator_handler`] | `OperatorBusHandler` (C7)                        |
//! | [`connection`]     | `ConnectionTracker` (C9)                           |
//! | [`keys`]           | Key and topic builders                             |
//! | [`error`]          | `BusError`, `BusResult<T>`                         |

pub mod battery;
pub mod connection;
pub mod device_event;
pub mod device_handler;
pub mod error;
pub mod keys;
pub mod operator_event;
pub mod operator_handler;
pub mod transport;

pub use connection::ConnectionTracker;
pub use device_handler::DeviceBusHandler;
pub use error::{BusError, BusResult};
pub use operator_handler::{LEGACY_OPERATOR_CHANNEL, OPERATOR_CHANNEL, OperatorBusHandler};
pub use transport::{Envelope, InMemoryBus, InMemoryBusHandle, InMemoryInbound, InboundBus, OutboundBus};
