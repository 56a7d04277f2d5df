// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ms-driver: the `Driver` / `DriverFactory` contract and its
//! implementations — a websocket-backed offer-stream driver for real use,
//! and a scriptable fake for tests.

mod driver;
mod ws_driver;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use driver::{Driver, DriverError, DriverFactory};
pub use ws_driver::{WsOfferDriver, WsOfferDriverFactory};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDriver, FakeDriverFactory};
