#![cfg_attr(not(test), no_std)]

//! relay-feedback - Self-calibrating zero-crossing capture for relay commutation
//!
//! This library measures, through a digital feedback line, how far an
//! electromechanical relay's actual ON/OFF transition lags the commanded
//! half-cycle boundary, so the commutation schedule can be steered toward the
//! AC zero crossing (less contact wear, less inrush).
//!
//! All hardware access goes through the platform abstraction traits in
//! [`platform`], so the capture driver in [`devices`] runs unchanged on any
//! target that provides an edge-interrupt pin and a monotonic microsecond
//! timer, and on the host against the mock platform.

// The diagnostic sample buffer is sized at runtime; the final firmware
// supplies the global allocator.
extern crate alloc;

// Platform abstraction layer
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Core systems (logging)
pub mod core;
