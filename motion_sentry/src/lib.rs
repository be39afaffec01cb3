// THEORY:
// This file is the main entry point for the `motion_sentry` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API exposed to the process binaries (the detector daemon and the
// queue consumers).
//
// The producer side is reached through `pipeline` (configuration, per-frame
// processing, publishing); the consumer side lives in `core_modules::tailer`
// and `core_modules::trail` (cursors, bounded scans, recency trails). The
// shared record schema sits in `core_modules::event`, owned by neither side.

pub mod core_modules;
pub mod pipeline;
