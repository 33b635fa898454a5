// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public-facing API a dump scheduler calls. It hides the
// accumulators, the decoder and the reduction step behind one pure function per
// dump. Nothing here holds state between calls: the `ParseConfig` is built once
// by the caller and only read.
//
// Data Flow (one dump):
//
//   1. [Scheduler]                       -> dump text + &ParseConfig
//         |
//         `-> calls for each dump ->
//
//   2. [Stateless API (process_dump)]
//         |
//         `-> a. StatTypeRegistry::build_all   -> fresh StatSet
//         |
//         `-> b. decoder::decode_dump          -> accumulators written and defaulted
//         |
//         `-> c. reduction::reduce_dump        -> DumpRow
//
//   3. [Scheduler]                       -> writes the row (or records the error)
//
// Dumps are independent, so a scheduler may run `process_dump` on many threads
// sharing one `Arc<ParseConfig>`; a failing dump never affects another.
// ====================================================================================
pub mod stateless_api;

// --- Low-Level Stateless API ---
pub use stateless_api::{header_for, header_for_with, process_dump, process_dump_with};
