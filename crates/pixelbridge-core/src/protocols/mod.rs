//! Wire codecs for both ends of the bridge.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and constants (source of truth)
//! - `reader`/`encoder`: bounds-checked byte access
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit errors
//!
//! Codecs are pure and hold no state; sockets and serial ports live in
//! `listener` and `serial`.

pub mod artnet;
pub mod opc;
