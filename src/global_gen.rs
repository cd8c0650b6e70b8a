//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync::OnceLock;

use crate::generator::{StdSystemTime, V1Generator};
use crate::Tuid;

/// Returns the process-wide global generator, creating one if none exists.
fn global_gen() -> &'static V1Generator<StdSystemTime> {
    static G: OnceLock<V1Generator<StdSystemTime>> = OnceLock::new();
    G.get_or_init(V1Generator::new)
}

/// Generates a time-based identifier.
///
/// This function employs a process-wide generator, so every identifier issued within one
/// process carries a distinct, strictly increasing timestamp field, even under concurrent
/// calls from many threads. The node and clock sequence fields are fixed for the process
/// lifetime; uniqueness across processes and machines rests on the hashed node identity.
///
/// # Examples
///
/// ```rust
/// let id = tuid::tuid();
/// println!("{}", id); // e.g., "599c6000-918e-11f1-ae81-9d27b10ef5d3"
/// println!("{:?}", id.as_bytes()); // as 16-byte big-endian array
///
/// let id_string: String = tuid::tuid().to_string();
/// ```
pub fn tuid() -> Tuid {
    global_gen().generate()
}
