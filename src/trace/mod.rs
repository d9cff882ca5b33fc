//! Trace-log reconciliation
//!
//! Turns raw tracer output — which may interleave calls across threads and
//! split slow calls into unfinished/resumed pairs — into a stream of
//! complete single-call records.

mod numeric;
mod reconcile;
mod record;

pub use numeric::{decode, split_args};
pub use reconcile::LineReconciler;
pub use record::TraceRecord;
