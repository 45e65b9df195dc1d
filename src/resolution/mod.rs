//! Call resolution (§4.7): receiver-bound and receiverless call-site
//! resolution against the frozen Symbol Registry.

pub mod call_resolver;

pub use call_resolver::{resolve_call, ResolvedCall, SuperclassChain};
