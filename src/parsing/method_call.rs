//! Method call representation.
//!
//! # Separation of Concerns
//!
//! - `MethodCall` — owns DATA (the extracted call site).
//! - `resolution::call_resolver` — owns LOGIC (resolving a call site to a
//!   callee QN, §4.7).
//!
//! ```text
//! Declaration Extractor
//!   └─ extract_calls() ──→ Vec<MethodCall> (per file)
//!                               │
//!                               ↓
//!                       call_resolver::resolve_call()
//! ```

use crate::types::Range;

/// A single call site: `(receiver_text?, name, arg_count)` plus its
/// enclosing callable's QN and source range (§4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// The simple name of the callable containing this call site.
    pub caller: String,
    pub method_name: String,
    /// `Some("self")`/`Some("this")`, `Some("vec")`, `Some("String")`, or
    /// `None` for a receiverless call.
    pub receiver: Option<String>,
    /// Retained for potential future diagnostics only; never read by
    /// `call_resolver` (spec §9: arg-count is not used for overload
    /// resolution).
    pub arg_count: usize,
    pub range: Range,
}

impl MethodCall {
    pub fn new(caller: impl Into<String>, method_name: impl Into<String>, range: Range) -> Self {
        Self {
            caller: caller.into(),
            method_name: method_name.into(),
            receiver: None,
            arg_count: 0,
            range,
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    pub fn with_arg_count(mut self, arg_count: usize) -> Self {
        self.arg_count = arg_count;
        self
    }

    pub fn is_this_call(&self) -> bool {
        matches!(self.receiver.as_deref(), Some("this") | Some("self"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let range = Range::new(1, 0, 1, 10);
        let call = MethodCall::new("process", "push", range)
            .with_receiver("vec")
            .with_arg_count(1);
        assert_eq!(call.caller, "process");
        assert_eq!(call.method_name, "push");
        assert_eq!(call.receiver.as_deref(), Some("vec"));
        assert_eq!(call.arg_count, 1);
        assert!(!call.is_this_call());
    }

    #[test]
    fn test_this_call_detection() {
        let range = Range::new(1, 0, 1, 10);
        let call = MethodCall::new("save", "validate", range).with_receiver("this");
        assert!(call.is_this_call());
    }
}
