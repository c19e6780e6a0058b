//! Context-scoped key/value propagation
//!
//! This module provides:
//! - `Context`: an immutable linked environment of key/value pairs
//! - `ContextGuard`: RAII guard that makes a context the ambient one for
//!   the current thread
//!
//! `with_value` never mutates: it returns a child node pointing at its
//! parent, so two children derived from the same parent never observe each
//! other's values and the parent is untouched.

use super::attribute::{Attribute, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

struct Node {
    parent: Option<Arc<Node>>,
    key: String,
    value: Value,
}

impl Drop for Node {
    // Unlink iteratively so that dropping a very deep chain cannot overflow
    // the stack through recursive `Arc` drops.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

thread_local! {
    static CURRENT: RefCell<Context> = RefCell::new(Context::background());
}

/// Immutable carrier of key/value pairs, cheap to clone
///
/// # Example
///
/// ```
/// use rust_structured_logger::Context;
///
/// let root = Context::background();
/// let request = root.with_value("request_id", "abc-123");
/// let retry = request.with_value("attempt", 2);
///
/// assert_eq!(retry.value("request_id").and_then(|v| v.as_str()), Some("abc-123"));
/// assert!(root.value("request_id").is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Return a child context carrying one additional pair
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<Value>) -> Context {
        Context {
            head: Some(Arc::new(Node {
                parent: self.head.clone(),
                key: key.into(),
                value: value.into(),
            })),
        }
    }

    /// Look a key up, innermost binding first
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.nodes().find(|node| node.key == key).map(|node| &node.value)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of nodes in the chain, including shadowed ones
    pub fn depth(&self) -> usize {
        self.nodes().count()
    }

    /// Collect every visible pair as attributes
    ///
    /// Order is root to leaf by first appearance of each key; when a key is
    /// bound more than once the innermost value wins.
    pub fn snapshot(&self) -> Vec<Attribute> {
        if self.head.is_none() {
            return Vec::new();
        }

        let mut chain: Vec<&Node> = self.nodes().collect();
        chain.reverse();

        let mut attrs: Vec<Attribute> = Vec::with_capacity(chain.len());
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(chain.len());
        for node in chain {
            match index.get(node.key.as_str()) {
                Some(&pos) => attrs[pos].value = node.value.clone(),
                None => {
                    index.insert(node.key.as_str(), attrs.len());
                    attrs.push(Attribute::new(node.key.clone(), node.value.clone()));
                }
            }
        }
        attrs
    }

    /// The ambient context of the current thread
    ///
    /// This is [`Context::background`] unless a [`ContextGuard`] is alive.
    pub fn current() -> Context {
        CURRENT
            .try_with(|current| current.borrow().clone())
            .unwrap_or_default()
    }

    /// Make this context the ambient one for the current thread
    ///
    /// The previous ambient context is restored when the guard drops.
    #[must_use = "the context is only ambient while the guard is alive"]
    pub fn enter(&self) -> ContextGuard {
        let previous = CURRENT.with(|current| current.replace(self.clone()));
        ContextGuard {
            previous: Some(previous),
            _not_send: PhantomData,
        }
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut next = self.head.as_deref();
        std::iter::from_fn(move || {
            let node = next?;
            next = node.parent.as_deref();
            Some(node)
        })
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for attr in self.snapshot() {
            map.entry(&attr.key, &attr.value);
        }
        map.finish()
    }
}

/// RAII guard for the ambient context of a thread
///
/// Not `Send`: it must be dropped on the thread that created it.
pub struct ContextGuard {
    previous: Option<Context>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let _ = CURRENT.try_with(|current| *current.borrow_mut() = previous);
        }
    }
}
