//! Method identity and invocation context.
//!
//! The JVM-style approach of introspecting live method objects does not
//! exist here; instead, every interceptable method is described once at
//! startup by a [`MethodDescriptor`] and collected into a
//! [`MethodRegistry`]. At call time the caller hands the interceptor an
//! [`Invocation`]: the descriptor of the method being executed plus an
//! ordered digest of its arguments.
//!
//! ```rust
//! use muninn::{Invocation, MethodDescriptor};
//!
//! let method = MethodDescriptor::new("BookService", "find_by_isbn", ["&str"]);
//! let invocation = Invocation::new(&method).arg(&"978-3-16-148410-0");
//! assert_eq!(method.qualified_name(), "BookService.find_by_isbn");
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Stable structural identity of an interceptable method.
///
/// Declaring-type name, method name, and parameter-type names together
/// identify a method the way a reflective `Method` object would, but with a
/// representation that is identical across processes and restarts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    type_name: String,
    method_name: String,
    parameter_types: Vec<String>,
}

impl MethodDescriptor {
    /// Describe a method by declaring type, name, and parameter-type names.
    ///
    /// Pass an empty iterator for a method without parameters.
    pub fn new<I, S>(type_name: impl Into<String>, method_name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            parameter_types: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Declaring-type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Bare method name, without the declaring type.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Parameter-type names, in declaration order.
    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    /// `"Type.method"` — the form method-name patterns are matched against.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }

    /// Stable 32-bit hash of the full descriptor.
    ///
    /// Seeds the cache-key accumulator. Derived from the structural fields
    /// only, so the same descriptor hashes identically in every process —
    /// keys survive restarts, unlike identity-based method hashes.
    pub fn stable_hash(&self) -> i32 {
        let mut hasher = DefaultHasher::new();
        self.type_name.hash(&mut hasher);
        self.method_name.hash(&mut hasher);
        self.parameter_types.hash(&mut hasher);
        fold(hasher.finish())
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({})",
            self.type_name,
            self.method_name,
            self.parameter_types.join(", ")
        )
    }
}

/// The 32-bit hash contribution of one method argument.
///
/// Mirrors what an argument's own hash code would contribute on the JVM:
/// built from any `Hash` value, from an explicit raw code, or
/// [`ArgumentDigest::null`] for an absent argument (contributes zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgumentDigest(Option<i32>);

impl ArgumentDigest {
    /// Digest of a hashable argument value.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        Self(Some(fold(hasher.finish())))
    }

    /// Digest carrying an explicit raw hash code.
    pub fn from_raw(hash: i32) -> Self {
        Self(Some(hash))
    }

    /// Digest of an absent argument.
    pub fn null() -> Self {
        Self(None)
    }

    /// The raw contribution, or `None` for an absent argument.
    pub fn raw(&self) -> Option<i32> {
        self.0
    }
}

/// One intercepted call: the method's descriptor plus ordered argument
/// digests.
///
/// Created fresh for every call; everything else in the binding and key
/// machinery is configuration-time state.
#[derive(Clone, Debug)]
pub struct Invocation<'a> {
    method: &'a MethodDescriptor,
    arguments: Vec<ArgumentDigest>,
}

impl<'a> Invocation<'a> {
    /// Start an invocation of the given method with no arguments.
    pub fn new(method: &'a MethodDescriptor) -> Self {
        Self {
            method,
            arguments: Vec::new(),
        }
    }

    /// Append a hashable argument.
    pub fn arg<T: Hash + ?Sized>(mut self, value: &T) -> Self {
        self.arguments.push(ArgumentDigest::of(value));
        self
    }

    /// Append an absent argument (contributes zero to the key).
    pub fn null_arg(mut self) -> Self {
        self.arguments.push(ArgumentDigest::null());
        self
    }

    /// Append a pre-built digest.
    pub fn digest(mut self, digest: ArgumentDigest) -> Self {
        self.arguments.push(digest);
        self
    }

    /// The invoked method's descriptor.
    pub fn method(&self) -> &MethodDescriptor {
        self.method
    }

    /// Argument digests in call order.
    pub fn arguments(&self) -> &[ArgumentDigest] {
        &self.arguments
    }
}

/// Startup-populated set of interceptable methods.
///
/// Wildcard model registration resolves patterns eagerly against this set.
/// Populate during single-threaded configuration; read-only afterwards.
/// Registration order is preserved, which makes pattern resolution (and the
/// rebinding rules built on it) deterministic.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: Vec<MethodDescriptor>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method. Re-registering an identical descriptor is a no-op.
    pub fn register(&mut self, method: MethodDescriptor) -> &mut Self {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    /// All registered methods, in registration order.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Whether the given descriptor has been registered.
    pub fn contains(&self, method: &MethodDescriptor) -> bool {
        self.methods.contains(method)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Fold a 64-bit std hash down to the 32-bit space the calculator folds.
fn fold(hash: u64) -> i32 {
    (hash ^ (hash >> 32)) as i32
}
