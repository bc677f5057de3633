use indexmap::{IndexMap, IndexSet};

/// Sentinel text shown for names that couldn't be resolved.
pub const UNDEFINED: &str = "undefined";

/// Sentinel text shown for values whose representation couldn't be computed.
pub const UNRECOVERABLE_REPR: &str = "UNRECOVERABLE REPR FAILURE";

/// Error raised while resolving a (dotted) name to the text of its value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The base name isn't bound in the scope.
    #[error("name '{0}' is not defined")]
    Unbound(String),

    /// An attribute lookup failed partway through a dotted path.
    #[error("'{owner}' has no attribute '{attr}'")]
    NoAttribute {
        /// Dotted path resolved so far.
        owner: String,
        /// Attribute that couldn't be found.
        attr: String,
    },

    /// Computing the representation of the value failed.
    #[error("{0}")]
    Repr(String),

    /// Resolution was interrupted by the user.
    #[error("interrupted")]
    Interrupted,
}

/// Name scope of a captured frame (its locals or its globals).
///
/// Implementors give access to live values of the failing program. Resolving
/// a name may be arbitrarily expensive and may fail; callers substitute a
/// sentinel on failure.
pub trait Scope {
    /// Returns whether `name` is one of the variable names of this scope,
    /// even if it isn't bound (yet).
    fn declares(&self, name: &str) -> bool;

    /// Resolves a dotted name (e.g., `a.b.c`) and returns the text
    /// representation of its value.
    fn eval(&self, dotted: &str) -> Result<String, EvalError>;
}

/// Captured value: its text representation plus named attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    repr: Result<String, String>,
    attrs: IndexMap<String, Value>,
}

impl Value {
    /// Creates a value with the given representation.
    pub fn new(repr: impl Into<String>) -> Self {
        Self {
            repr: Ok(repr.into()),
            attrs: IndexMap::new(),
        }
    }

    /// Creates a value whose representation fails with the given reason.
    pub fn unprintable(reason: impl Into<String>) -> Self {
        Self {
            repr: Err(reason.into()),
            attrs: IndexMap::new(),
        }
    }

    /// Adds a named attribute to this value.
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    /// Returns the representation of this value.
    pub fn repr(&self) -> Result<&str, EvalError> {
        self.repr
            .as_deref()
            .map_err(|reason| EvalError::Repr(reason.to_owned()))
    }

    /// Returns the named attribute of this value.
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Returns the attributes of this value, in insertion order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// In-memory [Scope] over captured values.
#[derive(Clone, Debug, Default)]
pub struct ValueScope {
    declared: IndexSet<String>,
    bindings: IndexMap<String, Value>,
}

impl ValueScope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a value.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bind(name, value);
        self
    }

    /// Declares a name without binding it.
    pub fn with_unbound(mut self, name: impl Into<String>) -> Self {
        self.declared.insert(name.into());
        self
    }

    /// Binds a name to a value, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

impl Scope for ValueScope {
    fn declares(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.declared.contains(name)
    }

    fn eval(&self, dotted: &str) -> Result<String, EvalError> {
        let mut parts = dotted.split('.');

        let base = parts.next().unwrap_or_default();
        let mut value = self
            .bindings
            .get(base)
            .ok_or_else(|| EvalError::Unbound(base.to_owned()))?;

        let mut path = base.to_owned();
        for attr in parts {
            value = value.attr(attr).ok_or_else(|| EvalError::NoAttribute {
                owner: path.clone(),
                attr: attr.to_owned(),
            })?;

            path.push('.');
            path.push_str(attr);
        }

        value.repr().map(str::to_owned)
    }
}

/// Shortens `text` to at most `max` characters, eliding its middle with
/// `...`.
///
/// A `max` too small to hold the ellipsis truncates `text` instead.
pub fn shorten(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_owned();
    }
    if max < 3 {
        return text.chars().take(max).collect();
    }

    let head = max.saturating_sub(3) / 2;
    let tail = max.saturating_sub(3).saturating_sub(head);

    let mut out: String = text.chars().take(head).collect();
    out.push_str("...");
    out.extend(text.chars().skip(len - tail));
    out
}

#[cfg(test)]
mod tests {
    use super::{EvalError, Scope, Value, ValueScope, shorten};

    fn scope() -> ValueScope {
        ValueScope::new()
            .with(
                "config",
                Value::new("<Config>").with_attr(
                    "db",
                    Value::new("<Db>").with_attr("url", Value::new("'sqlite://'")),
                ),
            )
            .with("broken", Value::unprintable("__repr__ raised"))
            .with_unbound("later")
    }

    #[test]
    fn eval_dotted_names() {
        let scope = scope();

        assert_eq!(scope.eval("config").as_deref(), Ok("<Config>"));
        assert_eq!(scope.eval("config.db.url").as_deref(), Ok("'sqlite://'"));
        assert_eq!(
            scope.eval("config.cache.size"),
            Err(EvalError::NoAttribute {
                owner: "config".to_owned(),
                attr: "cache".to_owned()
            })
        );
        assert_eq!(
            scope.eval("broken"),
            Err(EvalError::Repr("__repr__ raised".to_owned()))
        );
    }

    #[test]
    fn declared_but_unbound() {
        let scope = scope();

        assert!(scope.declares("later"));
        assert!(!scope.declares("missing"));
        assert_eq!(
            scope.eval("later"),
            Err(EvalError::Unbound("later".to_owned()))
        );
    }

    #[test]
    fn shorten_elides_middle() {
        assert_eq!(shorten("short", 30), "short");

        let long = "a".repeat(20) + &"b".repeat(20);
        let short = shorten(&long, 30);
        assert_eq!(short.chars().count(), 30);
        assert!(short.starts_with(&("a".repeat(13) + "...")));
        assert!(short.ends_with(&"b".repeat(14)));
    }

    #[test]
    fn shorten_never_exceeds_max() {
        for max in 0..6 {
            assert!(shorten("abcdefghij", max).chars().count() <= max, "{max}");
        }
        assert_eq!(shorten("abcdefghij", 2), "ab");
        assert_eq!(shorten("abcdefghij", 3), "...");
    }
}
