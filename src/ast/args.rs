// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Constructor arguments

use super::Value;

/// Keyword that names a node instead of setting an attribute
pub const NAME_KEY: &str = "name";

/// Positional and keyword arguments handed to a node constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
    name: Option<String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pos(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument; `name` is reserved and labels the node
    pub fn kw(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if key == NAME_KEY {
            if let Value::Str(name) = value {
                self.name = Some(name);
                return self;
            }
        }
        self.keywords.push((key.to_string(), value));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }

    pub fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty() && self.name.is_none()
    }

    pub(crate) fn into_parts(self) -> (Vec<Value>, Vec<(String, Value)>, Option<String>) {
        (self.positional, self.keywords, self.name)
    }
}

/// Build [`Args`] with call-like syntax
///
/// ```
/// use scadkit::args;
/// let kw = args!(h = 10, r = 20);
/// let pos = args!([1, 2, 3]);
/// let both = args!(1; center = true);
/// assert_eq!(kw.keywords().len(), 2);
/// assert_eq!(pos.positional().len(), 1);
/// assert_eq!(both.keywords().len(), 1);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::ast::Args::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {
        $crate::ast::Args::new()$(.kw(stringify!($key), $value))+
    };
    ($($pos:expr),+ ; $($key:ident = $value:expr),* $(,)?) => {
        $crate::ast::Args::new()$(.pos($pos))+$(.kw(stringify!($key), $value))*
    };
    ($($pos:expr),+ $(,)?) => {
        $crate::ast::Args::new()$(.pos($pos))+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_keyword_is_reserved() {
        let args = Args::new().kw("name", "bob").kw("x", 1);
        assert_eq!(args.label(), Some("bob"));
        assert_eq!(args.keywords().len(), 1);
    }

    #[test]
    fn test_macro_forms() {
        let args = crate::args!(20, [0, 0, 1]);
        assert_eq!(args.positional().len(), 2);
        let args = crate::args!(fn = 10, fa = 1);
        assert_eq!(args.keywords()[0].0, "fn");
        assert!(crate::args!().is_empty());
    }
}
