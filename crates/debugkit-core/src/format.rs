//! Safe rendering of call arguments for logging.
//!
//! Arguments are rendered without ever invoking their `Debug` or `Display`
//! implementations. Primitive values render as their Rust source literal;
//! everything else renders as an identity placeholder of the form
//! `<TypeName object at 0xADDRESS>`.
//!
//! # Example
//!
//! ```
//! use debugkit_core::format::{Arguments, Named, SafeFormat};
//!
//! struct Secret;
//! impl SafeFormat for Secret {}
//!
//! let args = (1, "two", Named::new("scale", 0.5));
//! assert_eq!(args.to_argument_list().to_string(), r#"1, "two", scale=0.5"#);
//!
//! assert!(Secret.safe_format().starts_with("<Secret object at 0x"));
//! ```

use std::any::type_name;
use std::fmt;

/// A value that can be rendered into a log line without running its own
/// formatting logic.
///
/// The provided [`safe_format`](SafeFormat::safe_format) renders the
/// identity placeholder, so an empty `impl SafeFormat for MyType {}` is
/// enough to make a type loggable. Primitive types override it with their
/// literal form.
pub trait SafeFormat {
    /// Render the value.
    fn safe_format(&self) -> String {
        placeholder(self)
    }

    /// Append the rendered value to an argument list.
    ///
    /// Positional by default; [`Named`] overrides this to record a keyword
    /// argument instead.
    fn append_to(&self, list: &mut ArgumentList) {
        list.push_positional(self.safe_format());
    }
}

/// Render the identity placeholder for any value.
pub fn placeholder<T: ?Sized>(value: &T) -> String {
    let address = value as *const T as *const () as usize;
    format!("<{} object at {:#x}>", short_type_name::<T>(), address)
}

/// A type's name with every module path removed.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`,
/// `(i32, alloc::string::String)` becomes `(i32, String)`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = type_name::<T>();
    let mut short = String::with_capacity(full.len());
    // Start of the path currently being read, as an offset into `short`.
    let mut path_start = 0;
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            short.truncate(path_start);
        } else {
            short.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                path_start = short.len();
            }
        }
    }
    short
}

macro_rules! impl_integer_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SafeFormat for $ty {
                fn safe_format(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_literal!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_debug_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SafeFormat for $ty {
                fn safe_format(&self) -> String {
                    format!("{:?}", self)
                }
            }
        )*
    };
}

// Debug output of these std types is their source-literal form:
// `1.0`, `'c'`, `"text"` (quoted and escaped).
impl_debug_literal!(f32, f64, char, str, String);

impl SafeFormat for bool {
    fn safe_format(&self) -> String {
        self.to_string()
    }
}

impl<T: SafeFormat + ?Sized> SafeFormat for &T {
    fn safe_format(&self) -> String {
        (**self).safe_format()
    }

    fn append_to(&self, list: &mut ArgumentList) {
        (**self).append_to(list)
    }
}

/// Renders any borrowed value as the identity placeholder.
///
/// Use this for argument types that do not implement [`SafeFormat`].
pub struct Opaque<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> Clone for Opaque<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Opaque<'_, T> {}

impl<T: ?Sized> SafeFormat for Opaque<'_, T> {
    fn safe_format(&self) -> String {
        placeholder(self.0)
    }
}

impl<T: ?Sized> fmt::Debug for Opaque<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&placeholder(self.0))
    }
}

/// A keyword argument.
///
/// Keyword arguments render as `key=value` and are listed after all
/// positional arguments, in the order they appear at the call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Named<T> {
    /// Keyword name.
    pub key: &'static str,
    /// Argument value.
    pub value: T,
}

impl<T> Named<T> {
    /// Create a keyword argument.
    pub fn new(key: &'static str, value: T) -> Self {
        Self { key, value }
    }

    /// Unwrap the argument value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: SafeFormat> SafeFormat for Named<T> {
    fn safe_format(&self) -> String {
        format!("{}={}", self.key, self.value.safe_format())
    }

    fn append_to(&self, list: &mut ArgumentList) {
        list.push_named(self.key, self.value.safe_format());
    }
}

/// Rendered snapshot of the arguments passed at one call site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    positional: Vec<String>,
    named: Vec<(String, String)>,
}

impl ArgumentList {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rendered positional argument.
    pub fn push_positional(&mut self, rendered: String) {
        self.positional.push(rendered);
    }

    /// Record a rendered keyword argument.
    pub fn push_named(&mut self, key: impl Into<String>, rendered: String) {
        self.named.push((key.into(), rendered));
    }

    /// Rendered positional arguments, in call order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Rendered keyword arguments, in call-site order.
    pub fn named(&self) -> &[(String, String)] {
        &self.named
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// Check if no arguments were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rendered in &self.positional {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(rendered)?;
            first = false;
        }
        for (key, rendered) in &self.named {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, rendered)?;
            first = false;
        }
        Ok(())
    }
}

/// A full argument tuple that can be rendered for logging.
///
/// Implemented for `()` and for tuples of up to eight [`SafeFormat`]
/// elements.
pub trait Arguments {
    /// Append every argument to `list`.
    fn collect_into(&self, list: &mut ArgumentList);

    /// Render every argument into a fresh list.
    fn to_argument_list(&self) -> ArgumentList {
        let mut list = ArgumentList::new();
        self.collect_into(&mut list);
        list
    }
}

impl Arguments for () {
    fn collect_into(&self, _list: &mut ArgumentList) {}
}

macro_rules! impl_arguments_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: SafeFormat),+> Arguments for ($($name,)+) {
            #[allow(non_snake_case)]
            fn collect_into(&self, list: &mut ArgumentList) {
                let ($($name,)+) = self;
                $($name.append_to(list);)+
            }
        }
    };
}

impl_arguments_for_tuple!(A);
impl_arguments_for_tuple!(A, B);
impl_arguments_for_tuple!(A, B, C);
impl_arguments_for_tuple!(A, B, C, D);
impl_arguments_for_tuple!(A, B, C, D, E);
impl_arguments_for_tuple!(A, B, C, D, E, F);
impl_arguments_for_tuple!(A, B, C, D, E, F, G);
impl_arguments_for_tuple!(A, B, C, D, E, F, G, H);
