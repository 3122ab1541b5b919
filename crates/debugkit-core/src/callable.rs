//! The callable abstraction every wrapper is built around.
//!
//! A [`Callable`] is a named unit of behavior taking an argument tuple and
//! returning a `Result`. Wrappers are callables too, so they nest.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::error::Error;

/// A named callable taking `Args`.
pub trait Callable<Args> {
    /// Value produced on success.
    type Output;
    /// Failure produced by the callable.
    type Error;

    /// The callable's name, used in every report line.
    fn name(&self) -> &str;

    /// Invoke the callable.
    fn call(&self, args: Args) -> Result<Self::Output, Self::Error>;
}

impl<Args, C: Callable<Args> + ?Sized> Callable<Args> for &C {
    type Output = C::Output;
    type Error = C::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: Args) -> Result<Self::Output, Self::Error> {
        (**self).call(args)
    }
}

impl<Args, C: Callable<Args> + ?Sized> Callable<Args> for Box<C> {
    type Output = C::Output;
    type Error = C::Error;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, args: Args) -> Result<Self::Output, Self::Error> {
        (**self).call(args)
    }
}

/// A type-erased callable, used when a wrapper stack is assembled at runtime.
pub type BoxCallable<'a, Args, T, E> =
    Box<dyn Callable<Args, Output = T, Error = E> + Send + Sync + 'a>;

/// A named infallible function.
///
/// Created by [`function`]. Its error type is the crate [`Error`], which only
/// ever carries failures raised by the instrumentation around it.
pub struct Function<F, E = Error> {
    name: Cow<'static, str>,
    f: F,
    _error: PhantomData<fn() -> E>,
}

/// Wrap an infallible function under `name`.
///
/// ```
/// use debugkit_core::callable::{function, Callable};
///
/// let add = function("add", |(a, b): (i32, i32)| a + b);
/// assert_eq!(add.call((1, 2)).unwrap(), 3);
/// ```
pub fn function<F>(name: impl Into<Cow<'static, str>>, f: F) -> Function<F> {
    Function {
        name: name.into(),
        f,
        _error: PhantomData,
    }
}

impl<F, E> Function<F, E> {
    /// Use a different error type for this function.
    ///
    /// Useful when the surrounding stack must share an application error type.
    pub fn with_error<E2>(self) -> Function<F, E2> {
        Function {
            name: self.name,
            f: self.f,
            _error: PhantomData,
        }
    }
}

impl<Args, F, T, E> Callable<Args> for Function<F, E>
where
    F: Fn(Args) -> T,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: Args) -> Result<T, E> {
        Ok((self.f)(args))
    }
}

impl<F, E> fmt::Debug for Function<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function").field("name", &self.name).finish()
    }
}

/// A named fallible function.
///
/// Created by [`try_function`].
pub struct TryFunction<F> {
    name: Cow<'static, str>,
    f: F,
}

/// Wrap a fallible function under `name`.
pub fn try_function<F>(name: impl Into<Cow<'static, str>>, f: F) -> TryFunction<F> {
    TryFunction {
        name: name.into(),
        f,
    }
}

impl<Args, F, T, E> Callable<Args> for TryFunction<F>
where
    F: Fn(Args) -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: Args) -> Result<T, E> {
        (self.f)(args)
    }
}

impl<F> fmt::Debug for TryFunction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryFunction").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_call() {
        let add = function("add", |(a, b): (i32, i32)| a + b);
        assert_eq!(add.name(), "add");
        assert_eq!(add.call((2, 3)).unwrap(), 5);
    }

    #[test]
    fn test_try_function_propagates_error() {
        let parse = try_function("parse", |(s,): (&str,)| s.parse::<i32>());
        assert_eq!(parse.call(("12",)).unwrap(), 12);
        assert!(parse.call(("twelve",)).is_err());
    }

    #[test]
    fn test_boxed_callable() {
        let boxed: BoxCallable<'_, (i32,), i32, Error> =
            Box::new(function("double", |(x,): (i32,)| x * 2));
        assert_eq!(boxed.name(), "double");
        assert_eq!(boxed.call((21,)).unwrap(), 42);
    }

    #[test]
    fn test_with_error_keeps_name() {
        #[derive(Debug)]
        struct AppError;

        let f = function("noop", |(): ()| ()).with_error::<AppError>();
        assert_eq!(f.name(), "noop");
        let result: Result<(), AppError> = f.call(());
        assert!(result.is_ok());
    }
}
