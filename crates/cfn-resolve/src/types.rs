use crate::error::ResolveError;

/// Number of positional arguments a function or condition accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Skip the arity check.
    Any,
    /// Exactly `n` arguments.
    Fixed(usize),
    /// At least `n` arguments.
    AtLeast(usize),
}

/// Asserts that an argument list has the right length.
pub fn assert_arity(function: &'static str, arity: Arity, len: usize) -> Result<(), ResolveError> {
    match arity {
        Arity::Any => Ok(()),
        Arity::Fixed(n) if len != n => Err(ResolveError::Arity {
            function,
            message: format!("expects {} arguments, got {}.", n, len),
        }),
        Arity::AtLeast(n) if len < n => Err(ResolveError::Arity {
            function,
            message: format!("expects at least {} arguments, got {}.", n, len),
        }),
        _ => Ok(()),
    }
}
