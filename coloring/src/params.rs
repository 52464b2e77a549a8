//! Tuning parameters read from environment variables.
//!
//! Such parameters are meant for knobs that are too specialized to deserve a command line option.
//! A parameter is read once, on first access, from its environment variable. If the variable is
//! absent or cannot be parsed, the declared default is used.
//!
//! ```
//! use kcoloring::params::EnvParam;
//! static GROUP_SIZE: EnvParam<usize> = EnvParam::new("MY_GROUP_SIZE", "3");
//!
//! assert_eq!(GROUP_SIZE.get(), 3);
//! ```

use once_cell::sync::OnceCell;
use std::str::FromStr;

pub struct EnvParam<T> {
    value: OnceCell<T>,
    env: &'static str,
    default: &'static str,
}

impl<T> EnvParam<T> {
    pub const fn new(env: &'static str, default: &'static str) -> Self {
        EnvParam {
            value: OnceCell::new(),
            env,
            default,
        }
    }
}

impl<T: FromStr> EnvParam<T> {
    /// # Panic
    ///
    /// Panics if the declared default value cannot be parsed, which is a programming error.
    fn default_value(&self) -> T {
        match T::from_str(self.default) {
            Ok(value) => value,
            Err(_) => panic!("{}: invalid default value \"{}\"", self.env, self.default),
        }
    }

    fn read(&self) -> T {
        match std::env::var(self.env) {
            Ok(raw) => T::from_str(raw.trim()).unwrap_or_else(|_| {
                tracing::warn!(
                    "Could not parse \"{}\" for parameter {}, using default \"{}\"",
                    raw,
                    self.env,
                    self.default
                );
                self.default_value()
            }),
            Err(std::env::VarError::NotPresent) => self.default_value(),
            Err(err) => {
                tracing::warn!("{}: {}, using default \"{}\"", self.env, err, self.default);
                self.default_value()
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        self.value.get_or_init(|| self.read())
    }

    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }

    /// Forces the value of the parameter.
    ///
    /// Returns false, leaving the parameter untouched, if its value was already read.
    pub fn set(&self, value: T) -> bool {
        self.value.set(value).is_ok()
    }
}
