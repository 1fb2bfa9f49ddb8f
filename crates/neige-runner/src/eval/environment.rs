//! The persistent Lua state shared by every evaluation.

use std::fmt;

use mlua::{Function, Lua};
use thiserror::Error;

/// Global name of the conversion used to render expression values.
const TOSTRING_GLOBAL: &str = "tostring";

/// Errors raised while preparing an [`Environment`].
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The standard `tostring` conversion was unavailable.
    #[error("failed to capture the '{TOSTRING_GLOBAL}' global: {message}")]
    Tostring {
        /// Rendered Lua error, kept as text so the error stays `Send`.
        message: String,
    },
}

/// A persistent namespace that evaluations read from and write into.
///
/// Each environment owns its own Lua state, so globals defined through one
/// environment are invisible to another. The state is not `Send`: the
/// dispatch worker builds its environment on its own thread and keeps it
/// there for the lifetime of the loop.
pub struct Environment {
    lua: Lua,
    tostring: Function,
}

impl Environment {
    /// Creates a fresh environment with the Lua standard library loaded.
    ///
    /// The `tostring` global is captured at creation so snippets that
    /// reassign it cannot break result rendering.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Tostring`] when the standard library does
    /// not expose `tostring` as a function.
    pub fn new() -> Result<Self, EnvironmentError> {
        let lua = Lua::new();
        let tostring = lua
            .globals()
            .get::<Function>(TOSTRING_GLOBAL)
            .map_err(|source| EnvironmentError::Tostring {
                message: source.to_string(),
            })?;
        Ok(Self { lua, tostring })
    }

    pub(crate) fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Converts a value with Lua's default string conversion, honouring
    /// `__tostring` and `__name` metamethods.
    pub(crate) fn to_display_string(&self, value: mlua::Value) -> mlua::Result<String> {
        let rendered = self.tostring.call::<mlua::String>(value)?;
        Ok(rendered.to_string_lossy().into())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Environment")
            .field("used_memory", &self.lua.used_memory())
            .finish_non_exhaustive()
    }
}
