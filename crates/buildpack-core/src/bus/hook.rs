//! Synchronous broadcast hooks.

use std::fmt;

use super::ExtensionError;

type TapFn<T> = Box<dyn Fn(&mut T) -> Result<(), ExtensionError> + Send + Sync>;

struct Tap<T> {
    name: String,
    callback: TapFn<T>,
}

/// Error raised by one tap while a hook was being called
#[derive(Debug, thiserror::Error)]
#[error("tap '{tap}' failed: {source}")]
pub struct HookError {
    pub tap: String,
    #[source]
    pub source: ExtensionError,
}

/// Ordered list of subscribers sharing one mutable payload
///
/// Taps run in registration order. Each receives the same `&mut T`, so a
/// later tap sees whatever earlier taps wrote. Return values are not passed
/// between taps; the first error stops the call.
pub struct SyncHook<T> {
    taps: Vec<Tap<T>>,
}

impl<T> SyncHook<T> {
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Subscribe `callback` under `name`
    pub fn tap<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&mut T) -> Result<(), ExtensionError> + Send + Sync + 'static,
    {
        self.taps.push(Tap {
            name: name.into(),
            callback: Box::new(callback),
        });
    }

    /// Invoke every tap in order with `payload`
    pub fn call(&self, payload: &mut T) -> Result<(), HookError> {
        for tap in &self.taps {
            (tap.callback)(payload).map_err(|source| HookError {
                tap: tap.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn tap_names(&self) -> impl Iterator<Item = &str> {
        self.taps.iter().map(|tap| tap.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

impl<T> Default for SyncHook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SyncHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHook")
            .field("taps", &self.tap_names().collect::<Vec<_>>())
            .finish()
    }
}
