//! Pluggable decoders for application-defined extension types.

use std::collections::HashMap;
use std::fmt;

use ziproto_buffers::Reader;

use crate::error::Error;
use crate::value::Value;

/// A decoder callback for one extension type code.
///
/// The handler receives a cursor scoped to exactly the extension payload
/// together with the payload's byte length, and returns the decoded value.
pub type ExtHandler = Box<dyn Fn(&mut Reader<'_>, usize) -> Result<Value, Error> + Send + Sync>;

/// Registry mapping one-byte extension type codes to decoder callbacks.
///
/// Codes `0..=127` are available for applications; the rest of the range
/// is reserved by format convention. The decoder consults the registry on
/// every extension tag and falls back to a raw
/// [`Value::Extension`] for unregistered codes, so unknown extensions
/// survive a decode/re-encode round trip unchanged.
#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: HashMap<u8, ExtHandler>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `code`, replacing any previous handler.
    pub fn register<F>(&mut self, code: u8, handler: F) -> Result<(), Error>
    where
        F: Fn(&mut Reader<'_>, usize) -> Result<Value, Error> + Send + Sync + 'static,
    {
        if code > 127 {
            return Err(Error::InvalidOption {
                group: "extension type code",
                allowed: "0..=127",
            });
        }
        self.handlers.insert(code, Box::new(handler));
        Ok(())
    }

    pub fn get(&self, code: u8) -> Option<&ExtHandler> {
        self.handlers.get(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

// Boxed closures have no useful Debug form; list the registered codes only.
impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<u8> = self.handlers.keys().copied().collect();
        codes.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("codes", &codes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.is_empty());
        registry
            .register(5, |reader, size| {
                reader.try_buf(size)?;
                Ok(Value::Nil)
            })
            .unwrap();
        assert!(registry.get(5).is_some());
        assert!(registry.get(6).is_none());
    }

    #[test]
    fn test_reserved_codes_rejected() {
        let mut registry = ExtensionRegistry::new();
        let err = registry.register(200, |_, _| Ok(Value::Nil)).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }
}
