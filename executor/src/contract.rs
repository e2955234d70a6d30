//! Call targets hosted by the executor.

use std::collections::BTreeMap;

use quorum_types::{Address, Bytes, TokenAmount};

/// What a contract sees about the call it is handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// The account the call is made from (the governor's treasury).
    pub caller: Address,
    /// The contract's own address.
    pub this: Address,
    /// Native value attached to the call, already credited to `this`.
    pub value: TokenAmount,
}

/// An opaque call target.
///
/// Contracts must be cloneable as trait objects so the host can stage a
/// whole batch against a copy and throw the copy away on failure.
pub trait Contract: Send {
    fn call(&mut self, ctx: &CallContext, calldata: &[u8]) -> Result<Bytes, String>;

    fn box_clone(&self) -> Box<dyn Contract>;

    /// Short name for logs.
    fn kind(&self) -> &'static str {
        "contract"
    }
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// A key/value store of governance-controlled settings.
///
/// Calldata is UTF-8: `set <key> <value>` writes and returns the previous
/// value, `get <key>` returns the current one, `unset <key>` removes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterStore {
    values: BTreeMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Contract for ParameterStore {
    fn call(&mut self, _ctx: &CallContext, calldata: &[u8]) -> Result<Bytes, String> {
        let text = std::str::from_utf8(calldata).map_err(|_| "calldata is not utf-8".to_string())?;
        let mut words = text.split_whitespace();
        let reply = match (words.next(), words.next(), words.next(), words.next()) {
            (Some("set"), Some(key), Some(value), None) => self
                .values
                .insert(key.to_string(), value.to_string())
                .unwrap_or_default(),
            (Some("get"), Some(key), None, None) => self.values.get(key).cloned().unwrap_or_default(),
            (Some("unset"), Some(key), None, None) => self.values.remove(key).unwrap_or_default(),
            _ => return Err(format!("unrecognised call: {text:?}")),
        };
        Ok(Bytes::new(reply.into_bytes()))
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn kind(&self) -> &'static str {
        "parameter_store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> CallContext {
        CallContext {
            caller: Address::from_low_u64(1),
            this: Address::from_low_u64(2),
            value: TokenAmount::ZERO,
        }
    }

    #[test]
    fn set_get_unset() {
        let mut store = ParameterStore::new();
        assert_eq!(&*store.call(&ctx(), b"set fee 30").unwrap(), b"");
        assert_eq!(&*store.call(&ctx(), b"set fee 25").unwrap(), b"30");
        assert_eq!(&*store.call(&ctx(), b"get fee").unwrap(), b"25");
        assert_eq!(store.get("fee"), Some("25"));
        assert_eq!(&*store.call(&ctx(), b"unset fee").unwrap(), b"25");
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_malformed_calldata() {
        let mut store = ParameterStore::new();
        assert!(store.call(&ctx(), b"set fee").is_err());
        assert!(store.call(&ctx(), b"drop table").is_err());
        assert!(store.call(&ctx(), &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn boxed_clone_is_independent() {
        let mut original: Box<dyn Contract> = Box::new(ParameterStore::new());
        let mut copy = original.clone();
        copy.call(&ctx(), b"set a 1").unwrap();
        assert_eq!(&*original.call(&ctx(), b"get a").unwrap(), b"");
        assert_eq!(original.kind(), "parameter_store");
    }
}
