//! Cache objects
//!
//! A `StashObject` is what a script holds after constructing a cache class: a
//! class tag plus the native store behind it. Method calls arrive as host values,
//! get type-checked here, and are forwarded to the store.

use std::sync::Arc;

use crate::cache::{CacheStats, MemStash, Stash, TimeStash};
use crate::error::{Result, StashError};
use crate::host::{ClassKind, Value};

/// Methods every cache class declares.
pub const METHODS: [&str; 5] = ["PUT", "GET", "CONTAINS", "DELETE", "CLEAR"];

/// The read-only size property.
pub const SIZE_PROPERTY: &str = "SIZ";

// == Stash Object ==
/// Host-facing handle to a cache instance.
///
/// Cloning the handle shares the underlying store.
#[derive(Debug, Clone)]
pub struct StashObject {
    class: ClassKind,
    storage: Option<Arc<dyn Stash>>,
}

impl StashObject {
    /// Creates an object whose constructor has not run yet.
    pub fn uninitialized(class: ClassKind) -> Self {
        Self {
            class,
            storage: None,
        }
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    pub fn is_initialized(&self) -> bool {
        self.storage.is_some()
    }

    // == Constructor ==
    /// Runs the class constructor, validating its single integer argument.
    pub fn construct(&mut self, args: &[Value]) -> Result<()> {
        let name = self.class.name();
        let Some(param) = self.class.constructor_param() else {
            return Err(abstract_constructor(name));
        };

        expect_arity(name, args, 1)?;
        let arg = args[0].as_integer().ok_or_else(|| {
            StashError::Type(format!(
                "{} constructor expects INTEGR {}, got {}",
                name,
                param,
                args[0].type_name()
            ))
        })?;

        let storage: Arc<dyn Stash> = match self.class {
            ClassKind::MemStash => Arc::new(MemStash::new(arg)?),
            ClassKind::TimeStash => Arc::new(TimeStash::new(arg)?),
            ClassKind::Stash => return Err(abstract_constructor(name)),
        };
        self.storage = Some(storage);
        Ok(())
    }

    // == Method Dispatch ==
    /// Calls `method` with host arguments.
    ///
    /// GET returns `NOTHIN` for a missing key; CONTAINS and DELETE return
    /// `BOOL`; PUT and CLEAR return `NOTHIN`.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let method = method.to_uppercase();
        if !METHODS.contains(&method.as_str()) {
            return Err(StashError::UnknownMember(format!(
                "{} has no method {}",
                self.class.name(),
                method
            )));
        }
        let store = self.storage(|| format!("{}: invalid context", method))?;

        match method.as_str() {
            "PUT" => {
                expect_arity(&method, args, 2)?;
                let key = text_arg(&method, "key", &args[0])?;
                let value = text_arg(&method, "value", &args[1])?;
                store.put(key, value);
                Ok(Value::Nothin)
            }
            "GET" => {
                expect_arity(&method, args, 1)?;
                let key = text_arg(&method, "key", &args[0])?;
                Ok(Value::from(store.get(key)))
            }
            "CONTAINS" => {
                expect_arity(&method, args, 1)?;
                let key = text_arg(&method, "key", &args[0])?;
                Ok(Value::from(store.contains(key)))
            }
            "DELETE" => {
                expect_arity(&method, args, 1)?;
                let key = text_arg(&method, "key", &args[0])?;
                Ok(Value::from(store.delete(key)))
            }
            _ => {
                expect_arity(&method, args, 0)?;
                store.clear();
                Ok(Value::Nothin)
            }
        }
    }

    // == Property Access ==
    /// Reads a public property. Only `SIZ` exists.
    pub fn property(&self, name: &str) -> Result<Value> {
        if !name.eq_ignore_ascii_case(SIZE_PROPERTY) {
            return Err(StashError::UnknownMember(format!(
                "{} has no property {}",
                self.class.name(),
                name
            )));
        }
        let store = self.storage(|| format!("invalid context for {}", SIZE_PROPERTY))?;
        Ok(Value::from(store.size() as i64))
    }

    /// Returns the store's counters.
    pub fn stats(&self) -> Result<CacheStats> {
        Ok(self.storage(|| "STATS: invalid context".to_string())?.stats())
    }

    /// Returns the native store; `invalid_context` builds the message used
    /// when the constructor never ran.
    fn storage<F>(&self, invalid_context: F) -> Result<&Arc<dyn Stash>>
    where
        F: FnOnce() -> String,
    {
        if self.class.is_abstract() {
            return Err(StashError::NotImplemented("Not implemented".to_string()));
        }
        self.storage
            .as_ref()
            .ok_or_else(|| StashError::InvalidState(invalid_context()))
    }
}

fn abstract_constructor(name: &str) -> StashError {
    StashError::NotImplemented(format!("{} is abstract and cannot be constructed", name))
}

// == Argument Checks ==
fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(StashError::Type(format!(
            "{} expects {} argument{}, got {}",
            name,
            expected,
            if expected == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

fn text_arg<'a>(method: &str, param: &str, arg: &'a Value) -> Result<&'a str> {
    arg.as_text().ok_or_else(|| {
        StashError::Type(format!(
            "{} expects STRIN {}, got {}",
            method,
            param,
            arg.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem(capacity: i64) -> StashObject {
        let mut object = StashObject::uninitialized(ClassKind::MemStash);
        object.construct(&[Value::Integer(capacity)]).unwrap();
        object
    }

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_construct_validation() {
        for bad in [0, -1] {
            let mut object = StashObject::uninitialized(ClassKind::MemStash);
            let err = object.construct(&[Value::Integer(bad)]).unwrap_err();
            assert_eq!(
                err,
                StashError::Validation("MEMSTASH capacity must be positive".to_string())
            );
            assert!(!object.is_initialized());

            let mut object = StashObject::uninitialized(ClassKind::TimeStash);
            let err = object.construct(&[Value::Integer(bad)]).unwrap_err();
            assert_eq!(
                err,
                StashError::Validation("TIMESTASH TTL must be positive".to_string())
            );
        }
    }

    #[test]
    fn test_construct_type_errors() {
        let mut object = StashObject::uninitialized(ClassKind::MemStash);
        let err = object.construct(&[text("10")]).unwrap_err();
        assert_eq!(
            err,
            StashError::Type("MEMSTASH constructor expects INTEGR capacity, got STRIN".to_string())
        );

        let mut object = StashObject::uninitialized(ClassKind::TimeStash);
        let err = object.construct(&[Value::Double(1.5)]).unwrap_err();
        assert_eq!(
            err,
            StashError::Type(
                "TIMESTASH constructor expects INTEGR ttl_seconds, got DUBBLE".to_string()
            )
        );

        let err = object.construct(&[]).unwrap_err();
        assert!(matches!(err, StashError::Type(_)));
    }

    #[test]
    fn test_abstract_class() {
        let mut object = StashObject::uninitialized(ClassKind::Stash);
        assert!(matches!(
            object.construct(&[Value::Integer(1)]),
            Err(StashError::NotImplemented(_))
        ));
        assert!(matches!(
            object.call("PUT", &[text("k"), text("v")]),
            Err(StashError::NotImplemented(_))
        ));
        assert!(matches!(
            object.property("SIZ"),
            Err(StashError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_uninitialized_object_is_invalid_state() {
        let object = StashObject::uninitialized(ClassKind::TimeStash);
        assert_eq!(
            object.call("get", &[text("k")]).unwrap_err(),
            StashError::InvalidState("GET: invalid context".to_string())
        );
        assert_eq!(
            object.property("SIZ").unwrap_err(),
            StashError::InvalidState("invalid context for SIZ".to_string())
        );
    }

    #[test]
    fn test_dispatch_round() {
        let object = mem(2);
        assert_eq!(object.call("PUT", &[text("a"), text("1")]).unwrap(), Value::Nothin);
        assert_eq!(object.call("GET", &[text("a")]).unwrap(), text("1"));
        assert_eq!(object.call("GET", &[text("b")]).unwrap(), Value::Nothin);
        assert_eq!(object.call("CONTAINS", &[text("a")]).unwrap(), Value::Bool(true));
        assert_eq!(object.property("SIZ").unwrap(), Value::Integer(1));
        assert_eq!(object.call("DELETE", &[text("a")]).unwrap(), Value::Bool(true));
        assert_eq!(object.call("DELETE", &[text("a")]).unwrap(), Value::Bool(false));
        assert_eq!(object.call("CLEAR", &[]).unwrap(), Value::Nothin);
        assert_eq!(object.property("siz").unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_non_text_arguments() {
        let object = mem(2);
        assert_eq!(
            object.call("PUT", &[Value::Integer(1), text("v")]).unwrap_err(),
            StashError::Type("PUT expects STRIN key, got INTEGR".to_string())
        );
        assert_eq!(
            object.call("PUT", &[text("k"), Value::Bool(true)]).unwrap_err(),
            StashError::Type("PUT expects STRIN value, got BOOL".to_string())
        );
        assert_eq!(
            object.call("CONTAINS", &[Value::Nothin]).unwrap_err(),
            StashError::Type("CONTAINS expects STRIN key, got NOTHIN".to_string())
        );
        assert_eq!(object.property("SIZ").unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_arity_and_unknown_members() {
        let object = mem(2);
        assert_eq!(
            object.call("PUT", &[text("k")]).unwrap_err(),
            StashError::Type("PUT expects 2 arguments, got 1".to_string())
        );
        assert!(matches!(
            object.call("CLEAR", &[text("x")]),
            Err(StashError::Type(_))
        ));
        assert!(matches!(
            object.call("EVICT", &[]),
            Err(StashError::UnknownMember(_))
        ));
        assert!(matches!(
            object.property("CAPACITY"),
            Err(StashError::UnknownMember(_))
        ));
    }

    #[test]
    fn test_clones_share_store() {
        let object = mem(2);
        let other = object.clone();
        object.call("PUT", &[text("k"), text("v")]).unwrap();
        assert_eq!(other.call("GET", &[text("k")]).unwrap(), text("v"));
        assert_eq!(other.stats().unwrap().hits, 1);
    }
}
