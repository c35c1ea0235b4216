//! Pooling of dynamically typed [`Value`]s.

use deep_clone::{CloneDepth, Cloner, Diagnostics, Value};

use crate::{FactoryKind, HookTarget, Replicate};

impl HookTarget for Value {
    /// Invokes the value if it is a function, without a `this` value.
    fn call_self(&mut self, args: &[Value]) -> bool {
        self.as_object()
            .and_then(|object| object.call(&Self::Undefined, args))
            .is_some()
    }

    /// Invokes the function-valued property `name` (own or inherited) with the value as `this`.
    fn call_method(&mut self, name: &str, args: &[Value]) -> bool {
        let this: &Self = self;
        let method = this.get(name);

        method
            .as_object()
            .and_then(|function| function.call(this, args))
            .is_some()
    }
}

impl Replicate for Value {
    /// Produces a new instance from a prototype value.
    ///
    /// * A function is a constructor. It is invoked with a fresh record as `this`, and the
    ///   instance is the object it returns or, if it returns anything else, that record.
    /// * Any other object is cloned.
    /// * Primitive values cannot be prototypes, so an empty record is produced instead.
    fn replicate(&self, depth: CloneDepth, diagnostics: Diagnostics) -> Self {
        let Some(object) = self.as_object() else {
            return Self::record();
        };

        if object.is_callable() {
            let this = Self::record();

            return match object.call(&this, &[]) {
                Some(instance @ Self::Object(_)) => instance,
                _ => this,
            };
        }

        Cloner::new()
            .depth(depth)
            .diagnostics(diagnostics)
            .clone_value(self)
    }

    fn factory_kind(&self) -> FactoryKind {
        match FactoryKind::of(self) {
            // Primitive prototypes are replaced with records.
            FactoryKind::Unknown => FactoryKind::Record,
            kind => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn function_value_calls_itself() {
        let calls = Rc::new(Cell::new(0_usize));
        let observed = Rc::clone(&calls);

        let mut function = Value::function(move |this, args| {
            assert!(this.is_undefined());
            observed.set(args.len());
            Value::Undefined
        });

        assert!(function.call_self(&[Value::from(1)]));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn non_function_does_not_call_itself() {
        assert!(!Value::record().call_self(&[]));
        assert!(!Value::from(5).call_self(&[]));
    }

    #[test]
    fn method_receives_value_as_this() {
        let mut record = Value::record();
        record.set("count", 3);
        record.set(
            "clear",
            Value::function(|this, _| {
                this.set("count", 0);
                Value::Undefined
            }),
        );

        assert!(record.call_method("clear", &[]));
        assert_eq!(record.get("count").as_number(), Some(0.0));
    }

    #[test]
    fn inherited_method_is_found() {
        let prototype = Value::record();
        prototype.set(
            "touch",
            Value::function(|this, args| {
                this.set("touched", args.len() == 1);
                Value::Undefined
            }),
        );
        let mut instance = Value::record_with_prototype(prototype.as_object().unwrap().clone());

        assert!(instance.call_method("touch", &[Value::Null]));
        assert_eq!(instance.get("touched").as_bool(), Some(true));
    }

    #[test]
    fn missing_or_non_function_method_is_ignored() {
        let mut record = Value::record();
        record.set("size", 1);

        assert!(!record.call_method("size", &[]));
        assert!(!record.call_method("absent", &[]));
        assert!(!Value::Null.call_method("absent", &[]));
    }

    #[test]
    fn record_prototype_is_cloned() {
        let inner = Value::record();
        let prototype = Value::record();
        prototype.set("inner", inner.clone());

        let deep = prototype.replicate(CloneDepth::Deep, Diagnostics::Report);
        let shallow = prototype.replicate(CloneDepth::Shallow, Diagnostics::Report);

        assert!(!deep.ptr_eq(&prototype));
        assert!(!deep.get("inner").ptr_eq(&inner));
        assert!(shallow.get("inner").ptr_eq(&inner));
        assert_eq!(prototype.factory_kind(), FactoryKind::Record);
    }

    #[test]
    fn function_prototype_constructs() {
        let constructor = Value::function(|this, _| {
            this.set("ready", true);
            Value::Undefined
        });

        let instance = constructor.replicate(CloneDepth::Shallow, Diagnostics::Report);

        assert_eq!(instance.get("ready").as_bool(), Some(true));
        assert_eq!(constructor.factory_kind(), FactoryKind::Callable);
    }

    #[test]
    fn function_prototype_may_return_its_own_object() {
        let made = Value::sequence([Value::from(1)]);
        let returned = made.clone();
        let constructor = Value::function(move |_, _| returned.clone());

        let instance = constructor.replicate(CloneDepth::Deep, Diagnostics::Report);

        assert!(instance.ptr_eq(&made));
    }

    #[test]
    fn primitive_prototype_becomes_record() {
        let prototype = Value::from("text");
        let instance = prototype.replicate(CloneDepth::Deep, Diagnostics::Report);

        assert_eq!(
            instance.as_object().map(|object| object.type_name()).as_deref(),
            Some("Record")
        );
        assert_eq!(prototype.factory_kind(), FactoryKind::Record);
    }
}
