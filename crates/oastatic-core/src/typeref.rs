//! The intermediate type form produced by source resolution and consumed by
//! the type compiler.
//!
//! A [`TypeRef`] is a snapshot of "the type as seen by the checker at a
//! given use site", not a schema yet. It is a closed sum: the compiler
//! dispatches over it with an explicit match rather than dynamic dispatch,
//! so adding a variant is a compile error everywhere it isn't handled.

use serde_json::Value;

/// A resolved reference to a type, as seen at a particular use site.
///
/// `Mapped` and `Utility` are never terminal: the compiler expands them into
/// one of the other variants at the use site rather than emitting a schema
/// for the wrapper itself.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A reference to a nominal declaration (class, interface, type alias,
    /// enum), optionally instantiated with type arguments.
    Named {
        /// Fully-qualified declaration identifier (the *original* name, not
        /// a local import alias).
        qualified_id: String,
        /// Type arguments at this use site, in declaration order.
        type_args: Vec<TypeRef>,
    },
    /// One of the built-in primitive shapes.
    Primitive(PrimitiveKind),
    /// A literal type (`"x"`, `42`, `true`).
    Literal(Value),
    /// `T[]` / `Array<T>`.
    Array(Box<TypeRef>),
    /// A fixed-length tuple.
    Tuple(Vec<TypeRef>),
    /// A union of variants (`A | B | C`).
    Union(Vec<TypeRef>),
    /// An intersection of parts (`A & B`).
    Intersection(Vec<TypeRef>),
    /// An anonymous structural object type.
    Object {
        /// Declared properties, in source order.
        properties: Vec<ObjectProperty>,
        /// Index signature value type, if the object is open
        /// (`{ [key: string]: V }`).
        additional: Option<Box<TypeRef>>,
    },
    /// An unresolved generic type parameter (`T` inside a generic class).
    TypeParam(String),
    /// A mapped type (`{ [K in Keys]: V }`). Expanded at use site; never
    /// reaches the compiler unexpanded in well-formed input.
    Mapped {
        /// The type being keyed over.
        source: Box<TypeRef>,
    },
    /// A TypeScript utility type alias over other types, expanded at the use
    /// site rather than given its own schema name.
    Utility {
        /// Which utility is applied.
        kind: UtilityKind,
        /// The type(s) the utility is applied to, in the order the utility
        /// takes them (e.g. `Pick<T, K>` → `[T, K]`).
        args: Vec<TypeRef>,
    },
}

/// The built-in primitive shapes a [`TypeRef::Primitive`] can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer` — not a native TS primitive, but selected by validation
    /// annotations (`@IsInt`) or explicit numeric-enum ordinal typing.
    Integer,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `any`
    Any,
    /// `unknown`
    Unknown,
    /// `void` / `undefined` as a return type
    Void,
}

/// One property of an anonymous structural [`TypeRef::Object`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// Property key.
    pub name: String,
    /// Declared type.
    pub type_ref: TypeRef,
    /// Whether the `?` marker or a `| undefined` union was present.
    pub optional: bool,
}

/// The TypeScript utility types the compiler knows how to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityKind {
    /// `Partial<T>` — all properties of `T` become optional.
    Partial,
    /// `Required<T>` — all properties of `T` become required.
    Required,
    /// `Pick<T, K>` — restrict `T` to the keys named in `K`.
    Pick,
    /// `Omit<T, K>` — restrict `T` to the keys not named in `K`.
    Omit,
    /// `Record<K, V>` — an open object keyed by `K` with values `V`.
    Record,
}

impl TypeRef {
    /// Shorthand for [`TypeRef::Primitive`] with [`PrimitiveKind::String`].
    #[must_use]
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }

    /// Shorthand for [`TypeRef::Primitive`] with [`PrimitiveKind::Any`].
    #[must_use]
    pub fn any() -> Self {
        Self::Primitive(PrimitiveKind::Any)
    }

    /// `true` for `void`/`undefined`, the only shapes that suppress a
    /// response `content` body (§4.4).
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Primitive(PrimitiveKind::Void))
    }

    /// `true` for `any`/`unknown`, which are meaningful for response
    /// presence but compile to a permissive empty schema.
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        matches!(
            self,
            Self::Primitive(PrimitiveKind::Any | PrimitiveKind::Unknown)
        )
    }

    /// Unwraps one level of `Promise<T>`, returning `T` when `self` is a
    /// `Named` reference to `Promise` with exactly one type argument.
    #[must_use]
    pub fn unwrap_promise(self) -> Self {
        match self {
            Self::Named {
                qualified_id,
                mut type_args,
            } if qualified_id == "Promise" && type_args.len() == 1 => type_args.remove(0),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promise_unwraps_single_arg() {
        let promise = TypeRef::Named {
            qualified_id: "Promise".to_string(),
            type_args: vec![TypeRef::string()],
        };
        assert_eq!(promise.unwrap_promise(), TypeRef::string());
    }

    #[test]
    fn non_promise_named_is_unchanged() {
        let named = TypeRef::Named {
            qualified_id: "UserDto".to_string(),
            type_args: vec![],
        };
        assert_eq!(named.clone().unwrap_promise(), named);
    }

    #[test]
    fn void_and_permissive_classification() {
        assert!(TypeRef::Primitive(PrimitiveKind::Void).is_void());
        assert!(TypeRef::Primitive(PrimitiveKind::Any).is_permissive());
        assert!(TypeRef::Primitive(PrimitiveKind::Unknown).is_permissive());
        assert!(!TypeRef::string().is_permissive());
    }
}
