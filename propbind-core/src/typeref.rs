use std::sync::Arc;

/// Raw type tag of a [`TypeRef`].
///
/// This is the dispatch key for converter lookup: the engine memoizes the
/// list of applicable converters per kind, so `TypeKind` is `Copy + Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Str,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    List,
    Set,
    Array,
    Optional,
    Enum,
    Date,
    Time,
    DateTime,
    DateTimeTz,
    /// Wildcard / unconstrained-object parameter. Converted as a plain string.
    Any,
    /// An unresolved type variable. Conversion always rejects it, never
    /// defaults it.
    Var,
}

impl TypeKind {
    fn base_name(self) -> &'static str {
        match self {
            TypeKind::Str => "string",
            TypeKind::Bool => "bool",
            TypeKind::Char => "char",
            TypeKind::I8 => "i8",
            TypeKind::I16 => "i16",
            TypeKind::I32 => "i32",
            TypeKind::I64 => "i64",
            TypeKind::U8 => "u8",
            TypeKind::U16 => "u16",
            TypeKind::U32 => "u32",
            TypeKind::U64 => "u64",
            TypeKind::Usize => "usize",
            TypeKind::F32 => "f32",
            TypeKind::F64 => "f64",
            TypeKind::List => "list",
            TypeKind::Set => "set",
            TypeKind::Array => "array",
            TypeKind::Optional => "optional",
            TypeKind::Enum => "enum",
            TypeKind::Date => "date",
            TypeKind::Time => "time",
            TypeKind::DateTime => "datetime",
            TypeKind::DateTimeTz => "datetime-tz",
            TypeKind::Any => "any",
            TypeKind::Var => "_",
        }
    }
}

/// Declaration of an enumeration target type: its name and the constant
/// names values are matched against (case-sensitively).
///
/// Captured once at accessor registration time; converters never inspect
/// runtime types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    name: String,
    variants: Vec<String>,
}

impl EnumDecl {
    pub fn new(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    pub fn has_variant(&self, name: &str) -> bool {
        self.variants.iter().any(|variant| variant == name)
    }
}

/// Description of a (possibly generic, possibly nested) target type: a raw
/// [`TypeKind`] plus an ordered sequence of type parameters.
///
/// Built explicitly at accessor registration time; all converter logic
/// operates on this tree. A container kind with no parameters is legal and
/// converters treat the missing parameter as `string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    kind: TypeKind,
    params: Vec<TypeRef>,
    enum_decl: Option<Arc<EnumDecl>>,
}

impl TypeRef {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            enum_decl: None,
        }
    }

    pub fn parameterized(kind: TypeKind, params: Vec<TypeRef>) -> Self {
        Self {
            kind,
            params,
            enum_decl: None,
        }
    }

    pub fn string() -> Self {
        Self::new(TypeKind::Str)
    }

    pub fn list_of(element: TypeRef) -> Self {
        Self::parameterized(TypeKind::List, vec![element])
    }

    pub fn set_of(element: TypeRef) -> Self {
        Self::parameterized(TypeKind::Set, vec![element])
    }

    pub fn array_of(element: TypeRef) -> Self {
        Self::parameterized(TypeKind::Array, vec![element])
    }

    pub fn optional_of(inner: TypeRef) -> Self {
        Self::parameterized(TypeKind::Optional, vec![inner])
    }

    pub fn enumeration(decl: EnumDecl) -> Self {
        Self {
            kind: TypeKind::Enum,
            params: Vec::new(),
            enum_decl: Some(Arc::new(decl)),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<&TypeRef> {
        self.params.get(index)
    }

    pub fn enum_decl(&self) -> Option<&EnumDecl> {
        self.enum_decl.as_deref()
    }

    /// Whether this type or any of its parameters is an unresolved type
    /// variable.
    pub fn contains_var(&self) -> bool {
        self.kind == TypeKind::Var || self.params.iter().any(TypeRef::contains_var)
    }

    /// Render the type for error messages, e.g. `list<optional<i32>>`.
    pub fn describe(&self) -> String {
        let base = match (&self.enum_decl, self.kind) {
            (Some(decl), TypeKind::Enum) => decl.name().to_string(),
            _ => self.kind.base_name().to_string(),
        };
        if self.params.is_empty() {
            return base;
        }
        let params: Vec<String> = self.params.iter().map(TypeRef::describe).collect();
        format!("{}<{}>", base, params.join(", "))
    }
}
