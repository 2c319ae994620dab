//! Declarative code-change descriptions.
//!
//! Generators describe what a file must contain; they never touch a tree. A
//! [`ChangeSet`] carries no file identity, only the class it is about and the
//! declarations that class must have.

use crate::php::{ConstDecl, Expr, MethodDecl, PropertyDecl, Stmt, UseImport};

/// Shape of the class a change set targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSpec {
    pub name: String,
    /// Modifiers used when the class is created (`final`, `abstract`).
    pub modifiers: Vec<String>,
    pub extends: Option<String>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
            extends: None,
        }
    }

    pub fn final_class(name: impl Into<String>) -> Self {
        Self {
            modifiers: vec!["final".to_string()],
            ..Self::new(name)
        }
    }
}

/// One idempotent instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum CodeChange {
    /// Ensure the file imports a name.
    Import(UseImport),
    /// Ensure the class implements an interface.
    Implements(String),
    /// Ensure the class uses a trait.
    UseTrait(String),
    /// Ensure a constant exists (matched by name).
    Constant(ConstDecl),
    /// Ensure a property exists (matched by name).
    Property(PropertyDecl),
    /// Ensure a method exists (matched by name).
    Method(MethodDecl),
    /// Methods that exist together or not at all: added only when none of
    /// them is present yet.
    MethodGroup(Vec<MethodDecl>),
    /// Append statements to an existing method unless an equivalent
    /// registration is already there.
    InjectStatements { method: String, statements: Vec<Stmt> },
    /// Add `key => value` to the array returned by an existing method.
    InjectClassMapEntry { method: String, key: Expr, value: Expr },
}

impl CodeChange {
    /// The merge pass the change belongs to. Passes run in ascending order.
    pub fn pass(&self) -> Pass {
        match self {
            Self::Import(_) => Pass::Imports,
            Self::Implements(_) => Pass::Implements,
            Self::UseTrait(_) => Pass::Traits,
            Self::Constant(_) => Pass::Constants,
            Self::Property(_) => Pass::Properties,
            Self::Method(_) | Self::MethodGroup(_) => Pass::Methods,
            Self::InjectStatements { .. } | Self::InjectClassMapEntry { .. } => Pass::Injections,
        }
    }
}

/// The fixed merge pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pass {
    StrictTypes,
    Namespace,
    Imports,
    Class,
    Implements,
    Traits,
    Constants,
    Properties,
    Methods,
    Injections,
}

impl Pass {
    pub const ORDER: [Pass; 10] = [
        Pass::StrictTypes,
        Pass::Namespace,
        Pass::Imports,
        Pass::Class,
        Pass::Implements,
        Pass::Traits,
        Pass::Constants,
        Pass::Properties,
        Pass::Methods,
        Pass::Injections,
    ];
}

/// Everything one artifact requires from one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub namespace: String,
    pub class: ClassSpec,
    pub changes: Vec<CodeChange>,
}

impl ChangeSet {
    pub fn new(namespace: impl Into<String>, class: ClassSpec) -> Self {
        Self {
            namespace: namespace.into(),
            class,
            changes: Vec::new(),
        }
    }

    pub fn push(&mut self, change: CodeChange) -> &mut Self {
        self.changes.push(change);
        self
    }

    pub fn import(&mut self, import: UseImport) -> &mut Self {
        self.push(CodeChange::Import(import))
    }

    pub fn implements(&mut self, interface: impl Into<String>) -> &mut Self {
        self.push(CodeChange::Implements(interface.into()))
    }

    pub fn use_trait(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(CodeChange::UseTrait(name.into()))
    }

    pub fn constant(&mut self, decl: ConstDecl) -> &mut Self {
        self.push(CodeChange::Constant(decl))
    }

    pub fn property(&mut self, decl: PropertyDecl) -> &mut Self {
        self.push(CodeChange::Property(decl))
    }

    pub fn method(&mut self, method: MethodDecl) -> &mut Self {
        self.push(CodeChange::Method(method))
    }

    pub fn inject(&mut self, method: impl Into<String>, statements: Vec<Stmt>) -> &mut Self {
        self.push(CodeChange::InjectStatements {
            method: method.into(),
            statements,
        })
    }

    pub fn class_map_entry(&mut self, method: impl Into<String>, key: Expr, value: Expr) -> &mut Self {
        self.push(CodeChange::InjectClassMapEntry {
            method: method.into(),
            key,
            value,
        })
    }

    /// Whether another change set may be merged into the same file.
    pub fn targets_same_class(&self, other: &ChangeSet) -> bool {
        self.namespace.trim_matches('\\') == other.namespace.trim_matches('\\')
            && self.class.name.eq_ignore_ascii_case(&other.class.name)
    }

    /// Fully qualified class name.
    pub fn fqcn(&self) -> String {
        let namespace = self.namespace.trim_matches('\\');
        if namespace.is_empty() {
            self.class.name.clone()
        } else {
            format!("{}\\{}", namespace, self.class.name)
        }
    }
}
