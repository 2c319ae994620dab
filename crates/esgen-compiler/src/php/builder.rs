//! Shorthand constructors for building source-tree nodes in generators.

use super::ast::*;

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn class_const(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ClassConst {
            class: class.into(),
            name: name.into(),
        }
    }

    /// `Class::class`
    pub fn class_ref(class: impl Into<String>) -> Self {
        Self::class_const(class, "class")
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            function: function.into(),
            args,
        }
    }

    pub fn static_call(class: impl Into<String>, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::StaticCall {
            class: class.into(),
            method: method.into(),
            args,
        }
    }

    pub fn new_object(class: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::New {
            class: class.into(),
            args,
        }
    }

    /// Appends `->method(args)`.
    pub fn method(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::MethodCall {
            object: Box::new(self),
            method: method.into(),
            args,
        }
    }

    /// Appends `->property`.
    pub fn prop(self, property: impl Into<String>) -> Self {
        Self::PropertyFetch {
            object: Box::new(self),
            property: property.into(),
        }
    }

    /// `[a, b]`
    pub fn list(values: Vec<Expr>) -> Self {
        Self::Array(values.into_iter().map(|value| ArrayItem { key: None, value }).collect())
    }

    /// `[k => v, ...]`
    pub fn map(entries: Vec<(Expr, Expr)>) -> Self {
        Self::Array(
            entries
                .into_iter()
                .map(|(key, value)| ArrayItem { key: Some(key), value })
                .collect(),
        )
    }

    pub fn concat(self, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(self),
            op: ".".to_string(),
            right: Box::new(right),
        }
    }

    pub fn binary(self, op: impl Into<String>, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(self),
            op: op.into(),
            right: Box::new(right),
        }
    }

    pub fn assign(self, value: Expr) -> Self {
        Self::Assign {
            target: Box::new(self),
            value: Box::new(value),
        }
    }

    pub fn yield_value(value: Expr) -> Self {
        Self::Yield(Some(Box::new(value)))
    }

    pub fn clone_of(value: Expr) -> Self {
        Self::Clone(Box::new(value))
    }

    /// `$this->property`
    pub fn this_prop(property: impl Into<String>) -> Self {
        Self::var("this").prop(property)
    }
}

impl MethodDecl {
    pub fn new(visibility: Visibility, name: impl Into<String>) -> Self {
        Self {
            visibility: Some(visibility),
            name: name.into(),
            body: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn public(name: impl Into<String>) -> Self {
        Self::new(Visibility::Public, name)
    }

    pub fn private(name: impl Into<String>) -> Self {
        Self::new(Visibility::Private, name)
    }

    pub fn public_static(name: impl Into<String>) -> Self {
        Self::public(name).static_method()
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.get_or_insert_with(Vec::new).push(stmt);
        self
    }

    pub fn stmts(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        self.body.get_or_insert_with(Vec::new).extend(stmts);
        self
    }
}

impl Param {
    pub fn typed(type_hint: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_hint: Some(type_hint.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

impl ConstDecl {
    pub fn public(name: impl Into<String>, value: Expr) -> Self {
        Self {
            visibility: Some(Visibility::Public),
            entries: vec![ConstEntry {
                name: name.into(),
                value,
            }],
        }
    }
}

impl PropertyDecl {
    pub fn private(type_hint: Option<String>, name: impl Into<String>) -> Self {
        Self {
            visibility: Some(Visibility::Private),
            is_static: false,
            readonly: false,
            type_hint,
            entries: vec![PropertyEntry {
                name: name.into(),
                default: None,
            }],
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        if let Some(entry) = self.entries.first_mut() {
            entry.default = Some(default);
        }
        self
    }
}

impl From<MethodDecl> for Member {
    fn from(method: MethodDecl) -> Self {
        Member::new(MemberKind::Method(method))
    }
}

impl From<ConstDecl> for Member {
    fn from(decl: ConstDecl) -> Self {
        Member::new(MemberKind::Constant(decl))
    }
}

impl From<PropertyDecl> for Member {
    fn from(decl: PropertyDecl) -> Self {
        Member::new(MemberKind::Property(decl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php::printer::print_expr;

    #[test]
    fn builds_chains_and_literals() {
        let e = Expr::var("cmd").method("payload", vec![]);
        assert_eq!(print_expr(&e), "$cmd->payload()");

        let path = Expr::class_const("self", "SCHEMA_PATH").concat(Expr::string("AddBuilding.json"));
        assert_eq!(print_expr(&path), "self::SCHEMA_PATH . 'AddBuilding.json'");

        let handle = Expr::list(vec![Expr::class_ref("Building"), Expr::string("addBuilding")]);
        assert_eq!(print_expr(&handle), "[Building::class, 'addBuilding']");
    }

    #[test]
    fn builds_methods() {
        let m = MethodDecl::public_static("addBuilding")
            .param(Param::typed("Message", "addBuilding"))
            .returns("Generator");
        assert!(m.is_static);
        assert_eq!(m.visibility, Some(Visibility::Public));
        assert_eq!(m.body, Some(vec![]));
    }
}
