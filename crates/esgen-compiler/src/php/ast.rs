//! Editable tree of one PHP source file.
//!
//! Nodes read from disk keep their original text in a [`Verbatim`] until the
//! merge engine edits them; the printer then falls back to the structural
//! fields. Constructs the tree does not model are kept as verbatim text only.

/// Original source text of a node, dedented to the node's start column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
    pub text: String,
    /// The text is printed with its original layout: it holds a literal
    /// spanning several lines, or a continuation line starts left of the node.
    pub fixed: bool,
}

impl Verbatim {
    /// Captures `text` that starts at `column` of its first line.
    ///
    /// Whitespace-only lines become empty; other lines lose exactly `column`
    /// leading characters and are otherwise kept as written.
    pub fn from_source(text: &str, column: usize) -> Self {
        let mut lines = text.split('\n');
        let mut out: Vec<&str> = lines.next().into_iter().collect();
        for line in lines {
            if line.trim().is_empty() {
                out.push("");
                continue;
            }
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            if indent < column {
                return Self::fixed(text);
            }
            out.push(&line[column..]);
        }
        Self {
            text: out.join("\n"),
            fixed: false,
        }
    }

    /// Text printed exactly as written after its first line.
    pub fn fixed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fixed: true,
        }
    }
}

// =============================================================================
// File level
// =============================================================================

/// One parsed or freshly created PHP file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTree {
    pub strict_types: bool,
    /// Comments between the open tag and the namespace declaration.
    pub header: Vec<Verbatim>,
    pub namespace: Option<String>,
    pub uses: Vec<UseImport>,
    pub items: Vec<Item>,
}

impl SourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree without any declaration.
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.uses.is_empty() && self.items.is_empty() && self.header.is_empty()
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Class(class) => Some(class),
            Item::Other { .. } => None,
        })
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassDecl> {
        self.items.iter_mut().find_map(|item| match item {
            Item::Class(class) if class.name.eq_ignore_ascii_case(name) => Some(class),
            _ => None,
        })
    }

    /// Name of the first class-like declaration of the file (class,
    /// interface, trait or enum).
    pub fn declared_name(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            Item::Class(class) => Some(class.name.as_str()),
            Item::Other { declares, .. } => declares.as_deref(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    Class,
    Function,
    Const,
}

/// A `use` import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseImport {
    /// Fully qualified name without leading backslash.
    pub name: String,
    pub alias: Option<String>,
    pub kind: UseKind,
}

impl UseImport {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim_start_matches('\\').to_string(),
            alias: None,
            kind: UseKind::Class,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::class(name)
        }
    }

    /// The name the import is referred to by in the file.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.name.rsplit('\\').next().unwrap_or(&self.name),
        }
    }

    /// Namespace part of the imported name.
    pub fn namespace(&self) -> &str {
        self.name.rsplit_once('\\').map(|(ns, _)| ns).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Class(ClassDecl),
    /// Anything else at file level, kept as text. `declares` names an
    /// interface, trait or enum declared by the item.
    Other { declares: Option<String>, code: Verbatim },
}

// =============================================================================
// Class level
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDecl {
    /// Attribute groups (`#[...]`) as written.
    pub attributes: Vec<String>,
    /// `final`, `abstract`, `readonly`, in source order.
    pub modifiers: Vec<String>,
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub members: Vec<Member>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match &m.kind {
            MemberKind::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn constant_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().flat_map(|m| match &m.kind {
            MemberKind::Constant(decl) => decl.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().flat_map(|m| match &m.kind {
            MemberKind::Property(decl) => decl.entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }

    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().flat_map(|m| match &m.kind {
            MemberKind::TraitUse(names) => names.iter().map(String::as_str).collect::<Vec<_>>(),
            _ => Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

/// One class member.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub kind: MemberKind,
    pub verbatim: Option<Verbatim>,
    /// A comment on the same line, after the member.
    pub trailing: Option<String>,
}

impl Member {
    pub fn new(kind: MemberKind) -> Self {
        Self {
            kind,
            verbatim: None,
            trailing: None,
        }
    }

    /// Marks the member as edited so that it is printed from its fields.
    pub fn touch(&mut self) {
        self.verbatim = None;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    /// `use A, B;` inside the class body.
    TraitUse(Vec<String>),
    Constant(ConstDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
    /// Only ever read from source, so always verbatim.
    Comment,
    /// Enum cases and other members the tree does not model.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub visibility: Option<Visibility>,
    pub entries: Vec<ConstEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstEntry {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub readonly: bool,
    pub type_hint: Option<String>,
    pub entries: Vec<PropertyEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    /// Without the `$`.
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodDecl {
    pub attributes: Vec<String>,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub by_ref: bool,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    /// `None` for abstract and interface methods.
    pub body: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Param {
    /// Attribute groups (`#[...]`) as written.
    pub attributes: Vec<String>,
    /// Constructor promotion modifiers, e.g. `private readonly`.
    pub promotion: Option<String>,
    pub type_hint: Option<String>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Without the `$`.
    pub name: String,
    pub default: Option<Expr>,
}

// =============================================================================
// Statements and expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub verbatim: Option<Verbatim>,
    pub trailing: Option<String>,
    /// The statement was separated from the previous one by a blank line.
    pub blank_before: bool,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            verbatim: None,
            trailing: None,
            blank_before: false,
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Self::new(StmtKind::Expr(expr))
    }

    pub fn ret(expr: Expr) -> Self {
        Self::new(StmtKind::Return(Some(expr)))
    }

    /// The expression of an expression or return statement.
    pub fn expression(&self) -> Option<&Expr> {
        match &self.kind {
            StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => Some(expr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    Return(Option<Expr>),
    /// Comments and statements the tree does not model (verbatim only).
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `$name`, stored without the `$`.
    Variable(String),
    /// A bare or qualified name: constant, class or function name.
    Name(String),
    /// `Class::NAME`, including `Class::class`.
    ClassConst { class: String, name: String },
    String(String),
    Int(i64),
    Float(String),
    Bool(bool),
    Null,
    Array(Vec<ArrayItem>),
    Call { function: String, args: Vec<Expr> },
    MethodCall { object: Box<Expr>, method: String, args: Vec<Expr> },
    StaticCall { class: String, method: String, args: Vec<Expr> },
    PropertyFetch { object: Box<Expr>, property: String },
    New { class: String, args: Vec<Expr> },
    Clone(Box<Expr>),
    Yield(Option<Box<Expr>>),
    Assign { target: Box<Expr>, value: Box<Expr> },
    Binary { left: Box<Expr>, op: String, right: Box<Expr> },
    /// Source text of an expression the tree does not model.
    Raw(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbatim_dedents_to_start_column() {
        let text = "public function a()\n    {\n        return 1;\n\n    }";
        let v = Verbatim::from_source(text, 4);
        assert_eq!(v.text, "public function a()\n{\n    return 1;\n\n}");
        assert!(!v.fixed);
    }

    #[test]
    fn verbatim_keeps_layout_when_lines_start_further_left() {
        let text = "public function a()\n    {\n        return <<<EOT\nraw\nEOT;\n    }";
        let v = Verbatim::from_source(text, 4);
        assert!(v.fixed);
        assert_eq!(v.text, text);
    }

    #[test]
    fn verbatim_keeps_trailing_whitespace() {
        let v = Verbatim::from_source("return 1;   // note  \n    ", 4);
        assert_eq!(v.text, "return 1;   // note  \n");
    }

    #[test]
    fn import_local_names() {
        assert_eq!(UseImport::class("\\EventEngine\\Messaging\\Message").local_name(), "Message");
        assert_eq!(UseImport::class("Generator").local_name(), "Generator");
        assert_eq!(UseImport::class("Generator").namespace(), "");
        assert_eq!(UseImport::aliased("App\\Model\\BuildingState", "State").local_name(), "State");
    }
}
