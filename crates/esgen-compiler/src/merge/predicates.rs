//! "Is it already there?" checks used by the merge passes.

use crate::php::{print_expr, ClassDecl, Expr, MemberKind, SourceTree, Stmt, StmtKind, UseImport};

/// Last segment of a possibly qualified name.
pub fn short_name(name: &str) -> &str {
    name.trim_start_matches('\\').rsplit('\\').next().unwrap_or(name)
}

/// PHP class names are case-insensitive.
pub fn same_class_name(a: &str, b: &str) -> bool {
    short_name(a).eq_ignore_ascii_case(short_name(b))
}

/// The file already imports the same name under the same local name.
pub fn has_import(tree: &SourceTree, import: &UseImport) -> bool {
    tree.uses.iter().any(|existing| {
        existing.kind == import.kind
            && existing.name.eq_ignore_ascii_case(&import.name)
            && existing.local_name().eq_ignore_ascii_case(import.local_name())
    })
}

/// An import of a different name that already claims the local name.
pub fn conflicting_import<'t>(tree: &'t SourceTree, import: &UseImport) -> Option<&'t UseImport> {
    tree.uses.iter().find(|existing| {
        existing.kind == import.kind
            && existing.local_name().eq_ignore_ascii_case(import.local_name())
            && !existing.name.eq_ignore_ascii_case(&import.name)
    })
}

pub fn implements(class: &ClassDecl, interface: &str) -> bool {
    class.implements.iter().any(|i| same_class_name(i, interface))
}

pub fn uses_trait(class: &ClassDecl, name: &str) -> bool {
    class.trait_names().any(|t| same_class_name(t, name))
}

/// Member index and entry index of a constant.
pub fn find_constant(class: &ClassDecl, name: &str) -> Option<(usize, usize)> {
    class.members.iter().enumerate().find_map(|(i, member)| match &member.kind {
        MemberKind::Constant(decl) => decl.entries.iter().position(|e| e.name == name).map(|j| (i, j)),
        _ => None,
    })
}

/// Member index and entry index of a property.
pub fn find_property(class: &ClassDecl, name: &str) -> Option<(usize, usize)> {
    class.members.iter().enumerate().find_map(|(i, member)| match &member.kind {
        MemberKind::Property(decl) => decl.entries.iter().position(|e| e.name == name).map(|j| (i, j)),
        _ => None,
    })
}

/// Member index of a method. Method names are case-insensitive.
pub fn find_method(class: &ClassDecl, name: &str) -> Option<usize> {
    class.members.iter().position(|member| match &member.kind {
        MemberKind::Method(method) => method.name.eq_ignore_ascii_case(name),
        _ => false,
    })
}

/// Index after the last member matching `pred`.
pub fn position_after(class: &ClassDecl, pred: impl Fn(&MemberKind) -> bool) -> Option<usize> {
    class.members.iter().rposition(|m| pred(&m.kind)).map(|i| i + 1)
}

/// Identity of a registration line: the innermost call of a call chain and
/// its first argument, e.g. `process` + `Command::ADD_BUILDING` for
/// `$eventEngine->process(Command::ADD_BUILDING)->withNew(...)->...`.
pub fn call_identity(expr: &Expr) -> Option<(String, String)> {
    let mut current = expr;
    let mut innermost: Option<(&str, &[Expr])> = None;
    loop {
        match current {
            Expr::MethodCall { object, method, args } => {
                innermost = Some((method.as_str(), args.as_slice()));
                current = object.as_ref();
            }
            Expr::StaticCall { method, args, .. } | Expr::Call { function: method, args } => {
                innermost = Some((method.as_str(), args.as_slice()));
                break;
            }
            _ => break,
        }
    }
    innermost.map(|(method, args)| {
        let first = args.first().map(print_expr).unwrap_or_default();
        (method.to_ascii_lowercase(), first)
    })
}

/// Whether `body` already holds a statement equivalent to `stmt`.
///
/// Registration chains match by [`call_identity`]; anything else must print
/// identically.
pub fn statement_present(body: &[Stmt], stmt: &Stmt) -> bool {
    match stmt.expression().and_then(call_identity) {
        Some(identity) => body
            .iter()
            .filter(|s| matches!(s.kind, StmtKind::Expr(_)))
            .filter_map(|s| s.expression().and_then(call_identity))
            .any(|existing| existing == identity),
        None => {
            let printed = stmt.expression().map(print_expr);
            printed.is_some() && body.iter().any(|s| s.expression().map(print_expr) == printed)
        }
    }
}
