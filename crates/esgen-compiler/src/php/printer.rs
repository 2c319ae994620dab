//! Source tree → PHP text.
//!
//! Layout follows PSR-12: one blank line between file sections and between
//! class members, except inside runs of constants, properties or trait uses and
//! after a comment. Unedited nodes read from disk are printed from their
//! verbatim text, re-indented to their new depth.

use super::ast::*;

pub const INDENT: &str = "    ";

/// Prints a whole file.
pub fn print(tree: &SourceTree) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !tree.header.is_empty() {
        let mut header = String::new();
        for (i, comment) in tree.header.iter().enumerate() {
            if i > 0 {
                header.push('\n');
            }
            write_verbatim(&mut header, comment, 0);
        }
        sections.push(header);
    }
    if tree.strict_types {
        sections.push("declare(strict_types=1);".to_string());
    }
    if let Some(namespace) = &tree.namespace {
        sections.push(format!("namespace {};", namespace));
    }
    if !tree.uses.is_empty() {
        let lines: Vec<String> = tree.uses.iter().map(print_use).collect();
        sections.push(lines.join("\n"));
    }

    let mut out = String::from("<?php\n");
    if !sections.is_empty() {
        out.push('\n');
        out.push_str(&sections.join("\n\n"));
        out.push('\n');
    }

    let mut previous_is_comment = false;
    for item in &tree.items {
        if !previous_is_comment {
            out.push('\n');
        }
        match item {
            Item::Class(class) => {
                print_class(&mut out, class);
                previous_is_comment = false;
            }
            Item::Other { code, .. } => {
                write_verbatim(&mut out, code, 0);
                previous_is_comment = is_comment(&code.text);
            }
        }
        out.push('\n');
    }
    out
}

fn is_comment(text: &str) -> bool {
    text.starts_with("//") || text.starts_with("/*") || (text.starts_with('#') && !text.starts_with("#["))
}

fn print_use(import: &UseImport) -> String {
    let kind = match import.kind {
        UseKind::Class => "",
        UseKind::Function => "function ",
        UseKind::Const => "const ",
    };
    match &import.alias {
        Some(alias) => format!("use {}{} as {};", kind, import.name, alias),
        None => format!("use {}{};", kind, import.name),
    }
}

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

fn write_verbatim(out: &mut String, verbatim: &Verbatim, level: usize) {
    let pad = indent(level);
    for (i, line) in verbatim.text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if i == 0 || (!verbatim.fixed && !line.is_empty()) {
            out.push_str(&pad);
        }
        out.push_str(line);
    }
}

// =============================================================================
// Classes and members
// =============================================================================

fn print_class(out: &mut String, class: &ClassDecl) {
    for attribute in &class.attributes {
        out.push_str(attribute);
        out.push('\n');
    }
    for modifier in &class.modifiers {
        out.push_str(modifier);
        out.push(' ');
    }
    out.push_str("class ");
    out.push_str(&class.name);
    if let Some(parent) = &class.extends {
        out.push_str(" extends ");
        out.push_str(parent);
    }
    if !class.implements.is_empty() {
        out.push_str(" implements ");
        out.push_str(&class.implements.join(", "));
    }
    out.push_str("\n{\n");

    let mut previous: Option<&MemberKind> = None;
    for member in &class.members {
        if let Some(prev) = previous {
            if needs_blank_line(prev, &member.kind) {
                out.push('\n');
            }
        }
        print_member(out, member, 1);
        out.push('\n');
        previous = Some(&member.kind);
    }
    out.push('}');
}

fn needs_blank_line(previous: &MemberKind, current: &MemberKind) -> bool {
    !matches!(
        (previous, current),
        (MemberKind::Comment, _)
            | (MemberKind::Constant(_), MemberKind::Constant(_))
            | (MemberKind::Property(_), MemberKind::Property(_))
            | (MemberKind::TraitUse(_), MemberKind::TraitUse(_))
    )
}

fn print_member(out: &mut String, member: &Member, level: usize) {
    match (&member.verbatim, &member.kind) {
        (Some(verbatim), _) => write_verbatim(out, verbatim, level),
        (None, MemberKind::TraitUse(names)) => {
            out.push_str(&indent(level));
            out.push_str(&format!("use {};", names.join(", ")));
        }
        (None, MemberKind::Constant(decl)) => {
            out.push_str(&indent(level));
            print_const(out, decl, level);
        }
        (None, MemberKind::Property(decl)) => {
            out.push_str(&indent(level));
            print_property(out, decl, level);
        }
        (None, MemberKind::Method(method)) => print_method(out, method, level),
        // comments and unknown members only exist with their source text
        (None, MemberKind::Comment | MemberKind::Other) => {}
    }
    if let Some(trailing) = &member.trailing {
        out.push(' ');
        out.push_str(trailing);
    }
}

fn print_const(out: &mut String, decl: &ConstDecl, level: usize) {
    if let Some(visibility) = decl.visibility {
        out.push_str(visibility.as_str());
        out.push(' ');
    }
    out.push_str("const ");
    let entries: Vec<String> = decl
        .entries
        .iter()
        .map(|e| format!("{} = {}", e.name, expr(&e.value, level)))
        .collect();
    out.push_str(&entries.join(", "));
    out.push(';');
}

fn print_property(out: &mut String, decl: &PropertyDecl, level: usize) {
    let mut words: Vec<&str> = Vec::new();
    match decl.visibility {
        Some(visibility) => words.push(visibility.as_str()),
        None if !decl.is_static && !decl.readonly => words.push("var"),
        None => {}
    }
    if decl.is_static {
        words.push("static");
    }
    if decl.readonly {
        words.push("readonly");
    }
    if let Some(type_hint) = &decl.type_hint {
        words.push(type_hint);
    }
    out.push_str(&words.join(" "));
    out.push(' ');

    let entries: Vec<String> = decl
        .entries
        .iter()
        .map(|e| match &e.default {
            Some(default) => format!("${} = {}", e.name, expr(default, level)),
            None => format!("${}", e.name),
        })
        .collect();
    out.push_str(&entries.join(", "));
    out.push(';');
}

fn print_method(out: &mut String, method: &MethodDecl, level: usize) {
    let pad = indent(level);
    for attribute in &method.attributes {
        out.push_str(&pad);
        out.push_str(attribute);
        out.push('\n');
    }
    out.push_str(&pad);
    if method.is_final {
        out.push_str("final ");
    }
    if method.is_abstract {
        out.push_str("abstract ");
    }
    if let Some(visibility) = method.visibility {
        out.push_str(visibility.as_str());
        out.push(' ');
    }
    if method.is_static {
        out.push_str("static ");
    }
    out.push_str("function ");
    if method.by_ref {
        out.push('&');
    }
    out.push_str(&method.name);
    out.push('(');
    let params: Vec<String> = method.params.iter().map(|p| param(p, level)).collect();
    out.push_str(&params.join(", "));
    out.push(')');
    if let Some(return_type) = &method.return_type {
        out.push_str(": ");
        out.push_str(return_type);
    }

    let Some(body) = &method.body else {
        out.push(';');
        return;
    };
    out.push('\n');
    out.push_str(&pad);
    out.push_str("{\n");
    for stmt in body {
        if stmt.blank_before {
            out.push('\n');
        }
        print_stmt(out, stmt, level + 1);
        out.push('\n');
    }
    out.push_str(&pad);
    out.push('}');
}

fn param(p: &Param, level: usize) -> String {
    let mut s = String::new();
    for attribute in &p.attributes {
        s.push_str(attribute);
        s.push(' ');
    }
    if let Some(promotion) = &p.promotion {
        s.push_str(promotion);
        s.push(' ');
    }
    if let Some(type_hint) = &p.type_hint {
        s.push_str(type_hint);
        s.push(' ');
    }
    if p.by_ref {
        s.push('&');
    }
    if p.variadic {
        s.push_str("...");
    }
    s.push('$');
    s.push_str(&p.name);
    if let Some(default) = &p.default {
        s.push_str(" = ");
        s.push_str(&expr(default, level));
    }
    s
}

/// Prints one statement at the given depth, without a trailing newline.
pub fn print_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match (&stmt.verbatim, &stmt.kind) {
        (Some(verbatim), _) => write_verbatim(out, verbatim, level),
        (None, StmtKind::Expr(e)) => {
            out.push_str(&indent(level));
            out.push_str(&expr(e, level));
            out.push(';');
        }
        (None, StmtKind::Return(Some(e))) => {
            out.push_str(&indent(level));
            out.push_str("return ");
            out.push_str(&expr(e, level));
            out.push(';');
        }
        (None, StmtKind::Return(None)) => {
            out.push_str(&indent(level));
            out.push_str("return;");
        }
        (None, StmtKind::Other) => {}
    }
    if let Some(trailing) = &stmt.trailing {
        out.push(' ');
        out.push_str(trailing);
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// Prints an expression as it would appear at the start of an unindented line.
pub fn print_expr(e: &Expr) -> String {
    expr(e, 0)
}

/// Single-quoted PHP string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn args(args: &[Expr], level: usize) -> String {
    let printed: Vec<String> = args.iter().map(|a| expr(a, level)).collect();
    format!("({})", printed.join(", "))
}

fn expr(e: &Expr, level: usize) -> String {
    match e {
        Expr::Variable(name) => format!("${}", name),
        Expr::Name(name) => name.clone(),
        Expr::ClassConst { class, name } => format!("{}::{}", class, name),
        Expr::String(s) => quote(s),
        Expr::Int(i) => i.to_string(),
        Expr::Float(f) => f.clone(),
        Expr::Bool(b) => (if *b { "true" } else { "false" }).to_string(),
        Expr::Null => "null".to_string(),
        Expr::Array(items) => array(items, level),
        Expr::Call { function, args: a } => format!("{}{}", function, args(a, level)),
        Expr::MethodCall { .. } => method_chain(e, level),
        Expr::StaticCall { class, method, args: a } => format!("{}::{}{}", class, method, args(a, level)),
        Expr::PropertyFetch { object, property } => format!("{}->{}", expr(object, level), property),
        Expr::New { class, args: a } => format!("new {}{}", class, args(a, level)),
        Expr::Clone(inner) => format!("clone {}", expr(inner, level)),
        Expr::Yield(Some(inner)) => format!("yield {}", expr(inner, level)),
        Expr::Yield(None) => "yield".to_string(),
        Expr::Assign { target, value } => format!("{} = {}", expr(target, level), expr(value, level)),
        Expr::Binary { left, op, right } => format!("{} {} {}", expr(left, level), op, expr(right, level)),
        Expr::Raw(text) => text.clone(),
    }
}

fn array(items: &[ArrayItem], level: usize) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    if items.iter().all(|item| item.key.is_none()) {
        let values: Vec<String> = items.iter().map(|item| expr(&item.value, level)).collect();
        return format!("[{}]", values.join(", "));
    }

    let pad = indent(level + 1);
    let mut s = String::from("[\n");
    for item in items {
        s.push_str(&pad);
        if let Some(key) = &item.key {
            s.push_str(&expr(key, level + 1));
            s.push_str(" => ");
        }
        s.push_str(&expr(&item.value, level + 1));
        s.push_str(",\n");
    }
    s.push_str(&indent(level));
    s.push(']');
    s
}

/// Method calls; chains of three or more calls are broken one call per line.
fn method_chain(e: &Expr, level: usize) -> String {
    let mut links: Vec<(&str, &[Expr])> = Vec::new();
    let mut current = e;
    while let Expr::MethodCall { object, method, args } = current {
        links.push((method.as_str(), args.as_slice()));
        current = object.as_ref();
    }
    links.reverse();
    let root = expr(current, level);

    if links.len() < 3 {
        let mut s = root;
        for (method, a) in links {
            s.push_str(&format!("->{}{}", method, args(a, level)));
        }
        return s;
    }

    let mut s = root;
    let (first_method, first_args) = links[0];
    s.push_str(&format!("->{}{}", first_method, args(first_args, level)));
    let pad = indent(level + 1);
    for (method, a) in &links[1..] {
        s.push_str(&format!("\n{}->{}{}", pad, method, args(a, level + 1)));
    }
    s
}
