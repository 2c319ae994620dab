//! PHP parser using tree-sitter.
//!
//! Only the constructs the merge engine edits are modeled; everything else is
//! carried through as verbatim text so that hand-written code survives a merge.

use std::path::Path;
use tree_sitter::{Node, Parser};

use super::ast::*;
use crate::diagnostic::CodegenError;

/// PHP parser.
pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    /// Creates a new PHP parser.
    pub fn new() -> Result<Self, CodegenError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|_| CodegenError::ParserInitFailed)?;
        Ok(Self { parser })
    }

    /// Parses a PHP source file. Files with syntax errors are rejected.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<SourceTree, CodegenError> {
        let source = source.replace("\r\n", "\n");
        if source.trim().is_empty() {
            return Ok(SourceTree::new());
        }

        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| CodegenError::ParseFailed { path: path.to_path_buf() })?;

        let root = tree.root_node();
        if let Some(error) = first_error(root) {
            let position = error.start_position();
            return Err(CodegenError::SyntaxError {
                file: path.to_path_buf(),
                line: position.row + 1,
                column: position.column + 1,
            });
        }
        Visitor::new(&source, path).visit_program(root)
    }
}

/// Parses a source string with a fresh parser.
pub fn parse_source(source: &str, path: &Path) -> Result<SourceTree, CodegenError> {
    PhpParser::new()?.parse(source, path)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

const LITERAL_KINDS: &[&str] = &["string", "encapsed_string", "heredoc", "nowdoc", "shell_command_expression"];

fn has_multiline_literal(node: Node) -> bool {
    if node.start_position().row == node.end_position().row {
        return false;
    }
    if LITERAL_KINDS.contains(&node.kind()) {
        return true;
    }
    children(node).into_iter().any(has_multiline_literal)
}

fn children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Walks the tree-sitter nodes and builds the editable tree.
struct Visitor<'a> {
    source: &'a str,
    path: &'a Path,
}

impl<'a> Visitor<'a> {
    fn new(source: &'a str, path: &'a Path) -> Self {
        Self { source, path }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Text of a node for verbatim printing. Re-indenting would change the
    /// value of a string literal spanning several lines, so such nodes keep
    /// their layout.
    fn verbatim(&self, node: Node) -> Verbatim {
        let text = self.node_text(node);
        if has_multiline_literal(node) {
            Verbatim::fixed(text)
        } else {
            Verbatim::from_source(text, node.start_position().column)
        }
    }

    fn visit_program(&self, node: Node) -> Result<SourceTree, CodegenError> {
        let mut tree = SourceTree::new();

        for child in children(node) {
            match child.kind() {
                "php_tag" => {}
                "comment" if tree.namespace.is_none() && tree.uses.is_empty() && tree.items.is_empty() => {
                    tree.header.push(self.verbatim(child));
                }
                "declare_statement" if self.node_text(child).contains("strict_types") => {
                    tree.strict_types = true;
                }
                "namespace_definition" => {
                    if child.child_by_field_name("body").is_some() {
                        // braced namespaces may hold several classes; not merged
                        return Err(CodegenError::ParseFailed {
                            path: self.path.to_path_buf(),
                        });
                    }
                    tree.namespace = child
                        .child_by_field_name("name")
                        .map(|n| self.node_text(n).trim_start_matches('\\').to_string());
                }
                "namespace_use_declaration" => tree.uses.extend(parse_use(self.node_text(child))),
                "class_declaration" => tree.items.push(Item::Class(self.visit_class(child))),
                "interface_declaration" | "trait_declaration" | "enum_declaration" => tree.items.push(Item::Other {
                    declares: child.child_by_field_name("name").map(|n| self.node_text(n).to_string()),
                    code: self.verbatim(child),
                }),
                _ => tree.items.push(Item::Other {
                    declares: None,
                    code: self.verbatim(child),
                }),
            }
        }
        Ok(tree)
    }

    fn visit_class(&self, node: Node) -> ClassDecl {
        let mut class = ClassDecl::new(
            node.child_by_field_name("name")
                .map(|n| self.node_text(n))
                .unwrap_or_default(),
        );

        for child in children(node) {
            match child.kind() {
                "attribute_list" => class.attributes.push(self.node_text(child).to_string()),
                "final_modifier" | "abstract_modifier" | "readonly_modifier" | "final" | "abstract" | "readonly" => {
                    class.modifiers.push(self.node_text(child).to_ascii_lowercase())
                }
                "base_clause" => {
                    class.extends = named_children(child).first().map(|n| self.node_text(*n).to_string());
                }
                "class_interface_clause" => {
                    class.implements = named_children(child)
                        .into_iter()
                        .map(|n| self.node_text(n).to_string())
                        .collect();
                }
                "declaration_list" => class.members = self.visit_members(child),
                _ => {}
            }
        }
        class
    }

    fn visit_members(&self, node: Node) -> Vec<Member> {
        let mut members: Vec<Member> = Vec::new();
        let mut last_row: Option<usize> = None;

        for child in named_children(node) {
            if child.kind() == "comment" && last_row == Some(child.start_position().row) {
                if let Some(last) = members.last_mut() {
                    last.trailing = Some(self.node_text(child).to_string());
                    continue;
                }
            }

            let kind = match child.kind() {
                "use_declaration" => MemberKind::TraitUse(
                    named_children(child)
                        .into_iter()
                        .filter(|n| matches!(n.kind(), "name" | "qualified_name"))
                        .map(|n| self.node_text(n).to_string())
                        .collect(),
                ),
                "const_declaration" => self.visit_const(child).map_or(MemberKind::Other, MemberKind::Constant),
                "property_declaration" => self.visit_property(child).map_or(MemberKind::Other, MemberKind::Property),
                "method_declaration" => self.visit_method(child).map_or(MemberKind::Other, MemberKind::Method),
                "comment" => MemberKind::Comment,
                _ => MemberKind::Other,
            };

            members.push(Member {
                kind,
                verbatim: Some(self.verbatim(child)),
                trailing: None,
            });
            last_row = Some(child.end_position().row);
        }
        members
    }

    fn visit_const(&self, node: Node) -> Option<ConstDecl> {
        let mut decl = ConstDecl {
            visibility: None,
            entries: Vec::new(),
        };
        for child in children(node) {
            match child.kind() {
                "visibility_modifier" => decl.visibility = Visibility::parse(self.node_text(child)),
                "const_element" => {
                    let parts = named_children(child);
                    let (name, value) = match parts.as_slice() {
                        [name, .., value] => (name, value),
                        _ => return None,
                    };
                    decl.entries.push(ConstEntry {
                        name: self.node_text(*name).to_string(),
                        value: self.visit_expr(*value),
                    });
                }
                _ => {}
            }
        }
        (!decl.entries.is_empty()).then_some(decl)
    }

    fn visit_property(&self, node: Node) -> Option<PropertyDecl> {
        let mut decl = PropertyDecl {
            visibility: None,
            is_static: false,
            readonly: false,
            type_hint: node.child_by_field_name("type").map(|t| self.node_text(t).to_string()),
            entries: Vec::new(),
        };
        for child in children(node) {
            match child.kind() {
                "visibility_modifier" => decl.visibility = Visibility::parse(self.node_text(child)),
                "static_modifier" => decl.is_static = true,
                "readonly_modifier" => decl.readonly = true,
                "property_element" => {
                    let mut entry = PropertyEntry {
                        name: String::new(),
                        default: None,
                    };
                    for part in named_children(child) {
                        match part.kind() {
                            "variable_name" => entry.name = self.node_text(part).trim_start_matches('$').to_string(),
                            "property_initializer" => {
                                entry.default = part.named_child(0).map(|v| self.visit_expr(v));
                            }
                            _ if !entry.name.is_empty() => entry.default = Some(self.visit_expr(part)),
                            _ => {}
                        }
                    }
                    if entry.name.is_empty() {
                        return None;
                    }
                    decl.entries.push(entry);
                }
                _ => {}
            }
        }
        (!decl.entries.is_empty()).then_some(decl)
    }

    fn visit_method(&self, node: Node) -> Option<MethodDecl> {
        let mut method = MethodDecl {
            name: self.node_text(node.child_by_field_name("name")?).to_string(),
            return_type: node
                .child_by_field_name("return_type")
                .map(|t| self.node_text(t).to_string()),
            ..MethodDecl::default()
        };

        for child in children(node) {
            match child.kind() {
                "attribute_list" => method.attributes.push(self.node_text(child).to_string()),
                "visibility_modifier" => method.visibility = Visibility::parse(self.node_text(child)),
                "static_modifier" => method.is_static = true,
                "abstract_modifier" => method.is_abstract = true,
                "final_modifier" => method.is_final = true,
                "reference_modifier" => method.by_ref = true,
                _ => {}
            }
        }

        if let Some(params) = node.child_by_field_name("parameters") {
            method.params = named_children(params)
                .into_iter()
                .filter(|p| p.kind().ends_with("_parameter"))
                .map(|p| self.visit_param(p))
                .collect();
        }
        method.body = node.child_by_field_name("body").map(|body| self.visit_block(body));
        Some(method)
    }

    fn visit_param(&self, node: Node) -> Param {
        let mut param = Param {
            variadic: node.kind() == "variadic_parameter",
            ..Param::default()
        };
        let mut promotion: Vec<&str> = Vec::new();
        let mut seen_name = false;

        for child in children(node) {
            match child.kind() {
                "attribute_list" => param.attributes.push(self.node_text(child).to_string()),
                "=" => {}
                "visibility_modifier" | "readonly_modifier" => promotion.push(self.node_text(child)),
                "reference_modifier" | "&" => param.by_ref = true,
                "..." => param.variadic = true,
                "variable_name" => {
                    param.name = self.node_text(child).trim_start_matches('$').to_string();
                    seen_name = true;
                }
                _ if child.is_named() && !seen_name => param.type_hint = Some(self.node_text(child).to_string()),
                _ if child.is_named() => param.default = Some(self.visit_expr(child)),
                _ => {}
            }
        }
        if !promotion.is_empty() {
            param.promotion = Some(promotion.join(" "));
        }
        param
    }

    fn visit_block(&self, node: Node) -> Vec<Stmt> {
        let mut stmts: Vec<Stmt> = Vec::new();
        let mut last_row = node.start_position().row;

        for child in named_children(node) {
            let row = child.start_position().row;
            if child.kind() == "comment" && row == last_row {
                if let Some(last) = stmts.last_mut() {
                    last.trailing = Some(self.node_text(child).to_string());
                    continue;
                }
            }

            let kind = match child.kind() {
                "expression_statement" => child
                    .named_child(0)
                    .map_or(StmtKind::Other, |e| StmtKind::Expr(self.visit_expr(e))),
                "return_statement" => StmtKind::Return(child.named_child(0).map(|e| self.visit_expr(e))),
                _ => StmtKind::Other,
            };
            stmts.push(Stmt {
                kind,
                verbatim: Some(self.verbatim(child)),
                trailing: None,
                blank_before: row > last_row + 1,
            });
            last_row = child.end_position().row;
        }
        stmts
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn raw(&self, node: Node) -> Expr {
        Expr::Raw(self.node_text(node).to_string())
    }

    fn boxed(&self, node: Option<Node>) -> Option<Box<Expr>> {
        node.map(|n| Box::new(self.visit_expr(n)))
    }

    fn visit_expr(&self, node: Node) -> Expr {
        let text = self.node_text(node);
        match node.kind() {
            "variable_name" => Expr::Variable(text.trim_start_matches('$').to_string()),
            "name" | "qualified_name" | "relative_scope" => Expr::Name(text.to_string()),
            "class_constant_access_expression" => match named_children(node).as_slice() {
                [class, name] => Expr::ClassConst {
                    class: self.node_text(*class).to_string(),
                    name: self.node_text(*name).to_string(),
                },
                _ => self.raw(node),
            },
            "string" if text.starts_with('\'') => match unquote(text) {
                Some(value) => Expr::String(value),
                None => self.raw(node),
            },
            "integer" => text.parse().map(Expr::Int).unwrap_or_else(|_| self.raw(node)),
            "float" => Expr::Float(text.to_string()),
            "boolean" => Expr::Bool(text.eq_ignore_ascii_case("true")),
            "null" => Expr::Null,
            "array_creation_expression" => self.visit_array(node).unwrap_or_else(|| self.raw(node)),
            "function_call_expression" => {
                match (node.child_by_field_name("function"), self.visit_args(node)) {
                    (Some(function), Some(args)) => Expr::Call {
                        function: self.node_text(function).to_string(),
                        args,
                    },
                    _ => self.raw(node),
                }
            }
            "member_call_expression" => match (
                node.child_by_field_name("object"),
                node.child_by_field_name("name"),
                self.visit_args(node),
            ) {
                (Some(object), Some(name), Some(args)) => Expr::MethodCall {
                    object: Box::new(self.visit_expr(object)),
                    method: self.node_text(name).to_string(),
                    args,
                },
                _ => self.raw(node),
            },
            "scoped_call_expression" => match (
                node.child_by_field_name("scope"),
                node.child_by_field_name("name"),
                self.visit_args(node),
            ) {
                (Some(scope), Some(name), Some(args)) => Expr::StaticCall {
                    class: self.node_text(scope).to_string(),
                    method: self.node_text(name).to_string(),
                    args,
                },
                _ => self.raw(node),
            },
            "member_access_expression" => match (node.child_by_field_name("object"), node.child_by_field_name("name")) {
                (Some(object), Some(name)) => Expr::PropertyFetch {
                    object: Box::new(self.visit_expr(object)),
                    property: self.node_text(name).to_string(),
                },
                _ => self.raw(node),
            },
            "object_creation_expression" => {
                let class = named_children(node)
                    .into_iter()
                    .find(|n| matches!(n.kind(), "name" | "qualified_name"));
                match (class, self.visit_args(node)) {
                    (Some(class), Some(args)) => Expr::New {
                        class: self.node_text(class).to_string(),
                        args,
                    },
                    _ => self.raw(node),
                }
            }
            "clone_expression" => match node.named_child(0) {
                Some(inner) => Expr::Clone(Box::new(self.visit_expr(inner))),
                None => self.raw(node),
            },
            "yield_expression" => match node.named_child(0) {
                Some(inner) if inner.kind() == "array_element_initializer" => self.raw(node),
                inner => Expr::Yield(self.boxed(inner)),
            },
            "assignment_expression" => match (self.boxed(node.child_by_field_name("left")), self.boxed(node.child_by_field_name("right"))) {
                (Some(target), Some(value)) => Expr::Assign { target, value },
                _ => self.raw(node),
            },
            "binary_expression" => match (
                self.boxed(node.child_by_field_name("left")),
                node.child_by_field_name("operator"),
                self.boxed(node.child_by_field_name("right")),
            ) {
                (Some(left), Some(op), Some(right)) => Expr::Binary {
                    left,
                    op: self.node_text(op).to_string(),
                    right,
                },
                _ => self.raw(node),
            },
            _ => self.raw(node),
        }
    }

    /// Positional arguments of a call. A call without an argument list (e.g.
    /// `new Foo`) has none; named or spread arguments are kept as raw text.
    fn visit_args(&self, node: Node) -> Option<Vec<Expr>> {
        let Some(arguments) = named_children(node).into_iter().find(|n| n.kind() == "arguments") else {
            return (node.kind() == "object_creation_expression").then(Vec::new);
        };
        let args = named_children(arguments)
            .into_iter()
            .filter(|a| a.kind() == "argument")
            .map(|argument| {
                let plain = argument.child_by_field_name("name").is_none()
                    && !children(argument).iter().any(|c| c.kind() == "...");
                match argument.named_child(0) {
                    Some(value) if plain => self.visit_expr(value),
                    _ => self.raw(argument),
                }
            })
            .collect();
        Some(args)
    }

    fn visit_array(&self, node: Node) -> Option<Expr> {
        let mut items = Vec::new();
        for element in named_children(node) {
            if element.kind() == "comment" {
                return None;
            }
            if element.kind() != "array_element_initializer" {
                continue;
            }
            let tokens = children(element);
            if tokens.iter().any(|t| matches!(t.kind(), "..." | "&" | "by_ref")) {
                return None;
            }
            let keyed = tokens.iter().any(|t| t.kind() == "=>");
            let parts = named_children(element);
            let item = match (keyed, parts.as_slice()) {
                (true, [key, value]) => ArrayItem {
                    key: Some(self.visit_expr(*key)),
                    value: self.visit_expr(*value),
                },
                (false, [value]) => ArrayItem {
                    key: None,
                    value: self.visit_expr(*value),
                },
                _ => return None,
            };
            items.push(item);
        }
        Some(Expr::Array(items))
    }
}

/// Reads a single-quoted PHP string literal.
fn unquote(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') | Some('\'') => {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    Some(out)
}

/// Splits a `use ...;` declaration into imports. Group uses are expanded.
fn parse_use(text: &str) -> Vec<UseImport> {
    let trimmed = text.trim().trim_end_matches(';');
    let body = trimmed.strip_prefix("use").unwrap_or(trimmed).trim();
    let (kind, body) = if let Some(rest) = body.strip_prefix("function ") {
        (UseKind::Function, rest.trim())
    } else if let Some(rest) = body.strip_prefix("const ") {
        (UseKind::Const, rest.trim())
    } else {
        (UseKind::Class, body)
    };

    let (prefix, clauses) = match (body.find('{'), body.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{}\\", body[..open].trim().trim_matches('\\')),
            &body[open + 1..close],
        ),
        _ => (String::new(), body),
    };

    clauses
        .split(',')
        .filter_map(|clause| {
            let words: Vec<&str> = clause.split_whitespace().collect();
            let (name, alias) = match words.as_slice() {
                [name] => (*name, None),
                [name, as_kw, alias] if as_kw.eq_ignore_ascii_case("as") => (*name, Some(alias.to_string())),
                _ => return None,
            };
            Some(UseImport {
                name: format!("{}{}", prefix, name.trim_start_matches('\\')),
                alias,
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::php::printer::print;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SourceTree {
        parse_source(source, Path::new("Test.php")).unwrap()
    }

    const BUILDING: &str = r#"<?php

declare(strict_types=1);

namespace App\Domain\Model\Building;

use EventEngine\Messaging\Message;
use App\Domain\Model\Building\BuildingState as State;
use Generator;

final class Building
{
    public const NAME = 'building';

    public static function addBuilding(Message $addBuilding): Generator
    {
        // custom
        yield [Event::BUILDING_ADDED, $addBuilding->payload()];
    }
}
"#;

    #[test]
    fn parses_file_structure() {
        let tree = parse(BUILDING);
        assert!(tree.strict_types);
        assert_eq!(tree.namespace.as_deref(), Some("App\\Domain\\Model\\Building"));
        assert_eq!(tree.uses.len(), 3);
        assert_eq!(tree.uses[1].alias.as_deref(), Some("State"));

        let class = tree.class("Building").unwrap();
        assert_eq!(class.modifiers, vec!["final"]);
        assert_eq!(class.constant_names().collect::<Vec<_>>(), vec!["NAME"]);

        let method = class.method("addBuilding").unwrap();
        assert!(method.is_static);
        assert_eq!(method.visibility, Some(Visibility::Public));
        assert_eq!(method.return_type.as_deref(), Some("Generator"));
        assert_eq!(method.params[0].type_hint.as_deref(), Some("Message"));
        assert_eq!(method.params[0].name, "addBuilding");
        assert_eq!(method.body.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn round_trip_is_stable() {
        let printed = print(&parse(BUILDING));
        assert_eq!(printed, BUILDING);
        assert_eq!(print(&parse(&printed)), printed);
    }

    #[test]
    fn parses_call_chains() {
        let tree = parse(
            "<?php\nclass A\n{\n    public function describe($e): void\n    {\n        $e->process(Command::ADD)\n            ->withNew(Aggregate::A)\n            ->identifiedBy('aId');\n    }\n}\n",
        );
        let method = tree.class("A").and_then(|c| c.method("describe")).unwrap();
        let body = method.body.as_ref().unwrap();
        match body[0].expression() {
            Some(Expr::MethodCall { method, args, .. }) => {
                assert_eq!(method, "identifiedBy");
                assert_eq!(args, &vec![Expr::String("aId".into())]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_keyed_array_returns() {
        let tree = parse(
            "<?php\nclass A\n{\n    public static function classMap(): array\n    {\n        return [\n            self::ADD => Add::class,\n        ];\n    }\n}\n",
        );
        let method = tree.class("A").and_then(|c| c.method("classMap")).unwrap();
        match &method.body.as_ref().unwrap()[0].kind {
            StmtKind::Return(Some(Expr::Array(items))) => {
                assert_eq!(items.len(), 1);
                assert_eq!(
                    items[0].key,
                    Some(Expr::ClassConst {
                        class: "self".into(),
                        name: "ADD".into()
                    })
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn syntax_errors_are_reported_with_position() {
        let err = parse_source("<?php\nclass A {\n    public function (\n}\n", Path::new("Broken.php")).unwrap_err();
        assert!(matches!(err, CodegenError::SyntaxError { line, .. } if line >= 2));
    }

    #[test]
    fn keeps_unknown_items_verbatim() {
        let source = "<?php\n\nnamespace App;\n\ninterface Marker\n{\n}\n";
        let tree = parse(source);
        assert_eq!(tree.declared_name(), Some("Marker"));
        assert_eq!(print(&tree), source);
    }

    #[test]
    fn multiline_strings_survive_an_unrelated_edit() {
        let source = "<?php\n\nnamespace App;\n\nfinal class Mail\n{\n    public function body(): string\n    {\n        $intro = 'x';\n        return 'line one   \n            line two';\n    }\n\n    public function banner(): string\n    {\n        return <<<TXT\n          indented   \nTXT;\n    }\n}\n";
        let mut tree = parse(source);
        let class = tree.class_mut("Mail").unwrap();
        class.members.insert(0, ConstDecl::public("NAME", Expr::string("mail")).into());
        let method = class
            .members
            .iter_mut()
            .find(|m| matches!(&m.kind, MemberKind::Method(m) if m.name == "body"))
            .unwrap();
        if let MemberKind::Method(body) = &mut method.kind {
            body.body.as_mut().unwrap().push(Stmt::expr(Expr::var("extra")));
        }
        method.touch();

        let printed = print(&tree);
        assert!(printed.contains("    public const NAME = 'mail';\n"));
        assert!(printed.contains("        return 'line one   \n            line two';\n        $extra;\n"));
        assert!(printed.contains("        return <<<TXT\n          indented   \nTXT;\n"));
        assert_eq!(print(&parse(&printed)), printed);
    }

    #[test]
    fn parameter_attributes_are_kept() {
        let mut tree = parse(
            "<?php\n\nnamespace App;\n\nfinal class Api\n{\n    public static function describe(#[Inject] EventEngine $eventEngine): void\n    {\n    }\n}\n",
        );
        let class = tree.class_mut("Api").unwrap();
        class.members[0].touch();
        let method = class.method("describe").unwrap();
        assert_eq!(method.params[0].attributes, vec!["#[Inject]"]);
        assert!(print(&tree).contains("public static function describe(#[Inject] EventEngine $eventEngine): void"));
    }

    #[test]
    fn splits_use_declarations() {
        let imports = parse_use("use App\\{Foo, Bar as Baz};");
        assert_eq!(imports[0].name, "App\\Foo");
        assert_eq!(imports[1].local_name(), "Baz");

        let functions = parse_use("use function App\\helper;");
        assert_eq!(functions[0].kind, UseKind::Function);
    }

    #[test]
    fn unquotes_single_quoted_strings() {
        assert_eq!(unquote(r"'it\'s'"), Some("it's".to_string()));
        assert_eq!(unquote(r"'App\Foo'"), Some("App\\Foo".to_string()));
        assert_eq!(unquote(r"'a\\b'"), Some("a\\b".to_string()));
    }
}
