//! The merge pipeline.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::change::{ChangeSet, CodeChange, Pass};
use super::predicates;
use crate::diagnostic::CodegenError;
use crate::php::{
    print_expr, ArrayItem, ClassDecl, ConstDecl, Expr, Item, Member, MemberKind, MethodDecl, PropertyDecl,
    SourceTree, Stmt, StmtKind, UseImport, UseKind,
};

/// What happens to constants, properties and methods that already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Existing declarations win; hand edits are never overwritten.
    #[default]
    PreserveExisting,
    /// Generated declarations replace existing ones with the same name.
    ReplaceExisting,
}

/// Result of merging change sets into a tree.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub tree: SourceTree,
    /// Per-change problems. The rest of the change set was still applied,
    /// unless `applied` is false.
    pub issues: Vec<CodegenError>,
    /// False when a change set was rejected as a whole (wrong class or
    /// namespace in the file); the tree is then returned unchanged.
    pub applied: bool,
    /// Whether any declaration was added or replaced.
    pub modified: bool,
}

/// Applies change sets to source trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    policy: MergePolicy,
    strict_types: bool,
}

impl MergeEngine {
    pub fn new(policy: MergePolicy, strict_types: bool) -> Self {
        Self { policy, strict_types }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merges several change sets into one file, in order.
    pub fn merge_all(&self, tree: SourceTree, sets: &[ChangeSet]) -> MergeOutcome {
        let mut outcome = MergeOutcome {
            tree,
            issues: Vec::new(),
            applied: true,
            modified: false,
        };
        for set in sets {
            let next = self.merge(outcome.tree, set);
            outcome.tree = next.tree;
            outcome.issues.extend(next.issues);
            outcome.applied &= next.applied;
            outcome.modified |= next.modified;
        }
        outcome
    }

    /// Runs the fixed pass pipeline for one change set.
    pub fn merge(&self, tree: SourceTree, set: &ChangeSet) -> MergeOutcome {
        let original = tree.clone();
        let mut state = MergeState {
            tree,
            issues: Vec::new(),
            modified: false,
            policy: self.policy,
        };

        for pass in Pass::ORDER {
            match pass {
                Pass::StrictTypes => {
                    if self.strict_types && !state.tree.strict_types {
                        state.tree.strict_types = true;
                        state.modified = true;
                    }
                }
                Pass::Namespace => {
                    if let Err(error) = state.ensure_namespace(&set.namespace) {
                        return state.reject(original, error);
                    }
                }
                Pass::Class => {
                    if let Err(error) = state.ensure_class(set) {
                        return state.reject(original, error);
                    }
                }
                _ => {
                    for change in set.changes.iter().filter(|c| c.pass() == pass) {
                        if let Err(error) = state.apply(set, change) {
                            warn!(class = %set.class.name, error = %error, "Skipping change");
                            state.issues.push(error);
                        }
                    }
                }
            }
        }

        MergeOutcome {
            tree: state.tree,
            issues: state.issues,
            applied: true,
            modified: state.modified,
        }
    }
}

struct MergeState {
    tree: SourceTree,
    issues: Vec<CodegenError>,
    modified: bool,
    policy: MergePolicy,
}

impl MergeState {
    fn reject(mut self, original: SourceTree, error: CodegenError) -> MergeOutcome {
        warn!(error = %error, "Change set rejected, file left untouched");
        self.issues.push(error);
        MergeOutcome {
            tree: original,
            issues: self.issues,
            applied: false,
            modified: false,
        }
    }

    fn ensure_namespace(&mut self, expected: &str) -> Result<(), CodegenError> {
        let expected = expected.trim_matches('\\');
        match &self.tree.namespace {
            Some(found) if found.eq_ignore_ascii_case(expected) => Ok(()),
            Some(found) => Err(CodegenError::NamespaceMismatch {
                expected: expected.to_string(),
                found: found.clone(),
            }),
            None if expected.is_empty() => Ok(()),
            None if self.tree.items.is_empty() => {
                self.tree.namespace = Some(expected.to_string());
                self.modified = true;
                Ok(())
            }
            None => Err(CodegenError::NamespaceMismatch {
                expected: expected.to_string(),
                found: String::new(),
            }),
        }
    }

    fn ensure_class(&mut self, set: &ChangeSet) -> Result<(), CodegenError> {
        if self.tree.class(&set.class.name).is_some() {
            return Ok(());
        }
        if let Some(found) = self.tree.declared_name() {
            return Err(CodegenError::ClassNameMismatch {
                expected: set.class.name.clone(),
                found: found.to_string(),
            });
        }
        debug!(class = %set.class.name, "Creating class");
        self.tree.items.push(Item::Class(ClassDecl {
            modifiers: set.class.modifiers.clone(),
            extends: set.class.extends.clone(),
            ..ClassDecl::new(set.class.name.clone())
        }));
        self.modified = true;
        Ok(())
    }

    fn class_mut<'s>(tree: &'s mut SourceTree, set: &ChangeSet) -> Result<&'s mut ClassDecl, CodegenError> {
        tree.class_mut(&set.class.name).ok_or_else(|| CodegenError::ClassNameMismatch {
            expected: set.class.name.clone(),
            found: String::new(),
        })
    }

    fn apply(&mut self, set: &ChangeSet, change: &CodeChange) -> Result<(), CodegenError> {
        let changed = match change {
            CodeChange::Import(import) => self.ensure_import(import, set)?,
            CodeChange::Implements(interface) => {
                let class = Self::class_mut(&mut self.tree, set)?;
                ensure_implements(class, interface)
            }
            CodeChange::UseTrait(name) => ensure_trait(Self::class_mut(&mut self.tree, set)?, name),
            CodeChange::Constant(decl) => ensure_constant(Self::class_mut(&mut self.tree, set)?, decl, self.policy),
            CodeChange::Property(decl) => ensure_property(Self::class_mut(&mut self.tree, set)?, decl, self.policy),
            CodeChange::Method(method) => ensure_method(Self::class_mut(&mut self.tree, set)?, method, self.policy),
            CodeChange::MethodGroup(methods) => ensure_method_group(Self::class_mut(&mut self.tree, set)?, methods),
            CodeChange::InjectStatements { method, statements } => {
                inject_statements(Self::class_mut(&mut self.tree, set)?, method, statements)?
            }
            CodeChange::InjectClassMapEntry { method, key, value } => {
                inject_class_map_entry(Self::class_mut(&mut self.tree, set)?, method, key, value)?
            }
        };
        self.modified |= changed;
        Ok(())
    }

    /// Adds an import unless present. A different class already imported
    /// under the same local name would change what generated code refers to,
    /// so it is an error rather than a silent skip.
    fn ensure_import(&mut self, import: &UseImport, set: &ChangeSet) -> Result<bool, CodegenError> {
        let same_namespace = import.kind == UseKind::Class
            && import.alias.is_none()
            && import.namespace().eq_ignore_ascii_case(set.namespace.trim_matches('\\'));
        if same_namespace || predicates::has_import(&self.tree, import) {
            return Ok(false);
        }
        if let Some(existing) = predicates::conflicting_import(&self.tree, import) {
            return Err(CodegenError::ImportConflict {
                class: set.class.name.clone(),
                import: import.name.clone(),
                existing: existing.name.clone(),
            });
        }
        debug!(import = %import.name, "Adding import");
        self.tree.uses.push(import.clone());
        Ok(true)
    }
}

fn ensure_implements(class: &mut ClassDecl, interface: &str) -> bool {
    if predicates::implements(class, interface) {
        return false;
    }
    class.implements.push(interface.to_string());
    true
}

fn ensure_trait(class: &mut ClassDecl, name: &str) -> bool {
    if predicates::uses_trait(class, name) {
        return false;
    }
    let at = predicates::position_after(class, |k| matches!(k, MemberKind::TraitUse(_))).unwrap_or(0);
    class
        .members
        .insert(at, Member::new(MemberKind::TraitUse(vec![name.to_string()])));
    true
}

fn ensure_constant(class: &mut ClassDecl, decl: &ConstDecl, policy: MergePolicy) -> bool {
    let mut changed = false;
    for entry in &decl.entries {
        match predicates::find_constant(class, &entry.name) {
            Some((i, j)) => {
                if policy == MergePolicy::ReplaceExisting {
                    let member = &mut class.members[i];
                    if let MemberKind::Constant(existing) = &mut member.kind {
                        if existing.entries[j].value != entry.value {
                            existing.entries[j].value = entry.value.clone();
                            member.touch();
                            changed = true;
                        }
                    }
                }
            }
            None => {
                let at = predicates::position_after(class, |k| matches!(k, MemberKind::Constant(_)))
                    .or_else(|| predicates::position_after(class, |k| matches!(k, MemberKind::TraitUse(_))))
                    .unwrap_or(0);
                let single = ConstDecl {
                    visibility: decl.visibility,
                    entries: vec![entry.clone()],
                };
                class.members.insert(at, single.into());
                changed = true;
            }
        }
    }
    changed
}

fn ensure_property(class: &mut ClassDecl, decl: &PropertyDecl, policy: MergePolicy) -> bool {
    let mut changed = false;
    for entry in &decl.entries {
        match predicates::find_property(class, &entry.name) {
            Some((i, j)) => {
                if policy == MergePolicy::ReplaceExisting {
                    let member = &mut class.members[i];
                    if let MemberKind::Property(existing) = &mut member.kind {
                        if existing.entries.len() == 1 {
                            let replacement = PropertyDecl {
                                entries: vec![entry.clone()],
                                ..decl.clone()
                            };
                            if *existing != replacement {
                                *existing = replacement;
                                member.touch();
                                changed = true;
                            }
                        } else if existing.entries[j] != *entry {
                            existing.entries[j] = entry.clone();
                            member.touch();
                            changed = true;
                        }
                    }
                }
            }
            None => {
                let at = predicates::position_after(class, |k| matches!(k, MemberKind::Property(_)))
                    .or_else(|| predicates::position_after(class, |k| matches!(k, MemberKind::Constant(_))))
                    .or_else(|| predicates::position_after(class, |k| matches!(k, MemberKind::TraitUse(_))))
                    .unwrap_or(0);
                let single = PropertyDecl {
                    entries: vec![entry.clone()],
                    ..decl.clone()
                };
                class.members.insert(at, single.into());
                changed = true;
            }
        }
    }
    changed
}

fn ensure_method(class: &mut ClassDecl, method: &MethodDecl, policy: MergePolicy) -> bool {
    match predicates::find_method(class, &method.name) {
        Some(i) => {
            if policy == MergePolicy::PreserveExisting {
                debug!(class = %class.name, method = %method.name, "Method exists, keeping it");
                return false;
            }
            let member = &mut class.members[i];
            if member.kind == MemberKind::Method(method.clone()) {
                return false;
            }
            member.kind = MemberKind::Method(method.clone());
            member.touch();
            true
        }
        None => {
            class.members.push(method.clone().into());
            true
        }
    }
}

fn ensure_method_group(class: &mut ClassDecl, methods: &[MethodDecl]) -> bool {
    if let Some(existing) = methods.iter().find(|m| predicates::find_method(class, &m.name).is_some()) {
        debug!(class = %class.name, method = %existing.name, "Method group already present");
        return false;
    }
    for method in methods {
        class.members.push(method.clone().into());
    }
    !methods.is_empty()
}

/// Mutable body of a named method.
fn method_body<'c>(
    class: &'c mut ClassDecl,
    name: &str,
) -> Result<(&'c mut Member, bool), CodegenError> {
    let class_name = class.name.clone();
    let index = predicates::find_method(class, name).ok_or_else(|| CodegenError::TargetMethodNotFound {
        class: class_name.clone(),
        method: name.to_string(),
    })?;
    let member = &mut class.members[index];
    let has_body = matches!(&member.kind, MemberKind::Method(m) if m.body.is_some());
    Ok((member, has_body))
}

fn inject_statements(class: &mut ClassDecl, method: &str, statements: &[Stmt]) -> Result<bool, CodegenError> {
    let class_name = class.name.clone();
    let (member, has_body) = method_body(class, method)?;
    let body = match &mut member.kind {
        MemberKind::Method(MethodDecl { body: Some(body), .. }) if has_body => body,
        _ => {
            return Err(CodegenError::TargetMethodNotFound {
                class: class_name,
                method: method.to_string(),
            })
        }
    };

    let mut changed = false;
    for stmt in statements {
        if predicates::statement_present(body, stmt) {
            continue;
        }
        debug!(class = %class_name, method, "Injecting statement");
        body.push(stmt.clone());
        changed = true;
    }
    if changed {
        member.touch();
    }
    Ok(changed)
}

fn inject_class_map_entry(class: &mut ClassDecl, method: &str, key: &Expr, value: &Expr) -> Result<bool, CodegenError> {
    let class_name = class.name.clone();
    let not_found = || CodegenError::ClassMapNotFound {
        class: class_name.clone(),
        method: method.to_string(),
    };
    let (member, _) = method_body(class, method)?;
    let MemberKind::Method(MethodDecl { body: Some(body), .. }) = &mut member.kind else {
        return Err(not_found());
    };

    let last_return = body.iter().rposition(|s| matches!(s.kind, StmtKind::Return(_)));
    let changed = match last_return {
        None => {
            body.push(Stmt::ret(Expr::map(vec![(key.clone(), value.clone())])));
            true
        }
        Some(i) => {
            let stmt = &mut body[i];
            let StmtKind::Return(Some(Expr::Array(items))) = &mut stmt.kind else {
                return Err(not_found());
            };
            let printed = print_expr(key);
            if items
                .iter()
                .any(|item| item.key.as_ref().map(print_expr).as_deref() == Some(printed.as_str()))
            {
                false
            } else {
                items.push(ArrayItem {
                    key: Some(key.clone()),
                    value: value.clone(),
                });
                stmt.verbatim = None;
                true
            }
        }
    };
    if changed {
        debug!(class = %class_name, method, key = %print_expr(key), "Adding class map entry");
        member.touch();
    }
    Ok(changed)
}
