//! Token types produced by the tokenizer

use cppgraph_core::Visibility;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One element of a flattened `#if` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionElement {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `(`
    LeftBracket,
    /// `)`
    RightBracket,
    /// `defined(NAME)`
    Defined { name: String },
    /// `!defined(NAME)`
    NotDefined { name: String },
    Equals { left: String, right: String },
    NotEquals { left: String, right: String },
    GreaterThan { left: String, right: String },
    GreaterThanOrEquals { left: String, right: String },
    LessThan { left: String, right: String },
    LessThanOrEquals { left: String, right: String },
    /// `__has_include("name")`
    HasIncludeLocal { name: String },
    /// `__has_include(<name>)`
    HasIncludeExternal { name: String },
}

/// A recognized preprocessor directive or module declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Token {
    /// `#if`, `#ifdef`, `#ifndef` and the condition half of `#elif*`
    If { elements: Vec<ConditionElement> },
    Else,
    EndIf,
    Define { name: String, value: String },
    Undef { name: String },
    IncludeLocal { name: String },
    IncludeExternal { name: String },
    /// `#include <name>` where `name` is a standard library header
    IncludeStl { name: String },
    Module { name: String, visibility: Visibility },
    ModulePartition { module: String, name: String, visibility: Visibility },
    ImportModule { name: String, visibility: Visibility },
    ImportModulePartition { name: String, visibility: Visibility },
    ImportIncludeLocal { name: String, visibility: Visibility },
    ImportIncludeExternal { name: String, visibility: Visibility },
}

impl Token {
    /// Visibility of module declarations and imports, `None` for directives.
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Token::Module { visibility, .. }
            | Token::ModulePartition { visibility, .. }
            | Token::ImportModule { visibility, .. }
            | Token::ImportModulePartition { visibility, .. }
            | Token::ImportIncludeLocal { visibility, .. }
            | Token::ImportIncludeExternal { visibility, .. } => Some(*visibility),
            Token::If { .. }
            | Token::Else
            | Token::EndIf
            | Token::Define { .. }
            | Token::Undef { .. }
            | Token::IncludeLocal { .. }
            | Token::IncludeExternal { .. }
            | Token::IncludeStl { .. } => None,
        }
    }
}

impl fmt::Display for ConditionElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionElement::And => write!(f, "&&"),
            ConditionElement::Or => write!(f, "||"),
            ConditionElement::Not => write!(f, "!"),
            ConditionElement::LeftBracket => write!(f, "("),
            ConditionElement::RightBracket => write!(f, ")"),
            ConditionElement::Defined { name } => write!(f, "defined({name})"),
            ConditionElement::NotDefined { name } => write!(f, "!defined({name})"),
            ConditionElement::Equals { left, right } => write!(f, "{left} == {right}"),
            ConditionElement::NotEquals { left, right } => write!(f, "{left} != {right}"),
            ConditionElement::GreaterThan { left, right } => write!(f, "{left} > {right}"),
            ConditionElement::GreaterThanOrEquals { left, right } => {
                write!(f, "{left} >= {right}")
            }
            ConditionElement::LessThan { left, right } => write!(f, "{left} < {right}"),
            ConditionElement::LessThanOrEquals { left, right } => write!(f, "{left} <= {right}"),
            ConditionElement::HasIncludeLocal { name } => write!(f, "__has_include(\"{name}\")"),
            ConditionElement::HasIncludeExternal { name } => write!(f, "__has_include(<{name}>)"),
        }
    }
}

fn export_prefix(visibility: &Visibility) -> &'static str {
    if visibility.is_exported() {
        "export "
    } else {
        ""
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::If { elements } => {
                write!(f, "#if")?;
                let mut previous: Option<&ConditionElement> = None;
                for element in elements {
                    // no space after `!` or `(`, none before `)`
                    let glued = matches!(
                        previous,
                        Some(ConditionElement::Not | ConditionElement::LeftBracket)
                    ) || matches!(element, ConditionElement::RightBracket);
                    if !glued {
                        write!(f, " ")?;
                    }
                    write!(f, "{element}")?;
                    previous = Some(element);
                }
                Ok(())
            }
            Token::Else => write!(f, "#else"),
            Token::EndIf => write!(f, "#endif"),
            Token::Define { name, value } if value.is_empty() => write!(f, "#define {name}"),
            Token::Define { name, value } => write!(f, "#define {name} {value}"),
            Token::Undef { name } => write!(f, "#undef {name}"),
            Token::IncludeLocal { name } => write!(f, "#include \"{name}\""),
            Token::IncludeExternal { name } | Token::IncludeStl { name } => {
                write!(f, "#include <{name}>")
            }
            Token::Module { name, visibility } => {
                write!(f, "{}module {name};", export_prefix(visibility))
            }
            Token::ModulePartition {
                module,
                name,
                visibility,
            } => write!(f, "{}module {module} : {name};", export_prefix(visibility)),
            Token::ImportModule { name, visibility } => {
                write!(f, "{}import {name};", export_prefix(visibility))
            }
            Token::ImportModulePartition { name, visibility } => {
                write!(f, "{}import : {name};", export_prefix(visibility))
            }
            Token::ImportIncludeLocal { name, visibility } => {
                write!(f, "{}import \"{name}\";", export_prefix(visibility))
            }
            Token::ImportIncludeExternal { name, visibility } => {
                write!(f, "{}import <{name}>;", export_prefix(visibility))
            }
        }
    }
}
