//! Per-section schema validation for raw plugin records.
//!
//! Dispatch from a section to its validation function is an explicit
//! `match` resolved at compile time; there is no dynamic field lookup.

use std::collections::BTreeMap;

use serde_json::Value;

use plugindocs_shared::{DocsBuildError, OptionDoc, PluginDocs, Result, ReturnDoc};

/// The three logical sections of a raw record, validated in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Docs,
    Examples,
    Returns,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docs => "documentation",
            Self::Examples => "examples",
            Self::Returns => "return values",
        }
    }
}

/// A section value that passed validation.
#[derive(Debug, Clone)]
pub enum ValidatedSection {
    Docs(PluginDocs),
    Examples(String),
    Returns(BTreeMap<String, ReturnDoc>),
}

/// Validate one section of a raw record for a plugin of the given kind.
pub fn validate(kind: &str, section: Section, value: &Value) -> Result<ValidatedSection> {
    match section {
        Section::Docs => validate_docs(kind, value).map(ValidatedSection::Docs),
        Section::Examples => validate_examples(value).map(ValidatedSection::Examples),
        Section::Returns => validate_returns(value).map(ValidatedSection::Returns),
    }
}

// ---------------------------------------------------------------------------
// Documentation section
// ---------------------------------------------------------------------------

/// Validate and canonicalize the primary documentation section.
///
/// Canonicalization mirrors what downstream templates expect:
/// `description` and option descriptions become lists of paragraphs, the
/// short description loses its trailing period, and option names are
/// collected sorted into `option_keys`.
pub fn validate_docs(kind: &str, value: &Value) -> Result<PluginDocs> {
    let doc = value.as_object().ok_or_else(|| {
        DocsBuildError::validation(format!(
            "{kind} documentation must be a mapping, got {}",
            json_type(value)
        ))
    })?;

    let short_description = doc
        .get("short_description")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DocsBuildError::validation("short_description is required and must be a string")
        })?
        .trim_end_matches('.')
        .to_string();

    let description = string_list(doc.get("description"), "description")?;

    let author = match doc.get("author") {
        None | Some(Value::Null) => vec!["UNKNOWN".to_string()],
        value => string_list(value, "author")?,
    };

    let version_added = optional_string(doc.get("version_added"), "version_added")?;
    let notes = optional_string_list(doc.get("notes"), "notes")?;
    let requirements = optional_string_list(doc.get("requirements"), "requirements")?;

    let mut options = BTreeMap::new();
    match doc.get("options") {
        None | Some(Value::Null) => {}
        Some(Value::Object(raw_options)) => {
            for (name, raw) in raw_options {
                options.insert(name.clone(), validate_option(name, raw)?);
            }
        }
        Some(other) => {
            return Err(DocsBuildError::validation(format!(
                "options must be a mapping when used, got {}",
                json_type(other)
            )));
        }
    }
    let option_keys = options.keys().cloned().collect();

    Ok(PluginDocs {
        short_description,
        description,
        author,
        version_added,
        notes,
        requirements,
        options,
        option_keys,
    })
}

fn validate_option(name: &str, value: &Value) -> Result<OptionDoc> {
    let option = value.as_object().ok_or_else(|| {
        DocsBuildError::validation(format!("option '{name}' must be a mapping"))
    })?;

    let description = string_list(
        option.get("description"),
        &format!("description for option '{name}'"),
    )?;

    let required = match option.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(required)) => *required,
        Some(other) => {
            return Err(DocsBuildError::validation(format!(
                "required for option '{name}' must be a boolean, got {}",
                json_type(other)
            )));
        }
    };

    let type_name = optional_string(option.get("type"), &format!("type for option '{name}'"))?;
    let default = option.get("default").filter(|v| !v.is_null()).cloned();
    let choices = match option.get("choices") {
        Some(Value::Array(choices)) => choices.clone(),
        _ => Vec::new(),
    };

    Ok(OptionDoc {
        description,
        required,
        type_name,
        default,
        choices,
    })
}

// ---------------------------------------------------------------------------
// Examples section
// ---------------------------------------------------------------------------

/// Validate the examples section. Missing examples default to empty text.
pub fn validate_examples(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(examples) => Ok(examples.clone()),
        other => Err(DocsBuildError::validation(format!(
            "examples must be plain text, got {}",
            json_type(other)
        ))),
    }
}

// ---------------------------------------------------------------------------
// Return-value section
// ---------------------------------------------------------------------------

/// Validate the return-value section, annotating every entry (nested ones
/// included) with its hierarchical `full_key` path.
pub fn validate_returns(value: &Value) -> Result<BTreeMap<String, ReturnDoc>> {
    match value {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(entries) => {
            let mut returns = BTreeMap::new();
            for (name, entry) in entries {
                returns.insert(name.clone(), validate_return_entry(name, entry, &[])?);
            }
            Ok(returns)
        }
        other => Err(DocsBuildError::validation(format!(
            "return values must be a mapping, got {}",
            json_type(other)
        ))),
    }
}

fn validate_return_entry(name: &str, value: &Value, parent_key: &[String]) -> Result<ReturnDoc> {
    let mut full_key = parent_key.to_vec();
    full_key.push(name.to_string());

    let entry = value.as_object().ok_or_else(|| {
        DocsBuildError::validation(format!(
            "return value '{}' must be a mapping",
            full_key.join(".")
        ))
    })?;

    let description = string_list(
        entry.get("description"),
        &format!("description for return value '{}'", full_key.join(".")),
    )?;
    let returned = optional_string(entry.get("returned"), "returned")?;
    let type_name = optional_string(entry.get("type"), "type")?;
    let sample = entry.get("sample").filter(|v| !v.is_null()).cloned();

    let mut contains = BTreeMap::new();
    match entry.get("contains") {
        None | Some(Value::Null) => {}
        Some(Value::Object(children)) => {
            for (child_name, child) in children {
                contains.insert(
                    child_name.clone(),
                    validate_return_entry(child_name, child, &full_key)?,
                );
            }
        }
        // Some sources wrap the nested mapping in a single-element list.
        Some(Value::Array(children)) if children.len() == 1 && children[0].is_object() => {
            if let Value::Object(inner) = &children[0] {
                for (child_name, child) in inner {
                    contains.insert(
                        child_name.clone(),
                        validate_return_entry(child_name, child, &full_key)?,
                    );
                }
            }
        }
        Some(other) => {
            return Err(DocsBuildError::validation(format!(
                "contains for return value '{}' must be a mapping, got {}",
                full_key.join("."),
                json_type(other)
            )));
        }
    }

    Ok(ReturnDoc {
        description,
        returned,
        type_name,
        sample,
        contains,
        full_key,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Coerce a field into a list of strings; a bare string becomes a
/// one-element list. Missing fields are an error.
fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => {
            Err(DocsBuildError::validation(format!("{field} is required")))
        }
        Some(Value::String(line)) => Ok(vec![line.clone()]),
        Some(Value::Array(lines)) => lines
            .iter()
            .map(|line| {
                line.as_str().map(str::to_string).ok_or_else(|| {
                    DocsBuildError::validation(format!(
                        "{field} must contain only strings, got {}",
                        json_type(line)
                    ))
                })
            })
            .collect(),
        Some(other) => Err(DocsBuildError::validation(format!(
            "{field} must be a string or list of strings, got {}",
            json_type(other)
        ))),
    }
}

/// Like [`string_list`] but missing fields validate to an empty list.
fn optional_string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        value => string_list(value, field),
    }
}

fn optional_string(value: Option<&Value>, field: &str) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        // Versions are often written unquoted in source metadata.
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(DocsBuildError::validation(format!(
            "{field} must be a string, got {}",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
