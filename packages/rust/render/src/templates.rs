//! Askama templates for plugin pages.
//!
//! Template selection is owned here: plugins with a usable record get the
//! full page, plugins whose documentation could not be validated get the
//! insufficient-documentation page. Both show the plugin's recorded
//! diagnostics inline.

use std::collections::BTreeMap;

use askama::Template;

use plugindocs_shared::{
    DocsBuildError, NormalizedRecord, OptionDoc, PluginDocs, PluginIdentity, Result, ReturnDoc,
};

/// Full documentation page for a plugin with validated content.
#[derive(Template)]
#[template(path = "plugin.rst", escape = "none")]
struct PluginPageTemplate<'a> {
    title: String,
    title_line: String,
    docs: &'a PluginDocs,
    options: Vec<OptionRow<'a>>,
    example_lines: Vec<&'a str>,
    returns: Vec<&'a ReturnDoc>,
    errors: &'a [String],
    generated: String,
}

/// One parameter row, paired with its name for the template.
struct OptionRow<'a> {
    name: &'a str,
    doc: &'a OptionDoc,
}

/// Fallback page for a plugin whose documentation could not be validated.
#[derive(Template)]
#[template(path = "plugin-error.rst", escape = "none")]
struct ErrorPageTemplate<'a> {
    title: String,
    title_line: String,
    kind: &'a str,
    errors: &'a [String],
    generated: String,
}

/// Render the page text for one plugin.
///
/// Rendering the empty placeholder always succeeds; it produces the
/// insufficient-documentation page with whatever diagnostics were
/// recorded.
pub fn render_page(
    identity: &PluginIdentity,
    record: &NormalizedRecord,
    errors: &[String],
) -> Result<String> {
    let generated = chrono::Utc::now().format("%Y-%m-%d").to_string();

    let rendered = match record {
        NormalizedRecord::Empty => {
            let title = format!("{} ({})", identity.name, identity.kind);
            ErrorPageTemplate {
                title_line: underline(&title),
                title,
                kind: &identity.kind,
                errors,
                generated,
            }
            .render()
        }
        NormalizedRecord::Full {
            docs,
            examples,
            returns,
        } => {
            let title = format!("{} -- {}", identity.name, docs.short_description);
            PluginPageTemplate {
                title_line: underline(&title),
                title,
                docs,
                options: docs
                    .options
                    .iter()
                    .map(|(name, doc)| OptionRow {
                        name: name.as_str(),
                        doc,
                    })
                    .collect(),
                example_lines: examples.lines().collect(),
                returns: flatten_returns(returns),
                errors,
                generated,
            }
            .render()
        }
    };

    rendered.map_err(|e| DocsBuildError::Render(format!("template for {identity}: {e}")))
}

/// RST title underline matching the title's display width.
fn underline(title: &str) -> String {
    "=".repeat(title.chars().count())
}

/// Flatten a return-value tree into document order: each entry followed by
/// its nested values. `full_key` keeps the hierarchy readable.
fn flatten_returns(returns: &BTreeMap<String, ReturnDoc>) -> Vec<&ReturnDoc> {
    let mut flat = Vec::new();
    for ret in returns.values() {
        push_return(ret, &mut flat);
    }
    flat
}

fn push_return<'a>(ret: &'a ReturnDoc, flat: &mut Vec<&'a ReturnDoc>) {
    flat.push(ret);
    for child in ret.contains.values() {
        push_return(child, flat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> PluginIdentity {
        PluginIdentity::new("module", "ns.coll.foo")
    }

    fn full_record() -> NormalizedRecord {
        let mut options = BTreeMap::new();
        options.insert(
            "state".to_string(),
            OptionDoc {
                description: vec!["Desired state.".to_string()],
                required: true,
                type_name: Some("str".to_string()),
                default: None,
                choices: Vec::new(),
            },
        );

        NormalizedRecord::Full {
            docs: PluginDocs {
                short_description: "Manage things".to_string(),
                description: vec!["Does things to things.".to_string()],
                author: vec!["A. Maintainer".to_string()],
                version_added: None,
                notes: Vec::new(),
                requirements: Vec::new(),
                option_keys: vec!["state".to_string()],
                options,
            },
            examples: "- name: demo\n  ns.coll.foo:\n    state: present".to_string(),
            returns: BTreeMap::new(),
        }
    }

    #[test]
    fn empty_record_renders_the_insufficient_documentation_page() {
        let errors = vec!["ns.coll.foo (module): documentation section unusable".to_string()];
        let page = render_page(&identity(), &NormalizedRecord::Empty, &errors)
            .expect("empty records must always render");

        assert!(page.contains("Insufficient documentation"));
        assert!(page.contains("documentation section unusable"));
        assert!(page.contains("ns.coll.foo (module)"));
    }

    #[test]
    fn empty_record_without_diagnostics_still_renders() {
        let page = render_page(&identity(), &NormalizedRecord::Empty, &[])
            .expect("empty records must always render");
        assert!(page.contains("No further diagnostics"));
    }

    #[test]
    fn full_record_renders_all_sections() {
        let page = render_page(&identity(), &full_record(), &[]).expect("render");

        assert!(page.contains("ns.coll.foo -- Manage things"));
        assert!(page.contains("Does things to things."));
        assert!(page.contains("``state``"));
        assert!(page.contains("(required)"));
        assert!(page.contains(".. code-block:: yaml+jinja"));
        assert!(page.contains("    - name: demo"));
        // Defaulted return section renders no header at all.
        assert!(!page.contains("Return Values"));
        // No diagnostics, no warning box.
        assert!(!page.contains(".. warning::"));
    }

    #[test]
    fn full_record_shows_diagnostics_inline() {
        let errors =
            vec!["ns.coll.foo (module): return values section replaced with default".to_string()];
        let page = render_page(&identity(), &full_record(), &errors).expect("render");

        assert!(page.contains(".. warning::"));
        assert!(page.contains("replaced with default"));
    }

    #[test]
    fn nested_return_values_render_with_full_keys() {
        let mut contains = BTreeMap::new();
        contains.insert(
            "name".to_string(),
            ReturnDoc {
                description: vec!["Database name.".to_string()],
                full_key: vec!["databases".to_string(), "name".to_string()],
                ..Default::default()
            },
        );
        let mut returns = BTreeMap::new();
        returns.insert(
            "databases".to_string(),
            ReturnDoc {
                description: vec!["Databases found.".to_string()],
                returned: Some("always".to_string()),
                full_key: vec!["databases".to_string()],
                contains,
                ..Default::default()
            },
        );

        let record = match full_record() {
            NormalizedRecord::Full { docs, examples, .. } => NormalizedRecord::Full {
                docs,
                examples,
                returns,
            },
            NormalizedRecord::Empty => unreachable!(),
        };

        let page = render_page(&identity(), &record, &[]).expect("render");
        assert!(page.contains("Return Values"));
        assert!(page.contains("``databases``"));
        assert!(page.contains("``databases.name``"));
        assert!(page.contains("| Returned: always"));
    }
}
