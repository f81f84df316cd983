//! Filter and sort evaluation for the in-memory store
//!
//! Filters are nested objects whose leaves are operator objects:
//!
//! ```json
//! { "frontmatter": { "draft": { "ne": true }, "tags": { "in": ["rust"] } } }
//! ```
//!
//! Sort expressions name dotted field paths with a matching order list:
//!
//! ```json
//! { "fields": ["frontmatter.date", "id"], "order": ["DESC", "ASC"] }
//! ```

use crate::models::Node;
use anyhow::{anyhow, bail, Result};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// One leaf test against the value at a dotted field path
#[derive(Debug)]
enum Predicate {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Nin(Vec<Value>),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    Regex(Regex),
    Exists(bool),
}

#[derive(Debug)]
struct Condition {
    path: String,
    predicate: Predicate,
}

/// A filter expression validated and compiled once per query.
///
/// Regex operands are built here, so matching a node never allocates a
/// regex. All conditions are conjunctive.
#[derive(Debug)]
pub(crate) struct CompiledFilter {
    conditions: Vec<Condition>,
}

impl CompiledFilter {
    /// Compile a filter expression. `null` and `{}` match everything.
    pub(crate) fn compile(filter: &Value) -> Result<Self> {
        let mut conditions = Vec::new();
        match filter {
            Value::Null => {}
            Value::Object(fields) => collect_conditions("", fields, &mut conditions)?,
            other => bail!("Filter must be an object, got {}", other),
        }
        Ok(Self { conditions })
    }

    /// Whether `node` satisfies every condition
    pub(crate) fn matches(&self, node: &Node) -> bool {
        self.conditions.iter().all(|condition| {
            let field = node.field(&condition.path);
            condition
                .predicate
                .test(field.as_ref().filter(|v| !v.is_null()))
        })
    }
}

fn collect_conditions(
    prefix: &str,
    fields: &Map<String, Value>,
    conditions: &mut Vec<Condition>,
) -> Result<()> {
    for (key, operand) in fields {
        if let Some(predicate) = Predicate::parse(key, operand)? {
            if prefix.is_empty() {
                bail!("Operator '{}' used without a field", key);
            }
            conditions.push(Condition {
                path: prefix.to_string(),
                predicate,
            });
            continue;
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        let nested = operand
            .as_object()
            .ok_or_else(|| anyhow!("Filter for '{}' must be an object", path))?;
        collect_conditions(&path, nested, conditions)?;
    }
    Ok(())
}

impl Predicate {
    /// `Ok(None)` when `operator` is not an operator but a field name
    fn parse(operator: &str, operand: &Value) -> Result<Option<Self>> {
        let predicate = match operator {
            "eq" => Predicate::Eq(operand.clone()),
            "ne" => Predicate::Ne(operand.clone()),
            "in" => Predicate::In(array_operand(operand, operator)?),
            "nin" => Predicate::Nin(array_operand(operand, operator)?),
            "gt" => Predicate::Gt(operand.clone()),
            "gte" => Predicate::Gte(operand.clone()),
            "lt" => Predicate::Lt(operand.clone()),
            "lte" => Predicate::Lte(operand.clone()),
            "regex" => Predicate::Regex(build_regex(operand)?),
            "exists" => Predicate::Exists(
                operand
                    .as_bool()
                    .ok_or_else(|| anyhow!("exists requires a boolean"))?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(predicate))
    }

    fn test(&self, field: Option<&Value>) -> bool {
        match self {
            Predicate::Eq(operand) => equals(field, operand),
            Predicate::Ne(operand) => !equals(field, operand),
            Predicate::In(candidates) => one_of(field, candidates),
            Predicate::Nin(candidates) => !one_of(field, candidates),
            Predicate::Gt(operand) => compare(field, operand) == Some(Ordering::Greater),
            Predicate::Gte(operand) => matches!(
                compare(field, operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::Lt(operand) => compare(field, operand) == Some(Ordering::Less),
            Predicate::Lte(operand) => matches!(
                compare(field, operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Predicate::Regex(regex) => field
                .and_then(Value::as_str)
                .map_or(false, |s| regex.is_match(s)),
            Predicate::Exists(wanted) => field.is_some() == *wanted,
        }
    }
}

fn array_operand(operand: &Value, operator: &str) -> Result<Vec<Value>> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| anyhow!("{} requires an array value", operator))
}

/// Array fields match when any element equals the operand
fn equals(field: Option<&Value>, operand: &Value) -> bool {
    match field {
        None => operand.is_null(),
        Some(Value::Array(items)) if !operand.is_array() => items.contains(operand),
        Some(value) => value == operand,
    }
}

fn one_of(field: Option<&Value>, candidates: &[Value]) -> bool {
    match field {
        None => candidates.iter().any(Value::is_null),
        Some(Value::Array(items)) => items.iter().any(|item| candidates.contains(item)),
        Some(value) => candidates.contains(value),
    }
}

fn compare(field: Option<&Value>, operand: &Value) -> Option<Ordering> {
    match (field?, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Accepts `/pattern/flags` or a bare pattern. Only the `i` flag is honoured.
fn build_regex(operand: &Value) -> Result<Regex> {
    let raw = operand
        .as_str()
        .ok_or_else(|| anyhow!("regex requires a string value"))?;
    let (pattern, case_insensitive) = match raw.strip_prefix('/').and_then(|r| r.rsplit_once('/')) {
        Some((pattern, flags)) => (pattern, flags.contains('i')),
        None => (raw, false),
    };
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()?)
}

/// Sort `nodes` in place. `None` and `null` leave the order untouched.
pub(crate) fn sort_nodes(nodes: &mut [Node], sort: Option<&Value>) -> Result<()> {
    let sort = match sort {
        None | Some(Value::Null) => return Ok(()),
        Some(sort) => sort,
    };
    let fields: Vec<String> = match sort.get("fields") {
        Some(Value::Array(fields)) => fields
            .iter()
            .map(|f| {
                f.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("Sort fields must be strings"))
            })
            .collect::<Result<_>>()?,
        Some(Value::String(field)) => vec![field.clone()],
        _ => bail!("Sort requires a 'fields' list"),
    };
    let descending: Vec<bool> = match sort.get("order") {
        Some(Value::Array(order)) => order.iter().map(is_descending).collect(),
        Some(order) => vec![is_descending(order)],
        None => Vec::new(),
    };

    nodes.sort_by(|a, b| {
        for (i, field) in fields.iter().enumerate() {
            let ordering = compare_json_values(a.field(field).as_ref(), b.field(field).as_ref());
            let ordering = if descending.get(i).copied().unwrap_or(false) {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn is_descending(order: &Value) -> bool {
    order
        .as_str()
        .map_or(false, |o| o.eq_ignore_ascii_case("desc"))
}

/// Compare two JSON values for sorting
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(va), Some(vb)) => match (va, vb) {
            (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
            (Value::Number(na), Value::Number(nb)) => {
                let fa = na.as_f64().unwrap_or(0.0);
                let fb = nb.as_f64().unwrap_or(0.0);
                fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
            }
            (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
            // Mixed types, arrays and objects compare by their JSON text
            _ => va.to_string().cmp(&vb.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(id: &str, date: &str, tags: Value) -> Node {
        Node::new(id, "Post").with_field(
            "frontmatter",
            json!({ "date": date, "tags": tags, "draft": false }),
        )
    }

    fn matches(node: &Node, filter: Value) -> bool {
        CompiledFilter::compile(&filter).unwrap().matches(node)
    }

    #[test]
    fn test_nested_operators() {
        let node = post("a", "2020-01-01", json!(["rust", "graphs"]));

        assert!(matches(&node, json!(null)));
        assert!(matches(&node, json!({ "id": { "eq": "a" } })));
        assert!(matches(&node, json!({ "frontmatter": { "tags": { "eq": "rust" } } })));
        assert!(matches(&node, json!({ "frontmatter": { "tags": { "in": ["go", "graphs"] } } })));
        assert!(!matches(&node, json!({ "frontmatter": { "tags": { "nin": ["rust"] } } })));
        assert!(matches(&node, json!({ "frontmatter": { "date": { "gte": "2020-01-01", "lt": "2021" } } })));
        assert!(matches(&node, json!({ "frontmatter": { "draft": { "ne": true } } })));
        assert!(matches(&node, json!({ "frontmatter": { "title": { "exists": false } } })));
        assert!(matches(&node, json!({ "internal": { "type": { "regex": "/^post$/i" } } })));
        assert!(!matches(&node, json!({ "id": { "regex": "^b" } })));
    }

    #[test]
    fn test_malformed_filters_are_errors() {
        assert!(CompiledFilter::compile(&json!("id")).is_err());
        assert!(CompiledFilter::compile(&json!({ "eq": "a" })).is_err());
        assert!(CompiledFilter::compile(&json!({ "id": "a" })).is_err());
        assert!(CompiledFilter::compile(&json!({ "id": { "in": "a" } })).is_err());
        assert!(CompiledFilter::compile(&json!({ "id": { "like": "a" } })).is_err());
        assert!(CompiledFilter::compile(&json!({ "id": { "regex": "(" } })).is_err());
    }

    #[test]
    fn test_compiled_filter_is_reused_across_nodes() {
        let filter = CompiledFilter::compile(&json!({
            "id": { "regex": "/^A/i" },
            "frontmatter": { "tags": { "exists": true } }
        }))
        .unwrap();

        let nodes = [
            post("a1", "2020-01-01", json!(["rust"])),
            post("b1", "2020-01-01", json!(["rust"])),
            post("A2", "2020-01-01", json!(null)),
            post("a3", "2020-01-01", json!([])),
        ];
        let ids: Vec<_> = nodes
            .iter()
            .filter(|n| filter.matches(n))
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a1", "a3"]);
    }

    #[test]
    fn test_sort_by_multiple_fields() {
        let mut nodes = vec![
            post("b", "2020-01-01", json!([])),
            post("c", "2021-01-01", json!([])),
            post("a", "2020-01-01", json!([])),
        ];

        sort_nodes(
            &mut nodes,
            Some(&json!({ "fields": ["frontmatter.date", "id"], "order": ["DESC", "ASC"] })),
        )
        .unwrap();

        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_without_expression_keeps_order() {
        let mut nodes = vec![post("b", "1", json!([])), post("a", "2", json!([]))];
        sort_nodes(&mut nodes, None).unwrap();
        assert_eq!(nodes[0].id, "b");
        assert!(sort_nodes(&mut nodes, Some(&json!({ "order": "ASC" }))).is_err());
    }
}
