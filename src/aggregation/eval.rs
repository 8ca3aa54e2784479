//! # Pipeline Evaluation
//!
//! Runs a [`Pipeline`] over a snapshot of documents.

use std::cmp::Ordering;

use chrono::Datelike;
use serde_json::{Map, Number, Value};

use super::pipeline::{Accumulator, Expr, GroupStage, Pipeline, Stage};
use crate::query::ID_FIELD;
use crate::store::eval::{compare_values, get_field, matches_all, sort_documents, value_as_date};

/// Evaluate every stage in order
pub fn run(documents: Vec<Value>, pipeline: &Pipeline) -> Vec<Value> {
    pipeline
        .stages()
        .iter()
        .fold(documents, |docs, stage| apply_stage(docs, stage))
}

fn apply_stage(mut docs: Vec<Value>, stage: &Stage) -> Vec<Value> {
    match stage {
        Stage::Match(conditions) => {
            docs.retain(|doc| matches_all(doc, conditions));
            docs
        }
        Stage::Unwind(field) => unwind(docs, field),
        Stage::Group(group) => group_documents(docs, group),
        Stage::AddFields(fields) => {
            for doc in docs.iter_mut() {
                let current: &Value = doc;
                let computed: Vec<(String, Value)> = fields
                    .iter()
                    .filter_map(|(name, expr)| evaluate(expr, current).map(|v| (name.clone(), v)))
                    .collect();
                if let Value::Object(map) = doc {
                    map.extend(computed);
                }
            }
            docs
        }
        Stage::Project(fields) => {
            for doc in docs.iter_mut() {
                if let Value::Object(map) = doc {
                    for field in fields {
                        map.remove(field);
                    }
                }
            }
            docs
        }
        Stage::Sort(keys) => {
            sort_documents(&mut docs, keys);
            docs
        }
        Stage::Limit(n) => {
            docs.truncate(*n);
            docs
        }
    }
}

/// Missing, null and empty arrays produce no output documents
fn unwind(docs: Vec<Value>, field: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(docs.len());

    for doc in docs {
        match doc.get(field) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items.clone() {
                    let mut copy = doc.clone();
                    if let Value::Object(map) = &mut copy {
                        map.insert(field.to_string(), item);
                    }
                    out.push(copy);
                }
            }
            Some(_) => out.push(doc),
        }
    }

    out
}

/// Evaluate an expression. `None` means the value is missing.
pub fn evaluate(expr: &Expr, doc: &Value) -> Option<Value> {
    match expr {
        Expr::Field(path) => get_field(doc, path).cloned(),
        Expr::Literal(value) => Some(value.clone()),
        Expr::ToUpper(inner) => {
            let upper = match evaluate(inner, doc) {
                Some(Value::String(s)) => s.to_uppercase(),
                _ => String::new(),
            };
            Some(Value::String(upper))
        }
        Expr::Month(inner) => {
            let month = evaluate(inner, doc)
                .as_ref()
                .and_then(value_as_date)
                .map(|date| Value::from(date.month()));
            Some(month.unwrap_or(Value::Null))
        }
    }
}

/// Running state of one accumulator
#[derive(Debug)]
enum AccState {
    Sum { int: i64, float: f64, integral: bool },
    Avg { total: f64, count: usize },
    Min(Option<Value>),
    Max(Option<Value>),
    Push(Vec<Value>),
}

impl AccState {
    fn new(accumulator: &Accumulator) -> Self {
        match accumulator {
            Accumulator::Sum(_) => AccState::Sum {
                int: 0,
                float: 0.0,
                integral: true,
            },
            Accumulator::Avg(_) => AccState::Avg { total: 0.0, count: 0 },
            Accumulator::Min(_) => AccState::Min(None),
            Accumulator::Max(_) => AccState::Max(None),
            Accumulator::Push(_) => AccState::Push(Vec::new()),
        }
    }

    fn add(&mut self, value: Option<Value>) {
        match self {
            AccState::Sum {
                int,
                float,
                integral,
            } => {
                let Some(Value::Number(n)) = value else {
                    return;
                };
                match (n.as_i64(), *integral) {
                    (Some(i), true) => match int.checked_add(i) {
                        Some(sum) => *int = sum,
                        None => {
                            *float = *int as f64 + i as f64;
                            *integral = false;
                        }
                    },
                    _ => {
                        if *integral {
                            *float = *int as f64;
                            *integral = false;
                        }
                        *float += n.as_f64().unwrap_or(0.0);
                    }
                }
            }
            AccState::Avg { total, count } => {
                if let Some(n) = value.as_ref().and_then(Value::as_f64) {
                    *total += n;
                    *count += 1;
                }
            }
            AccState::Min(current) => keep_extreme(current, value, Ordering::Less),
            AccState::Max(current) => keep_extreme(current, value, Ordering::Greater),
            AccState::Push(items) => {
                if let Some(v) = value {
                    items.push(v);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            AccState::Sum {
                int,
                float,
                integral,
            } => {
                if integral {
                    Value::from(int)
                } else {
                    float_value(float)
                }
            }
            AccState::Avg { total, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    float_value(total / count as f64)
                }
            }
            AccState::Min(v) | AccState::Max(v) => v.unwrap_or(Value::Null),
            AccState::Push(items) => Value::Array(items),
        }
    }
}

fn keep_extreme(current: &mut Option<Value>, candidate: Option<Value>, wanted: Ordering) {
    let candidate = match candidate {
        None | Some(Value::Null) => return,
        Some(v) => v,
    };
    let replace = match current {
        None => true,
        Some(existing) => compare_values(Some(&candidate), Some(existing)) == wanted,
    };
    if replace {
        *current = Some(candidate);
    }
}

fn float_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn accumulator_expr(accumulator: &Accumulator) -> &Expr {
    match accumulator {
        Accumulator::Sum(e)
        | Accumulator::Avg(e)
        | Accumulator::Min(e)
        | Accumulator::Max(e)
        | Accumulator::Push(e) => e,
    }
}

/// Groups are emitted in first-seen order
fn group_documents(docs: Vec<Value>, group: &GroupStage) -> Vec<Value> {
    let mut groups: Vec<(Value, Vec<AccState>)> = Vec::new();

    for doc in &docs {
        let key = evaluate(&group.key, doc).unwrap_or(Value::Null);

        let index = match groups.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                let states = group.fields.iter().map(|(_, acc)| AccState::new(acc)).collect();
                groups.push((key, states));
                groups.len() - 1
            }
        };

        for ((_, accumulator), state) in group.fields.iter().zip(groups[index].1.iter_mut()) {
            state.add(evaluate(accumulator_expr(accumulator), doc));
        }
    }

    groups
        .into_iter()
        .map(|(key, states)| {
            let mut out = Map::new();
            out.insert(ID_FIELD.to_string(), key);
            for ((name, _), state) in group.fields.iter().zip(states) {
                out.insert(name.clone(), state.finish());
            }
            Value::Object(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterCondition, SortKey};
    use serde_json::json;

    #[test]
    fn test_unwind_drops_missing_and_empty() {
        let docs = vec![
            json!({"n": 1, "tags": ["a", "b"]}),
            json!({"n": 2, "tags": []}),
            json!({"n": 3}),
            json!({"n": 4, "tags": "solo"}),
        ];
        let out = run(docs, &Pipeline::new().unwind("tags"));
        let tags: Vec<&Value> = out.iter().map(|d| &d["tags"]).collect();
        assert_eq!(tags, vec![&json!("a"), &json!("b"), &json!("solo")]);
    }

    #[test]
    fn test_group_first_seen_order_and_accumulators() {
        let docs = vec![
            json!({"k": "b", "x": 2, "y": 1.5}),
            json!({"k": "a", "x": 1}),
            json!({"k": "b", "x": 4, "y": null}),
        ];
        let pipeline = Pipeline::new().group(
            GroupStage::by(Expr::field("k"))
                .with("n", Accumulator::count())
                .with("total", Accumulator::Sum(Expr::field("x")))
                .with("avgY", Accumulator::Avg(Expr::field("y")))
                .with("minX", Accumulator::Min(Expr::field("x")))
                .with("maxY", Accumulator::Max(Expr::field("y")))
                .with("xs", Accumulator::Push(Expr::field("x"))),
        );

        let out = run(docs, &pipeline);
        assert_eq!(
            out,
            vec![
                json!({"_id": "b", "n": 2, "total": 6, "avgY": 1.5, "minX": 2, "maxY": 1.5, "xs": [2, 4]}),
                json!({"_id": "a", "n": 1, "total": 1, "avgY": null, "minX": 1, "maxY": null, "xs": [1]}),
            ]
        );
    }

    #[test]
    fn test_sum_switches_to_float() {
        let docs = vec![json!({"x": 1}), json!({"x": 0.5})];
        let pipeline = Pipeline::new().group(
            GroupStage::by(Expr::Literal(Value::Null)).with("s", Accumulator::Sum(Expr::field("x"))),
        );
        assert_eq!(run(docs, &pipeline)[0]["s"], json!(1.5));
    }

    #[test]
    fn test_expressions() {
        let doc = json!({"d": "easy", "when": "2024-07-20T09:00:00.000Z", "bad": "later"});
        assert_eq!(evaluate(&Expr::to_upper(Expr::field("d")), &doc), Some(json!("EASY")));
        assert_eq!(evaluate(&Expr::to_upper(Expr::field("nope")), &doc), Some(json!("")));
        assert_eq!(evaluate(&Expr::month(Expr::field("when")), &doc), Some(json!(7)));
        assert_eq!(evaluate(&Expr::month(Expr::field("bad")), &doc), Some(Value::Null));
        assert_eq!(evaluate(&Expr::field("nope"), &doc), None);
    }

    #[test]
    fn test_add_fields_project_sort_limit() {
        let docs = vec![
            json!({"_id": 1, "c": 1}),
            json!({"_id": 2, "c": 3}),
            json!({"_id": 3, "c": 2}),
        ];
        let pipeline = Pipeline::new()
            .matching(vec![FilterCondition::gte("c", json!(2))])
            .add_field("key", Expr::field("_id"))
            .project_out(&["_id"])
            .sort(vec![SortKey::desc("c")])
            .limit(1);

        assert_eq!(run(docs, &pipeline), vec![json!({"key": 2, "c": 3})]);
    }
}
