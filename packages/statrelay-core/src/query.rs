//! 嵌套参数展开为方括号形式的 query 串，如 `a[b][0]=1`
//!
//! map 按 key 升序遍历，list 按下标遍历，输出顺序固定。

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use url::form_urlencoded;

/// 顶层参数表
pub type Params = BTreeMap<String, ParamValue>;

/// 叶子值
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => Ok(()),
        }
    }
}

/// 可任意嵌套的参数值
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(Scalar::Str(value))
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Scalar(Scalar::Int(value.into()))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Scalar(Scalar::Int(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Scalar(Scalar::Int(value.into()))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Scalar(Scalar::Bool(value))
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, ParamValue>> for ParamValue {
    fn from(entries: BTreeMap<String, ParamValue>) -> Self {
        ParamValue::Map(entries)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ParamValue::Scalar(Scalar::Null),
            Value::Bool(b) => b.into(),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.into(),
                // u64 beyond i64::MAX keeps its exact digits
                _ if n.is_u64() => ParamValue::Scalar(Scalar::Str(n.to_string())),
                (None, Some(f)) => f.into(),
                (None, None) => ParamValue::Scalar(Scalar::Str(n.to_string())),
            },
            Value::String(s) => s.into(),
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => ParamValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// 路径拼接为 `s0[s1][s2]...`，只有一段时不加括号
pub fn flat_key(path: &[String]) -> String {
    let mut segments = path.iter();
    let mut key = segments.next().cloned().unwrap_or_default();
    for segment in segments {
        key.push('[');
        key.push_str(segment);
        key.push(']');
    }
    key
}

#[derive(Default)]
struct FlatMap {
    pairs: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl FlatMap {
    fn insert(&mut self, key: String, value: String) {
        match self.positions.get(&key) {
            Some(&index) => self.pairs[index].1 = value,
            None => {
                self.positions.insert(key.clone(), self.pairs.len());
                self.pairs.push((key, value));
            }
        }
    }
}

fn visit(value: &ParamValue, path: &mut Vec<String>, out: &mut FlatMap) {
    match value {
        ParamValue::Scalar(scalar) => out.insert(flat_key(path), scalar.to_string()),
        ParamValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                visit(item, path, out);
                path.pop();
            }
        }
        ParamValue::Map(entries) => {
            for (key, item) in entries {
                path.push(key.clone());
                visit(item, path, out);
                path.pop();
            }
        }
    }
}

/// 按遍历顺序展开为不重复的 `(flat key, text)`，撞键时后者覆盖前者的值
pub fn flatten(params: &Params) -> Vec<(String, String)> {
    let mut out = FlatMap::default();
    let mut path = Vec::new();
    for (key, value) in params {
        path.push(key.clone());
        visit(value, &mut path, &mut out);
        path.pop();
    }
    out.pairs
}

/// 展开并按表单规则编码，如 `a%5Bb%5D=2&c=x+y`
pub fn encode(params: &Params) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(flatten(params))
        .finish()
}
