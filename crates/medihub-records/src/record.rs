//! 外部记录
//!
//! 远程存储中的记录是扁平的字段表，业务字段带 `_c` 后缀，`Id` 由存储分配。
//! 读取时对缺失和格式不符的字段一律返回默认值，从不报错。

use medihub_core::{utils, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 主键字段名
pub const ID_FIELD: &str = "Id";

/// 外部记录存储中的集合名
pub mod collections {
    pub const PATIENT: &str = "patient_c";
    pub const ACTIVITY: &str = "activity_c";
    pub const MEDICAL_RECORD: &str = "medical_record_c";
    pub const METRIC: &str = "metric_c";
}

/// 扁平外部记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalRecord(Map<String, Value>);

impl ExternalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录ID，兼容数字和数字字符串
    pub fn id(&self) -> Option<RecordId> {
        self.int(ID_FIELD)
    }

    pub fn set_id(&mut self, id: RecordId) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// 字符串字段，数字会被转换成文本
    pub fn string(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    /// 可选字符串字段，空白视为缺失
    pub fn opt_string(&self, field: &str) -> Option<String> {
        let value = self.string(field);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// 非负整数字段，缺失或非法时为 0
    pub fn count(&self, field: &str) -> u32 {
        self.int(field)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }

    pub fn float(&self, field: &str) -> f64 {
        match self.get(field) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// 关联字段：可以是整数ID，也可以是 `{"Id": n, "Name": ...}` 形式的对象
    pub fn lookup_id(&self, field: &str) -> Option<RecordId> {
        match self.get(field)? {
            Value::Object(obj) => match obj.get(ID_FIELD)? {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            },
            _ => self.int(field),
        }
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.opt_string(field).and_then(|s| utils::parse_timestamp(&s))
    }

    /// 逗号分隔的列表字段
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(Value::String(s)) => utils::split_list(s),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// 仅在有值时写入
    pub fn set_opt<V: Into<Value>>(&mut self, field: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(field, value);
        }
    }

    /// 浅合并：`other` 中的每个字段覆盖当前字段，`Id` 除外
    pub fn merge_from(&mut self, other: &ExternalRecord) {
        for (key, value) in other.0.iter() {
            if key != ID_FIELD {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ExternalRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ExternalRecord {
    type Error = medihub_core::MediHubError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(medihub_core::MediHubError::Internal(format!(
                "Expected a record object, got {}",
                other
            ))),
        }
    }
}
