//! 记录存储接口
//!
//! 远程存储是一个通用的记录增删改查服务，按集合名访问。服务层只依赖这里定义的
//! 查询条件和响应信封，具体实现可以是远程HTTP存储，也可以是内存模拟存储。

use async_trait::async_trait;
use medihub_core::{MediHubError, RecordId, Result};
use medihub_records::ExternalRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 记录存储接口
///
/// 方法返回 `Err` 仅表示传输层失败；业务失败通过响应信封中的 `success` 表达。
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 存储名称，用于日志
    fn name(&self) -> &str;

    /// 按条件查询记录
    async fn fetch(&self, collection: &str, query: &FetchQuery) -> Result<FetchResponse>;

    /// 按ID获取单条记录
    async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<RecordResponse>;

    /// 批量创建
    async fn create(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse>;

    /// 批量更新，每条记录必须带 `Id`，其余字段浅合并到已有记录
    async fn update(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse>;

    /// 批量删除
    async fn delete(&self, collection: &str, ids: Vec<RecordId>) -> Result<BatchResponse>;
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    Contains,
    GreaterThan,
    LessThan,
}

/// 查询条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.to_string(),
            operator,
            values: vec![value.into()],
        }
    }

    pub fn equal_to(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, value)
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// 排序字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

/// 分页信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub limit: usize,
    pub offset: usize,
}

/// 字段选择
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// 查询参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSelector>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub where_clauses: Vec<Condition>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl FetchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields
            .iter()
            .map(|name| FieldSelector {
                field: FieldName {
                    name: name.to_string(),
                },
            })
            .collect();
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_clauses.push(condition);
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field_name: field.to_string(),
            direction,
        });
        self
    }

    pub fn paging(mut self, limit: usize, offset: usize) -> Self {
        self.paging = Some(Paging { limit, offset });
        self
    }
}

/// 查询响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<ExternalRecord>>,
}

impl FetchResponse {
    pub fn ok(data: Vec<ExternalRecord>) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// 检查信封并取出记录，`success: false` 视为传输错误
    pub fn into_records(self, action: &str) -> Result<Vec<ExternalRecord>> {
        if !self.success {
            return Err(MediHubError::Transport(failure_message(self.message, action)));
        }
        Ok(self.data.unwrap_or_default())
    }
}

/// 单条记录响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ExternalRecord>,
}

impl RecordResponse {
    pub fn found(record: ExternalRecord) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(record),
        }
    }

    pub fn missing() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    /// 取出记录；成功但无数据时返回 `NotFound`
    pub fn into_record(self, action: &str, not_found: &str) -> Result<ExternalRecord> {
        if !self.success {
            return Err(MediHubError::Transport(failure_message(self.message, action)));
        }
        self.data
            .ok_or_else(|| MediHubError::NotFound(not_found.to_string()))
    }
}

/// 批量写入中单条记录的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    /// 失败原因代码，404 表示记录不存在
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ExternalRecord>,
}

impl RecordResult {
    pub fn ok(record: ExternalRecord) -> Self {
        Self {
            success: true,
            data: Some(record),
            ..Default::default()
        }
    }

    pub fn failed(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            message: Some(message.into()),
            data: None,
        }
    }
}

/// 批量写入响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<RecordResult>>,
}

impl BatchResponse {
    pub fn ok(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            message: None,
            results: Some(results),
        }
    }

    pub fn results(&self) -> &[RecordResult] {
        self.results.as_deref().unwrap_or(&[])
    }

    /// 第一条失败的记录
    pub fn first_failure(&self) -> Option<&RecordResult> {
        self.results().iter().find(|r| !r.success)
    }

    /// 检查批量结果
    ///
    /// 只要有一条失败就整体失败，即使其他记录已经成功。返回成功记录的数据。
    pub fn into_records(self, action: &str) -> Result<Vec<ExternalRecord>> {
        if !self.success {
            return Err(MediHubError::Transport(failure_message(
                self.message.clone(),
                action,
            )));
        }

        if let Some(failed) = self.first_failure() {
            let message = failure_message(failed.message.clone(), action);
            return Err(match failed.code {
                Some(404) => MediHubError::NotFound(message),
                _ => MediHubError::Validation(message),
            });
        }

        Ok(self
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| r.data)
            .collect())
    }

    /// 检查批量结果并取出第一条成功记录
    pub fn into_first_record(self, action: &str) -> Result<ExternalRecord> {
        self.into_records(action)?
            .into_iter()
            .next()
            .ok_or_else(|| MediHubError::Transport("No valid response from server".to_string()))
    }
}

fn failure_message(message: Option<String>, action: &str) -> String {
    match message {
        Some(msg) if !msg.trim().is_empty() => msg,
        _ => format!("Failed to {}", action),
    }
}
