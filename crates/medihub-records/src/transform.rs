//! 记录转换接口

use crate::record::ExternalRecord;

/// 外部记录 -> 视图模型
///
/// 实现必须容忍缺失和格式错误的字段，永不失败。
pub trait FromExternal: Sized {
    fn from_external(record: &ExternalRecord) -> Self;
}

/// 视图模型 -> 外部记录
pub trait ToExternal {
    fn to_external(&self) -> ExternalRecord;
}

/// 转换为视图模型
pub fn to_view<T: FromExternal>(record: &ExternalRecord) -> T {
    T::from_external(record)
}

/// 转换为外部记录
pub fn to_external<T: ToExternal + ?Sized>(value: &T) -> ExternalRecord {
    value.to_external()
}

/// 批量转换
pub fn to_views<T: FromExternal>(records: &[ExternalRecord]) -> Vec<T> {
    records.iter().map(T::from_external).collect()
}
