//! 客户端搜索
//!
//! 在已加载的列表上过滤，不重新查询服务。

use medihub_core::Patient;

/// 可被搜索的视图模型
pub trait Searchable {
    /// 参与匹配的字段
    fn search_fields(&self) -> Vec<String>;

    /// 不区分大小写的子串匹配，空搜索词匹配全部
    fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

impl Searchable for Patient {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.id.to_string(),
            self.assigned_doctor.clone(),
            self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
        ]
    }
}

/// 过滤出匹配的条目
pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|item| item.matches(term)).collect()
}
