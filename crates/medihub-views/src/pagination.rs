//! 客户端分页

/// 默认每页条数
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// 总页数 `ceil(count / page_size)`，空列表也至少一页
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// 把页码限制在 `1..=total_pages` 内
pub fn clamp_page(page: usize, count: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(count, page_size))
}

/// 一页数据
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize, // 从1开始
    pub total_pages: usize,
    pub total: usize,
    pub start: usize, // 第一条的序号（从1开始），空页为0
    pub end: usize,
}

impl<T: Clone> Page<T> {
    /// 取第 `page` 页，页码越界时限制到有效范围
    pub fn of(items: &[T], page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total = items.len();
        let page = clamp_page(page, total, page_size);

        let offset = (page - 1) * page_size;
        let slice: Vec<T> = items.iter().skip(offset).take(page_size).cloned().collect();
        let (start, end) = if slice.is_empty() {
            (0, 0)
        } else {
            (offset + 1, offset + slice.len())
        };

        Self {
            items: slice,
            page,
            total_pages: total_pages(total, page_size),
            total,
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_items() {
        let items: Vec<u32> = (1..=23).collect();

        let first = Page::of(&items, 1, 10);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!((first.start, first.end), (1, 10));

        let last = Page::of(&items, 3, 10);
        assert_eq!(last.items, vec![21, 22, 23]);

        let clamped = Page::of(&items, 4, 10);
        assert_eq!(clamped.page, 3);
        assert_eq!(clamped.items.len(), 3);
    }

    #[test]
    fn test_page_zero_clamps_to_first() {
        let items: Vec<u32> = (1..=5).collect();
        let page = Page::of(&items, 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_empty_collection() {
        let page = Page::<u32>::of(&[], 2, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!((page.start, page.end), (0, 0));
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
    }
}
