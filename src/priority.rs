// 常用词标记表：新闻高频 (news1)、核心词汇 (ichi1)、专业常用 (spec1/spec2)、
// 常见外来语 (gai1)。不在表中的标记一律视为非常用。
pub const PRIORITY_TAGS: [&str; 5] = ["news1", "ichi1", "spec1", "spec2", "gai1"];

// 一个词形是否常用：标记集合与 PRIORITY_TAGS 有交集则为 1，否则为 0
pub fn priority_flag(markers: &[String]) -> i64 {
    if markers.iter().any(|m| PRIORITY_TAGS.contains(&m.as_str())) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn known_marker_sets_the_flag() {
        assert_eq!(priority_flag(&markers(&["news1"])), 1);
        assert_eq!(priority_flag(&markers(&["gai1"])), 1);
    }

    #[test]
    fn empty_set_is_not_frequent() {
        assert_eq!(priority_flag(&[]), 0);
    }

    #[test]
    fn unknown_markers_are_ignored() {
        assert_eq!(priority_flag(&markers(&["obscure-tag"])), 0);
        assert_eq!(priority_flag(&markers(&["nf17", "news2"])), 0);
    }

    #[test]
    fn one_known_marker_among_unknown_is_enough() {
        assert_eq!(priority_flag(&markers(&["nf17", "ichi1"])), 1);
    }
}
