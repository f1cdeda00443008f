use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Category, GlossLang};

lazy_static! {
    // 括号备注：可带一个前导空格的、非嵌套的 (...) 片段
    static ref BRACKET_REMARK: Regex = Regex::new(r" ?\([^)]+\)").unwrap();
}

// 去掉所有括号备注，其余字符原样保留
pub fn remove_brackets(text: &str) -> String {
    BRACKET_REMARK.replace_all(text, "").into_owned()
}

// 去掉英语释义开头的不定式标记 "to "，没有时原样返回
pub fn remove_infinitive_to(text: &str) -> String {
    text.strip_prefix("to ").unwrap_or(text).to_string()
}

// 由展示形式计算检索形式：先去括号备注，英语释义再去不定式标记
pub fn search_form(display: &str, category: &Category) -> String {
    let stripped = remove_brackets(display);
    match category {
        Category::Gloss(GlossLang::English) => remove_infinitive_to(&stripped),
        _ => stripped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_remark() {
        assert_eq!(remove_brackets("dog (animal)"), "dog");
    }

    #[test]
    fn strips_each_remark_and_preceding_space() {
        assert_eq!(remove_brackets("(colloq) woof (bark)"), " woof");
        assert_eq!(remove_brackets("ああ (全く)"), "ああ");
    }

    #[test]
    fn keeps_text_without_remarks() {
        assert_eq!(remove_brackets("いぬ"), "いぬ");
        assert_eq!(remove_brackets("no brackets here"), "no brackets here");
    }

    #[test]
    fn remove_brackets_is_idempotent() {
        let once = remove_brackets("dog (animal) (pet)");
        assert_eq!(remove_brackets(&once), once);
    }

    #[test]
    fn strips_infinitive_prefix() {
        assert_eq!(remove_infinitive_to("to run"), "run");
        assert_eq!(remove_infinitive_to("run"), "run");
    }

    #[test]
    fn infinitive_prefix_needs_the_space() {
        assert_eq!(remove_infinitive_to("together"), "together");
        assert_eq!(remove_infinitive_to("to"), "to");
    }

    #[test]
    fn english_gloss_gets_both_steps_in_order() {
        let category = Category::Gloss(GlossLang::English);
        assert_eq!(search_form("to bark (at)", &category), "bark");
        assert_eq!(search_form("to occur", &category), "occur");
    }

    #[test]
    fn non_english_categories_keep_infinitive_prefix() {
        assert_eq!(
            search_form("to halten (Hund)", &Category::Gloss(GlossLang::German)),
            "to halten"
        );
        assert_eq!(search_form("いぬ (犬)", &Category::Reading), "いぬ");
        assert_eq!(search_form("犬", &Category::Kanji), "犬");
    }
}
