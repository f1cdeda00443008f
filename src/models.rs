// 数据结构定义

// 保留的释义语言，闭合枚举：不在此列表中的语言直接丢弃
pub const RETAINED_LANGS: [GlossLang; 2] = [GlossLang::English, GlossLang::German];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossLang {
    English,
    German,
}

impl GlossLang {
    pub fn from_code(code: &str) -> Option<GlossLang> {
        match code {
            "eng" => Some(GlossLang::English),
            "ger" => Some(GlossLang::German),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GlossLang::English => "eng",
            GlossLang::German => "ger",
        }
    }
}

// words 表的 category 列：R 读音、K 汉字、语言代码为释义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Reading,
    Kanji,
    Gloss(GlossLang),
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Reading => "R",
            Category::Kanji => "K",
            Category::Gloss(lang) => lang.code(),
        }
    }
}

// 待写入 words 表的一条记录（代理主键由数据库生成）
#[derive(Debug, Clone)]
pub struct WordRecord {
    pub entry_id: i64,
    pub display_form: String,
    pub search_form: String,
    pub category: Category,
    pub priority: i64,
}

// 待写入 annotations 表的一条记录
#[derive(Debug, Clone)]
pub struct AnnotationRecord {
    pub entry_id: i64,
    pub tag: String,
}

// 从数据库读出的行
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WordRow {
    pub id: i64,
    pub entry_id: i64,
    pub display_form: String,
    pub search_form: String,
    pub category: String,
    pub priority: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnnotationRow {
    pub id: i64,
    pub entry_id: i64,
    pub tag: String,
}

// 第一遍解析出的原始词条
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub entry_id: i64,
    pub readings: Vec<WordForm>,
    pub kanji: Vec<WordForm>,
    pub glosses: Vec<GlossText>,
}

// 一个读音或汉字形，带各自的使用频度标记
#[derive(Debug, Clone, Default)]
pub struct WordForm {
    pub text: String,
    pub priority_markers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GlossText {
    pub text: String,
    pub lang: String,
}
