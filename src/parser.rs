use std::collections::HashMap;
use std::io::BufRead;

use anyhow::{Context, Result, bail};
use lazy_static::lazy_static;
use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};
use regex::Regex;

use crate::models::{Category, GlossLang, GlossText, RawEntry, WordRecord, WordForm};
use crate::normalize;
use crate::priority;

lazy_static! {
    // DOCTYPE 内部子集里的 <!ENTITY name "expansion"> 声明
    static ref ENTITY_DEF: Regex = Regex::new(r#"<!ENTITY\s+(\S+)\s+"([^"]*)""#).unwrap();
}

// 从 DTD 文本提取实体表
pub fn parse_entity_table(dtd: &str) -> HashMap<String, String> {
    ENTITY_DEF
        .captures_iter(dtd)
        .map(|cap| (cap[1].to_string(), cap[2].to_string()))
        .collect()
}

// 展开解析：自定义实体替换为 DTD 中声明的展开文本
fn expanded_text(text: &BytesText, entities: &HashMap<String, String>) -> Result<String> {
    let resolved = text
        .unescape_with(|name| entities.get(name).map(String::as_str))
        .context("无法解码文本节点")?;
    Ok(resolved.into_owned())
}

// 不展开解析：自定义实体替换为它自己的名字，&v5r; 变成 v5r
fn literal_text(text: &BytesText, entities: &HashMap<String, String>) -> Result<String> {
    let resolved = text
        .unescape_with(|name| entities.get_key_value(name).map(|(k, _)| k.as_str()))
        .context("无法解码文本节点")?;
    Ok(resolved.into_owned())
}

// 当前落在哪个带文本的元素里
#[derive(Clone, Copy, PartialEq)]
enum TextSlot {
    None,
    EntSeq,
    FormText,
    PriMarker,
    Gloss,
    Pos,
}

// 第一遍：展开实体引用，逐个产出词条的读音、汉字与释义
pub struct EntryReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entities: HashMap<String, String>,
}

impl<R: BufRead> EntryReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        EntryReader {
            reader,
            buf: Vec::new(),
            entities: HashMap::new(),
        }
    }

    pub fn next_entry(&mut self) -> Result<Option<RawEntry>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::DocType(t) => {
                    self.entities = parse_entity_table(&String::from_utf8_lossy(&t));
                }
                Event::Start(e) if e.name().as_ref() == b"entry" => {
                    return self.read_entry().map(Some);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn read_entry(&mut self) -> Result<RawEntry> {
        let mut seq: i64 = 0;
        let mut readings = Vec::new();
        let mut kanji = Vec::new();
        let mut glosses = Vec::new();
        let mut current_form: Option<WordForm> = None;
        let mut gloss_lang = String::new();
        let mut slot = TextSlot::None;
        let mut pending: Option<String> = None;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"ent_seq" => slot = TextSlot::EntSeq,
                    b"r_ele" | b"k_ele" => current_form = Some(WordForm::default()),
                    b"reb" | b"keb" => slot = TextSlot::FormText,
                    b"re_pri" | b"ke_pri" => slot = TextSlot::PriMarker,
                    b"gloss" => {
                        gloss_lang = match e.try_get_attribute("xml:lang")? {
                            Some(attr) => attr.unescape_value()?.into_owned(),
                            // DTD 把 xml:lang 的默认值定为 eng
                            None => "eng".to_string(),
                        };
                        slot = TextSlot::Gloss;
                    }
                    _ => {}
                },
                Event::Text(t) => {
                    if slot != TextSlot::None {
                        let text = expanded_text(&t, &self.entities)?;
                        pending.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"entry" => break,
                    b"ent_seq" => {
                        let text = pending.take().context("词条缺少 ent_seq 文本")?;
                        seq = text
                            .trim()
                            .parse()
                            .with_context(|| format!("ent_seq 不是数字: {}", text))?;
                        slot = TextSlot::None;
                    }
                    b"reb" | b"keb" => {
                        let text = pending
                            .take()
                            .with_context(|| format!("词条 {} 的词形缺少文本", seq))?;
                        if let Some(form) = current_form.as_mut() {
                            form.text = text;
                        }
                        slot = TextSlot::None;
                    }
                    b"re_pri" | b"ke_pri" => {
                        if let (Some(form), Some(marker)) = (current_form.as_mut(), pending.take())
                        {
                            form.priority_markers.push(marker);
                        }
                        slot = TextSlot::None;
                    }
                    b"r_ele" | b"k_ele" => {
                        let form = current_form
                            .take()
                            .with_context(|| format!("词条 {} 的词形元素不完整", seq))?;
                        if form.text.is_empty() {
                            bail!("词条 {} 的词形缺少文本", seq);
                        }
                        if e.name().as_ref() == b"r_ele" {
                            readings.push(form);
                        } else {
                            kanji.push(form);
                        }
                    }
                    b"gloss" => {
                        let text = pending
                            .take()
                            .with_context(|| format!("词条 {} 的释义缺少文本", seq))?;
                        glosses.push(GlossText {
                            text,
                            lang: std::mem::take(&mut gloss_lang),
                        });
                        slot = TextSlot::None;
                    }
                    _ => {}
                },
                Event::Eof => bail!("文件在 entry 结束前截断"),
                _ => {}
            }
        }

        if seq == 0 {
            bail!("词条缺少 ent_seq");
        }
        Ok(RawEntry {
            entry_id: seq,
            readings,
            kanji,
            glosses,
        })
    }
}

// 第二遍：不展开实体引用，逐个产出词条的词性标注字面量
pub struct AnnotationReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entities: HashMap<String, String>,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        AnnotationReader {
            reader,
            buf: Vec::new(),
            entities: HashMap::new(),
        }
    }

    pub fn next_entry(&mut self) -> Result<Option<(i64, Vec<String>)>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::DocType(t) => {
                    self.entities = parse_entity_table(&String::from_utf8_lossy(&t));
                }
                Event::Start(e) if e.name().as_ref() == b"entry" => {
                    return self.read_entry().map(Some);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn read_entry(&mut self) -> Result<(i64, Vec<String>)> {
        let mut seq: i64 = 0;
        let mut tags = Vec::new();
        let mut slot = TextSlot::None;
        let mut pending: Option<String> = None;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"ent_seq" => slot = TextSlot::EntSeq,
                    b"pos" => slot = TextSlot::Pos,
                    _ => {}
                },
                Event::Text(t) => match slot {
                    TextSlot::EntSeq => {
                        let text = expanded_text(&t, &self.entities)?;
                        pending.get_or_insert_with(String::new).push_str(&text);
                    }
                    TextSlot::Pos => {
                        let text = literal_text(&t, &self.entities)?;
                        pending.get_or_insert_with(String::new).push_str(&text);
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"entry" => break,
                    b"ent_seq" => {
                        let text = pending.take().context("词条缺少 ent_seq 文本")?;
                        seq = text
                            .trim()
                            .parse()
                            .with_context(|| format!("ent_seq 不是数字: {}", text))?;
                        slot = TextSlot::None;
                    }
                    b"pos" => {
                        if let Some(tag) = pending.take() {
                            tags.push(tag.trim().to_string());
                        }
                        slot = TextSlot::None;
                    }
                    _ => {}
                },
                Event::Eof => bail!("文件在 entry 结束前截断"),
                _ => {}
            }
        }

        if seq == 0 {
            bail!("词条缺少 ent_seq");
        }
        Ok((seq, tags))
    }
}

// 把一个原始词条展开成 words 表记录：
// 每个读音、每个汉字形各一条，保留语言内的每条释义各一条
pub fn extract_records(entry: &RawEntry) -> Vec<WordRecord> {
    let mut records = Vec::new();
    for reading in &entry.readings {
        records.push(WordRecord {
            entry_id: entry.entry_id,
            display_form: reading.text.clone(),
            search_form: normalize::search_form(&reading.text, &Category::Reading),
            category: Category::Reading,
            priority: priority::priority_flag(&reading.priority_markers),
        });
    }
    for kanji in &entry.kanji {
        records.push(WordRecord {
            entry_id: entry.entry_id,
            display_form: kanji.text.clone(),
            search_form: normalize::search_form(&kanji.text, &Category::Kanji),
            category: Category::Kanji,
            priority: priority::priority_flag(&kanji.priority_markers),
        });
    }
    for gloss in &entry.glosses {
        // 不在保留语言表中的释义直接丢弃
        if let Some(lang) = GlossLang::from_code(&gloss.lang) {
            let category = Category::Gloss(lang);
            records.push(WordRecord {
                entry_id: entry.entry_id,
                display_form: gloss.text.clone(),
                search_form: normalize::search_form(&gloss.text, &category),
                category,
                priority: 0,
            });
        }
    }
    records
}
