use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::database::DatabaseManager;
use crate::models::AnnotationRecord;
use crate::parser::{AnnotationReader, EntryReader, extract_records};

pub struct DictionaryBuilder {
    db: DatabaseManager,
    config: Config,
}

impl DictionaryBuilder {
    pub async fn new(config: Config) -> Result<Self> {
        let db = DatabaseManager::new(&config).await?;
        Ok(DictionaryBuilder { db, config })
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    // 对同一份 XML 做两遍独立解析：第一遍展开实体引用写 words 表，
    // 第二遍不展开、取词性实体的字面名字写 annotations 表。
    // 第二遍必须等第一遍落盘（flush）之后才开始。
    pub async fn build_from_xml(&self, xml_path: &Path) -> Result<()> {
        self.db.reset_schema().await?;
        let batch_size = self.config.database.batch_size;

        println!("📖 第一遍解析: 读音、汉字与释义");
        let file = File::open(xml_path)
            .with_context(|| format!("无法打开 {}", xml_path.display()))?;
        let mut entries = EntryReader::new(BufReader::new(file));
        let mut writer = self.db.writer(batch_size);
        let mut entry_count: u64 = 0;
        let mut word_count: u64 = 0;
        while let Some(entry) = entries.next_entry()? {
            for record in extract_records(&entry) {
                writer.insert_word(&record).await?;
                word_count += 1;
            }
            writer.entry_done().await?;
            entry_count += 1;
        }
        writer.flush().await?;
        println!(
            "   {} 个词条，{} 条记录，{} 次提交",
            entry_count,
            word_count,
            writer.commit_count()
        );
        self.db.create_word_indexes().await?;

        println!("🏷️  第二遍解析: 词性标注");
        let file = File::open(xml_path)
            .with_context(|| format!("无法打开 {}", xml_path.display()))?;
        let mut annotations = AnnotationReader::new(BufReader::new(file));
        let mut writer = self.db.writer(batch_size);
        let mut tag_count: u64 = 0;
        while let Some((entry_id, tags)) = annotations.next_entry()? {
            for tag in tags {
                writer
                    .insert_annotation(&AnnotationRecord { entry_id, tag })
                    .await?;
                tag_count += 1;
            }
            writer.entry_done().await?;
        }
        writer.flush().await?;
        println!("   {} 条词性标注", tag_count);
        self.db.create_annotation_index().await?;

        self.db.vacuum().await?;
        Ok(())
    }
}
