use std::path::Path;

use anyhow::Result;
use reqwest::Client;

use jmdict_builder::builder::DictionaryBuilder;
use jmdict_builder::config::Config;
use jmdict_builder::fetch;

#[tokio::main]
async fn main() -> Result<()> {
    println!("🎌 JMdict 词典构建器");

    let config = Config::load()?;
    let gz_path = Path::new(&config.source.gz_file);
    let xml_path = Path::new(&config.source.xml_file);

    // 获取并解压源文件
    let client = Client::new();
    fetch::download(&client, &config.source.url, gz_path).await?;
    fetch::decompress(gz_path, xml_path)?;

    // 核心流水线：两遍解析 + 批量入库 + 建索引 + 压缩
    println!("🔨 构建 {}", config.database.db_file);
    let builder = DictionaryBuilder::new(config.clone()).await?;
    builder.build_from_xml(xml_path).await?;

    if config.source.keep_files {
        println!("🗂️  保留中间文件 {} 和 {}", gz_path.display(), xml_path.display());
    } else {
        println!("🧹 删除中间文件");
        fetch::cleanup(&[gz_path, xml_path])?;
    }

    println!("🎉 完成，{} 可以使用了", config.database.db_file);
    Ok(())
}
