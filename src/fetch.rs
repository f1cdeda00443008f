use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use reqwest::Client;

// 下载压缩的词典源文件，按块写盘，不把整个文件读进内存
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<()> {
    println!("⬇️  下载 {}", url);
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("下载失败: {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("下载失败 (状态码: {}): {}", response.status(), url);
    }
    let file = File::create(dest).with_context(|| format!("无法写入 {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    while let Some(chunk) = response.chunk().await? {
        writer
            .write_all(&chunk)
            .with_context(|| format!("无法写入 {}", dest.display()))?;
    }
    writer.flush().with_context(|| format!("无法写入 {}", dest.display()))?;
    Ok(())
}

// 解压 .gz 到 .xml
pub fn decompress(gz_path: &Path, xml_path: &Path) -> Result<()> {
    println!("📦 解压 {}", gz_path.display());
    let input = File::open(gz_path).with_context(|| format!("无法打开 {}", gz_path.display()))?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let output =
        File::create(xml_path).with_context(|| format!("无法创建 {}", xml_path.display()))?;
    let mut writer = BufWriter::new(output);
    io::copy(&mut decoder, &mut writer)
        .with_context(|| format!("解压失败: {}", gz_path.display()))?;
    Ok(())
}

// 构建成功后删除中间文件
pub fn cleanup(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("无法删除 {}", path.display()))?;
        }
    }
    Ok(())
}
