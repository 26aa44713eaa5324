// ==========================================
// 铁路车皮配载系统 - 订单文件解析器
// ==========================================
// 支持: JSON (.json) / CSV (.csv)
// 输出: serde_json::Value (原始行记录,字段校验交给资源模型构建器)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::fs::File;
use std::path::Path;
use tracing::debug;

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser {
    /// 解析文件为原始行记录
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Value>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Value> {
        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行（值一律保留为字符串,空值不写入）
        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row = Map::new();

            for (col_idx, value) in record.iter().enumerate() {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(header) = headers.get(col_idx) {
                    row.insert(header.clone(), Value::String(trimmed.to_string()));
                }
            }

            // 跳过完全空白的行
            if row.is_empty() {
                continue;
            }

            records.push(Value::Object(row));
        }

        debug!(path = %file_path.display(), rows = records.len(), "CSV 解析完成");
        Ok(Value::Array(records))
    }
}

// ==========================================
// JSON Parser 实现
// ==========================================
pub struct JsonParser;

impl FileParser for JsonParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Value> {
        let file = File::open(file_path)?;
        let value: Value = serde_json::from_reader(std::io::BufReader::new(file))?;

        // 允许 {"orders": [...]} 包装格式
        let value = match value {
            Value::Object(mut obj) if obj.contains_key("orders") => {
                obj.remove("orders").unwrap_or(Value::Null)
            }
            other => other,
        };

        debug!(path = %file_path.display(), "JSON 解析完成");
        Ok(value)
    }
}

// ==========================================
// 按扩展名分派
// ==========================================

/// 解析订单文件
///
/// # 返回
/// - Ok(Value): 原始记录（通常为数组,形状校验由资源模型构建器负责）
/// - Err: 文件不存在/格式不支持/解析失败
pub fn parse_order_file(file_path: &Path) -> ImportResult<Value> {
    if !file_path.exists() {
        return Err(ImportError::FileNotFound(file_path.display().to_string()));
    }

    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => CsvParser.parse_to_raw_records(file_path),
        "json" => JsonParser.parse_to_raw_records(file_path),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}
