// ==========================================
// 铁路车皮配载系统 - 导入层
// ==========================================
// 职责: 订单文件 → 原始行记录
// 红线: 不做字段校验,不落默认值
// ==========================================

pub mod error;
pub mod file_parser;

pub use error::{ImportError, ImportResult};
pub use file_parser::{parse_order_file, CsvParser, FileParser, JsonParser};
