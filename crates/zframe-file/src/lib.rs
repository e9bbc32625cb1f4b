//! ZFrame 文件格式处理
//!
//! 模型以标签记录树的文本形式保存：
//! - `record`: 标签树解析和写出
//! - `type_names`: 新旧两代记录类型名
//! - `codec`: 仓库与文本之间的两遍编解码
//! - `indent`: 输出缩进
//! - `native`: 文件读写

pub mod codec;
pub mod error;
pub mod indent;
pub mod native;
pub mod record;
pub mod type_names;

pub use codec::{decode, decode_into, encode};
pub use error::FileError;
pub use native::{load, load_into, save};
