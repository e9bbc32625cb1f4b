//! 模型文件读写
//!
//! 在 [`crate::codec`] 的文本编解码外包一层文件 IO。

use crate::codec;
use crate::error::FileError;
use std::fs;
use std::path::Path;
use zframe_core::repository::Repository;

/// 模型文件扩展名
pub const EXTENSION: &str = "zfm";

/// 保存模型到文件
pub fn save(repo: &Repository, path: &Path) -> Result<(), FileError> {
    let text = codec::encode(repo);
    fs::write(path, &text)?;

    tracing::info!(
        "Saved {} entities, {} layers to {} ({} bytes)",
        repo.len(),
        repo.layers().len(),
        path.display(),
        text.len()
    );

    Ok(())
}

/// 从文件加载为新仓库
pub fn load(path: &Path) -> Result<Repository, FileError> {
    let mut repo = Repository::new();
    load_into(&mut repo, path)?;
    Ok(repo)
}

/// 从文件加载并替换仓库内容（失败时仓库不变）
pub fn load_into(repo: &mut Repository, path: &Path) -> Result<(), FileError> {
    let text = fs::read_to_string(path)?;
    codec::decode_into(repo, &text)?;

    tracing::info!(
        "Loaded {} nodes, {} members, {} planar elements, {} layers from {}",
        repo.node_count(),
        repo.member_count(),
        repo.planar_count(),
        repo.layers().len(),
        path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zframe_core::math::Point3;

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = std::env::temp_dir();
        let file_path = temp_dir.join(format!("test_model_{}.{EXTENSION}", std::process::id()));

        let mut repo = Repository::new();
        let a = repo.add_node(Point3::new(0.0, 0.0, 0.0));
        let b = repo.add_node(Point3::new(0.0, 0.0, 3.0));
        repo.add_column(a, b).expect("column");

        save(&repo, &file_path).expect("Failed to save");
        let loaded = load(&file_path).expect("Failed to load");

        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.member_count(), 1);

        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let file_path = std::env::temp_dir().join("zframe_does_not_exist.zfm");
        assert!(matches!(load(&file_path), Err(FileError::Io(_))));
    }
}
