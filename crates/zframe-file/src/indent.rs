//! 重新缩进
//!
//! 按标签嵌套深度把每行缩进两个空格。只看每行的开头和结尾，
//! 无法识别的行保持当前深度原样输出。

/// 每层缩进
const INDENT: &str = "  ";

/// 重新缩进标签文本
pub fn reindent(text: &str) -> String {
    let mut depth = 0usize;
    let mut output = String::with_capacity(text.len() + text.len() / 4);

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("</") {
            depth = depth.saturating_sub(1);
        }
        for _ in 0..depth {
            output.push_str(INDENT);
        }
        output.push_str(line);
        output.push('\n');

        if opens_block(line) {
            depth += 1;
        }
    }

    output
}

/// 该行是否打开了一个未在同一行关闭的标签
fn opens_block(line: &str) -> bool {
    line.starts_with('<')
        && !line.starts_with("</")
        && !line.starts_with("<?")
        && !line.starts_with("<!")
        && !line.ends_with("/>")
        && !line.contains("</")
}
