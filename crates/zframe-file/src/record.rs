//! 标签记录树
//!
//! 模型文件是一棵类 XML 的标签树：
//! ```text
//! <model>
//!   <record type="zframe.model.Node">
//!     <field name="id">0</field>
//!     <field name="position">0 0 0</field>
//!   </record>
//!   ...
//! </model>
//! ```
//!
//! 本模块只负责文本与树之间的转换，不关心记录含义。
//! 解析时跳过 `<?...?>` 声明和 `<!--...-->` 注释。
//! 写出时换行、制表符和首尾空格都转成字符引用，每个叶子标签总在一行内，
//! 重新缩进不会改动文本内容。

use crate::error::FileError;

/// 树节点
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// 文本内容（已反转义）。子节点之间的纯空白不计入
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// 获取属性值
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 按名称遍历子节点
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// 写出为文本行（不缩进，缩进由 [`crate::indent`] 处理）
    pub fn write_lines(&self, output: &mut Vec<String>) {
        let mut open = format!("<{}", self.name);
        for (key, value) in &self.attributes {
            open.push_str(&format!(" {}=\"{}\"", key, escape(value)));
        }

        if self.children.is_empty() {
            if self.text.is_empty() {
                output.push(format!("{open}/>"));
            } else {
                output.push(format!("{open}>{}</{}>", escape(&self.text), self.name));
            }
            return;
        }

        output.push(format!("{open}>"));
        for child in &self.children {
            child.write_lines(output);
        }
        output.push(format!("</{}>", self.name));
    }

    /// 写出为文本
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        self.write_lines(&mut lines);
        lines.join("\n")
    }
}

/// 解析文档，返回根节点
pub fn parse_document(text: &str) -> Result<Element, FileError> {
    let mut parser = TreeParser::new(text);
    parser.skip_misc();
    let root = parser.parse_element()?;
    parser.skip_misc();
    if !parser.at_end() {
        return Err(parser.error("Unexpected content after root element"));
    }
    Ok(root)
}

/// 标签树解析器
struct TreeParser<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> TreeParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.position..]
    }

    fn at_end(&self) -> bool {
        self.position >= self.text.len()
    }

    fn error(&self, message: impl Into<String>) -> FileError {
        let line = self.text[..self.position].matches('\n').count() + 1;
        FileError::Parse {
            line,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// 跳过空白、声明和注释
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("<?") {
                self.skip_past("?>");
            } else if self.rest().starts_with("<!--") {
                self.skip_past("-->");
            } else {
                break;
            }
        }
    }

    fn skip_past(&mut self, terminator: &str) {
        match self.rest().find(terminator) {
            Some(offset) => self.position += offset + terminator.len(),
            None => self.position = self.text.len(),
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), FileError> {
        if self.rest().starts_with(token) {
            self.position += token.len();
            Ok(())
        } else {
            Err(self.error(format!("Expected '{token}'")))
        }
    }

    fn read_name(&mut self) -> Result<String, FileError> {
        let rest = self.rest();
        let length = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(rest.len());
        if length == 0 {
            return Err(self.error("Expected a name"));
        }
        self.position += length;
        Ok(rest[..length].to_string())
    }

    fn read_attribute_value(&mut self) -> Result<String, FileError> {
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("Expected quoted attribute value")),
        };
        self.position += 1;
        let Some(end) = self.rest().find(quote) else {
            return Err(self.error("Unterminated attribute value"));
        };
        let raw = &self.rest()[..end];
        self.position += end + 1;
        Ok(unescape(raw))
    }

    fn parse_element(&mut self) -> Result<Element, FileError> {
        self.expect("<")?;
        let mut element = Element::new(self.read_name()?);

        // 属性
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.position += 2;
                return Ok(element);
            }
            if self.rest().starts_with('>') {
                self.position += 1;
                break;
            }
            if self.at_end() {
                return Err(self.error(format!("Unterminated tag <{}>", element.name)));
            }
            let key = self.read_name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let value = self.read_attribute_value()?;
            element.attributes.push((key, value));
        }

        // 内容
        let mut text = String::new();
        loop {
            let rest = self.rest();
            let Some(next_tag) = rest.find('<') else {
                return Err(self.error(format!("Missing closing tag </{}>", element.name)));
            };
            text.push_str(&rest[..next_tag]);
            self.position += next_tag;

            if self.rest().starts_with("</") {
                self.position += 2;
                let name = self.read_name()?;
                if name != element.name {
                    return Err(self.error(format!(
                        "Mismatched closing tag: expected </{}>, found </{}>",
                        element.name, name
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            } else if self.rest().starts_with("<!--") {
                self.skip_past("-->");
            } else {
                element.children.push(self.parse_element()?);
            }
        }

        if !text.trim().is_empty() {
            element.text = unescape(&text);
        }
        Ok(element)
    }
}

/// 转义文本中的特殊字符
pub fn escape(text: &str) -> String {
    // 首尾空格也要转义，否则读回时无法与格式空白区分
    let leading = text.len() - text.trim_start_matches(' ').len();
    let trailing = text.trim_end_matches(' ').len();

    let mut escaped = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            ' ' if i < leading || i >= trailing => escaped.push_str("&#32;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// 反转义，支持命名实体和 `&#NN;` / `&#xHH;` 字符引用。
/// 无法识别的 `&` 原样保留。
pub fn unescape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        rest = &rest[start..];
        let reference = rest
            .find(';')
            .and_then(|end| decode_reference(&rest[1..end]).map(|c| (c, end)));
        match reference {
            Some((c, end)) => {
                output.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                output.push('&');
                rest = &rest[1..];
            }
        }
    }
    output.push_str(rest);
    output
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
