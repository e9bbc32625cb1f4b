//! 模型编解码
//!
//! 每个实体和图层写成一条记录，记录里是有序的 `名称 -> 文本` 字段。
//! 实体字段的读写由 [`Entity::save`] / [`Entity::load`] 完成，
//! 本模块只负责节点引用的编号转换和两遍解码。
//!
//! 解码分两遍：
//! 1. 收集所有节点和图层，按文件中的编号建立映射
//! 2. 解析构件和面构件的节点引用
//!
//! 构件端点缺失时整个解码失败；面构件引用缺失时只跳过该面构件。

use crate::error::FileError;
use crate::indent::reindent;
use crate::record::{parse_document, Element};
use crate::type_names::{lookup, type_name, RecordKind};
use std::collections::HashMap;
use zframe_core::entity::{
    Entity, EntityId, EntityKind, EntityType, Family, Node, Planar,
};
use zframe_core::layer::Layer;
use zframe_core::math::Point3;
use zframe_core::repository::Repository;

const ROOT: &str = "model";
const RECORD: &str = "record";
const FIELD: &str = "field";
const TYPE: &str = "type";
const NAME: &str = "name";

/// 编码为文本
pub fn encode(repo: &Repository) -> String {
    let mut root = Element::new(ROOT);

    for layer in repo.layers().layers() {
        let mut record = record_element(RecordKind::Layer);
        record.children.push(field(NAME, layer.name.clone()));
        record
            .children
            .push(field("elevation", layer.elevation.to_string()));
        root.children.push(record);
    }

    let number_of = |node: EntityId| repo.number(node).unwrap_or(0);
    for (_, entity) in repo.iter() {
        let mut record = record_element(RecordKind::Entity(entity.entity_type()));
        entity.save(&number_of, &mut |key: &str, value: String| {
            record.children.push(field(key, value))
        });
        root.children.push(record);
    }

    reindent(&root.to_text())
}

fn record_element(kind: RecordKind) -> Element {
    Element::new(RECORD).with_attribute(TYPE, type_name(kind))
}

fn field(key: &str, value: String) -> Element {
    Element::new(FIELD).with_attribute(NAME, key).with_text(value)
}

/// 解码为新仓库
pub fn decode(text: &str) -> Result<Repository, FileError> {
    let mut repo = Repository::new();
    decode_into(&mut repo, text)?;
    Ok(repo)
}

/// 解码并整体替换仓库内容
///
/// 失败时仓库保持不变。
pub fn decode_into(repo: &mut Repository, text: &str) -> Result<(), FileError> {
    let staged = decode_staged(text)?;
    repo.bulk_install(staged);
    Ok(())
}

/// 解码出的一条记录
struct Record<'a> {
    type_name: &'a str,
    /// 在文件中的位置（没有 id 字段时用于报错）
    index: usize,
    fields: HashMap<&'a str, &'a str>,
}

impl<'a> Record<'a> {
    fn from_element(index: usize, element: &'a Element) -> Option<Self> {
        let type_name = element.attribute(TYPE)?;
        let fields = element
            .children_named(FIELD)
            .filter_map(|f| f.attribute(NAME).map(|name| (name, f.text.as_str())))
            .collect();
        Some(Self {
            type_name,
            index,
            fields,
        })
    }

    fn get(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(|v| v.to_string())
    }

    fn parse_usize(&self, key: &str) -> Option<usize> {
        self.fields.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// 文件中的编号
    fn id(&self) -> Option<usize> {
        self.parse_usize("id")
    }

    fn selected(&self) -> bool {
        self.fields.get("selected").is_some_and(|v| v.trim() == "true")
    }

    /// 面构件节点编号列表
    ///
    /// 有 `node_count` 时按数量读取，否则读到第一个缺失的 `node_i` 为止。
    fn planar_node_numbers(&self) -> Vec<Option<usize>> {
        match self.parse_usize("node_count") {
            Some(count) => (0..count)
                .map(|i| self.parse_usize(&format!("node_{i}")))
                .collect(),
            None => (0..)
                .map(|i| self.parse_usize(&format!("node_{i}")))
                .take_while(Option::is_some)
                .collect(),
        }
    }

    /// 读入可编辑字段和选择状态
    fn fill(&self, entity: &mut Entity) -> Result<(), FileError> {
        entity.selected = self.selected();
        entity.load(&|key: &str| self.get(key))?;
        Ok(())
    }
}

fn decode_staged(text: &str) -> Result<Repository, FileError> {
    let root = parse_document(text)?;
    if root.name != ROOT {
        return Err(FileError::InvalidFormat(format!(
            "Expected <{ROOT}> root element, found <{}>",
            root.name
        )));
    }

    let records: Vec<Record> = root
        .children_named(RECORD)
        .enumerate()
        .filter_map(|(index, element)| {
            let record = Record::from_element(index, element);
            if record.is_none() {
                tracing::warn!("Skipping record {} without a type attribute", index);
            }
            record
        })
        .collect();

    let mut staged = Repository::staging();
    let mut nodes: HashMap<usize, EntityId> = HashMap::new();

    // 第一遍：节点和图层
    for record in &records {
        match lookup(record.type_name) {
            Some(RecordKind::Entity(EntityType::Node)) => {
                let number = record.id().ok_or_else(|| {
                    FileError::InvalidFormat(format!("Node record {} has no id", record.index))
                })?;
                if nodes.contains_key(&number) {
                    tracing::warn!(
                        "Skipping node record {}: duplicate node id {}, first record kept",
                        record.index,
                        number
                    );
                    continue;
                }
                let mut entity = Entity::new(EntityKind::Node(Node::new(Point3::origin())));
                record.fill(&mut entity)?;
                let id = staged.add(entity)?;
                nodes.insert(number, id);
            }
            Some(RecordKind::Layer) => decode_layer(&mut staged, record),
            Some(RecordKind::Discarded) => {
                tracing::debug!("Discarding obsolete {} record", record.type_name);
            }
            Some(RecordKind::Entity(_)) => {}
            None => {
                tracing::warn!("Skipping record of unknown type '{}'", record.type_name);
            }
        }
    }

    // 第二遍：构件和面构件
    for record in &records {
        let Some(RecordKind::Entity(entity_type)) = lookup(record.type_name) else {
            continue;
        };
        match entity_type.family() {
            Family::Node => {}
            Family::Member => decode_member(&mut staged, &nodes, record, entity_type)?,
            Family::Planar => decode_planar(&mut staged, &nodes, record, entity_type)?,
        }
    }

    tracing::debug!(
        "Decoded {} records into {} entities",
        records.len(),
        staged.len()
    );

    Ok(staged)
}

fn decode_layer(staged: &mut Repository, record: &Record) {
    let name = record.get(NAME).unwrap_or_default();
    let Some(elevation) = record
        .get("elevation")
        .and_then(|v| v.trim().parse::<f64>().ok())
    else {
        tracing::warn!("Skipping layer '{}' without a valid elevation", name);
        return;
    };
    if let Err(e) = staged.add_layer(Layer::new(name, elevation)) {
        tracing::warn!("Skipping layer record {}: {}", record.index, e);
    }
}

fn decode_member(
    staged: &mut Repository,
    nodes: &HashMap<usize, EntityId>,
    record: &Record,
    entity_type: EntityType,
) -> Result<(), FileError> {
    let resolve = |key: &str| -> Result<EntityId, FileError> {
        let number = record.parse_usize(key).ok_or_else(|| {
            FileError::InvalidFormat(format!(
                "{} record {} has no valid '{}' field",
                entity_type.name(),
                record.index,
                key
            ))
        })?;
        nodes.get(&number).copied().ok_or(FileError::MissingNode {
            kind: entity_type.name(),
            record: record.id().unwrap_or(record.index),
            node: number,
        })
    };
    let a = resolve("end_a")?;
    let b = resolve("end_b")?;

    let member = staged.canonical_member(a, b)?;
    let kind = match entity_type {
        EntityType::Column => EntityKind::Column(member),
        _ => EntityKind::Beam(member),
    };
    let mut entity = Entity::new(kind);
    record.fill(&mut entity)?;
    staged.add(entity)?;
    Ok(())
}

fn decode_planar(
    staged: &mut Repository,
    nodes: &HashMap<usize, EntityId>,
    record: &Record,
    entity_type: EntityType,
) -> Result<(), FileError> {
    let numbers = record.planar_node_numbers();
    let resolved: Option<Vec<EntityId>> = numbers
        .iter()
        .map(|n| n.and_then(|n| nodes.get(&n).copied()))
        .collect();
    let Some(resolved) = resolved else {
        tracing::warn!(
            "Skipping {} {}: references a node that is not in the file",
            entity_type.name(),
            record.id().unwrap_or(record.index)
        );
        return Ok(());
    };

    let planar = Planar::new(resolved);
    let kind = match entity_type {
        EntityType::Wall => EntityKind::Wall(planar),
        EntityType::ShearWall => EntityKind::ShearWall(planar),
        _ => EntityKind::Floor(planar),
    };
    let mut entity = Entity::new(kind);
    record.fill(&mut entity)?;
    if let Err(e) = staged.add(entity) {
        tracing::warn!(
            "Skipping {} {}: {}",
            entity_type.name(),
            record.id().unwrap_or(record.index),
            e
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zframe_core::entity::SpanDirection;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// 4 个节点、2 根梁、1 块楼板
    fn sample() -> Repository {
        let mut repo = Repository::new();
        let n: Vec<EntityId> = [
            p(0.0, 0.0, 3.0),
            p(6.0, 0.0, 3.0),
            p(6.0, 4.0, 3.0),
            p(0.0, 4.0, 3.0),
        ]
        .into_iter()
        .map(|pt| repo.add_node(pt))
        .collect();
        let beam = repo.add_beam(n[1], n[0]).expect("beam");
        repo.add_beam(n[1], n[2]).expect("beam");
        repo.apply_properties(beam, &[("section".to_string(), "H400x200 <A&B>".to_string())])
            .expect("section");
        let floor = repo
            .add(Entity::new(EntityKind::Floor(Planar::new(n.clone()))))
            .expect("floor");
        repo.set_span_direction(floor, SpanDirection::Y).expect("span");
        repo.set_selected(n[2], true);
        repo.add_layer(Layer::new("2F", 3.0)).expect("layer");
        repo.add_layer(Layer::new("1F", 0.0)).expect("layer");
        repo
    }

    fn member_positions(repo: &Repository) -> Vec<(Point3, Point3)> {
        repo.members()
            .filter_map(|(_, e)| e.kind.as_member())
            .filter_map(|m| Some((repo.position(m.end_a)?, repo.position(m.end_b)?)))
            .collect()
    }

    fn planar_positions(repo: &Repository) -> Vec<Vec<Point3>> {
        repo.planars()
            .filter_map(|(_, e)| e.kind.as_planar())
            .map(|pl| pl.nodes.iter().filter_map(|n| repo.position(*n)).collect())
            .collect()
    }

    #[test]
    fn test_round_trip() {
        let repo = sample();
        let text = encode(&repo);
        let decoded = decode(&text).expect("decode");

        let positions = |r: &Repository| r.nodes().map(|(_, n)| n.position).collect::<Vec<_>>();
        assert_eq!(positions(&decoded), positions(&repo));
        assert_eq!(member_positions(&decoded), member_positions(&repo));
        assert_eq!(planar_positions(&decoded), planar_positions(&repo));

        let (_, beam) = decoded.members().next().expect("beam");
        assert_eq!(
            beam.kind.as_member().map(|m| m.section.as_str()),
            Some("H400x200 <A&B>")
        );
        let (_, floor) = decoded.planars().next().expect("floor");
        assert_eq!(floor.kind.as_planar().map(|f| f.span), Some(SpanDirection::Y));
        assert_eq!(decoded.selected().len(), 1);

        let names: Vec<&str> = decoded
            .layers()
            .layers()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, ["1F", "2F"]);

        // 再编码结果相同
        assert_eq!(encode(&decoded), text);
    }

    #[test]
    fn test_free_text_fields_round_trip() {
        let mut repo = Repository::new();
        let a = repo.add_node(p(0.0, 0.0, 0.0));
        let b = repo.add_node(p(5.0, 0.0, 0.0));
        let c = repo.add_node(p(5.0, 5.0, 0.0));
        let sections = ["H400\nx200", "  padded "];
        for (end, section) in [b, c].into_iter().zip(sections) {
            let beam = repo.add_beam(a, end).expect("beam");
            repo.apply_properties(beam, &[("section".to_string(), section.to_string())])
                .expect("section");
        }
        repo.add_layer(Layer::new(" 1F\t", 0.0)).expect("layer");

        let text = encode(&repo);
        assert!(text.ends_with("\n</model>\n"));
        assert!(text.lines().all(|line| line.starts_with('<') || line.starts_with("  ")));

        let decoded = decode(&text).expect("decode");
        let mut decoded_sections: Vec<String> = decoded
            .members()
            .filter_map(|(_, e)| e.kind.as_member())
            .map(|m| m.section.clone())
            .collect();
        decoded_sections.sort();
        let mut expected: Vec<String> = sections.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(decoded_sections, expected);
        assert_eq!(decoded.layers().layers()[0].name, " 1F\t");
        assert_eq!(encode(&decoded), text);
    }

    #[test]
    fn test_duplicate_node_id_keeps_first_record() {
        let text = r#"<model>
  <record type="zframe.model.Node"><field name="id">0</field><field name="position">0 0 0</field></record>
  <record type="zframe.model.Node"><field name="id">0</field><field name="position">9 9 9</field></record>
  <record type="zframe.model.Node"><field name="id">1</field><field name="position">4 0 0</field></record>
  <record type="zframe.model.Beam"><field name="id">0</field><field name="end_a">0</field><field name="end_b">1</field></record>
</model>"#;
        let repo = decode(text).expect("decode");
        assert_eq!(repo.node_count(), 2);
        let (_, beam) = repo.members().next().expect("beam");
        let ends = beam.kind.as_member().expect("member");
        let mut xs = [ends.end_a, ends.end_b].map(|n| repo.position(n).map(|pt| pt.x));
        xs.sort_by(|l, r| l.partial_cmp(r).unwrap_or(std::cmp::Ordering::Equal));
        assert_eq!(xs, [Some(0.0), Some(4.0)]);
    }

    #[test]
    fn test_encoded_text_shape() {
        let mut repo = Repository::new();
        repo.add_node(p(1.0, 2.0, 0.0));
        let text = encode(&repo);
        assert_eq!(
            text,
            "<model>\n  <record type=\"zframe.model.Node\">\n    <field name=\"id\">0</field>\n    <field name=\"selected\">false</field>\n    <field name=\"position\">1 2 0</field>\n  </record>\n</model>\n"
        );
    }

    const LEGACY: &str = r#"
<model>
  <record type="frame.Node"><field name="id">7</field><field name="position">0 0 0</field></record>
  <record type="frame.Node"><field name="id">3</field><field name="position">0 0 3</field></record>
  <record type="frame.Node"><field name="id">4</field><field name="position">5 0 3</field></record>
  <record type="frame.Column"><field name="id">0</field><field name="end_a">3</field><field name="end_b">7</field></record>
  <record type="frame.FrameType"><field name="id">0</field><field name="name">C1</field></record>
  <record type="frame.Layer"><field name="name">1F</field><field name="elevation">0</field></record>
  <record type="frame.Truss"><field name="id">0</field></record>
</model>
"#;

    #[test]
    fn test_legacy_type_names() {
        let repo = decode(LEGACY).expect("decode");
        assert_eq!(repo.node_count(), 3);
        assert_eq!(repo.member_count(), 1);
        assert_eq!(repo.layers().len(), 1);

        let (_, column) = repo.members().next().expect("column");
        assert_eq!(column.entity_type(), EntityType::Column);
        // 端点按规范顺序重新排列，并记录交换
        let member = column.kind.as_member().expect("member");
        assert_eq!(repo.position(member.end_a), Some(p(0.0, 0.0, 0.0)));
        assert!(member.ends_swapped);

        // 写出时只用当前写法
        let text = encode(&repo);
        assert!(text.contains("zframe.model.Column"));
        assert!(!text.contains("\"frame."));
        assert!(!text.contains("FrameType"));
    }

    #[test]
    fn test_planar_with_missing_node_is_skipped() {
        let text = r#"<model>
  <record type="zframe.model.Node"><field name="id">0</field><field name="position">0 0 0</field></record>
  <record type="zframe.model.Node"><field name="id">1</field><field name="position">4 0 0</field></record>
  <record type="zframe.model.Node"><field name="id">2</field><field name="position">4 4 0</field></record>
  <record type="zframe.model.Beam"><field name="id">0</field><field name="end_a">0</field><field name="end_b">1</field></record>
  <record type="zframe.model.Floor"><field name="id">0</field><field name="node_count">3</field>
    <field name="node_0">0</field><field name="node_1">1</field><field name="node_2">2</field></record>
  <record type="zframe.model.Floor"><field name="id">1</field><field name="node_count">3</field>
    <field name="node_0">0</field><field name="node_1">1</field><field name="node_2">99</field></record>
</model>"#;
        let repo = decode(text).expect("decode");
        assert_eq!(repo.node_count(), 3);
        assert_eq!(repo.member_count(), 1);
        assert_eq!(repo.planar_count(), 1);
    }

    #[test]
    fn test_member_with_missing_node_fails_whole_decode() {
        let text = r#"<model>
  <record type="zframe.model.Node"><field name="id">0</field><field name="position">0 0 0</field></record>
  <record type="zframe.model.Beam"><field name="id">5</field><field name="end_a">0</field><field name="end_b">9</field></record>
</model>"#;
        let mut repo = sample();
        let before = repo.len();
        match decode_into(&mut repo, text) {
            Err(FileError::MissingNode { kind, record, node }) => {
                assert_eq!((kind, record, node), ("Beam", 5, 9));
            }
            other => panic!("expected missing node error, got {other:?}"),
        }
        // 原文档不受影响
        assert_eq!(repo.len(), before);
    }

    #[test]
    fn test_unknown_fields_and_elements_are_ignored() {
        let text = r#"<model>
  <!-- exported by an older build -->
  <record type="zframe.model.Node">
    <field name="id">0</field>
    <field name="color">red</field>
    <note>ignored</note>
    <field name="position">1 1 1</field>
  </record>
</model>"#;
        let repo = decode(text).expect("decode");
        assert_eq!(repo.nodes().next().map(|(_, n)| n.position), Some(p(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        assert!(matches!(
            decode("<drawing></drawing>"),
            Err(FileError::InvalidFormat(_))
        ));
        assert!(matches!(decode("<model>"), Err(FileError::Parse { .. })));
    }
}
