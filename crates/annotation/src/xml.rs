//! VOC-style annotation XML reader

use crate::{AnnotatedObject, Annotation, BoundingBox};
use cellnet_common::{DatasetError, Result};
use roxmltree::{Document, Node};

/// Parse `<annotation>` XML with `size/{width,height}` and zero or more
/// `object` entries carrying `name` and `bndbox/{xmin,ymin,xmax,ymax}`.
pub fn parse_annotation(xml_text: &str) -> Result<Annotation> {
    let doc = Document::parse(xml_text)
        .map_err(|e| DatasetError::MalformedAnnotation(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    let size = child(root, "size").ok_or_else(|| missing("size"))?;
    let width = parse_dimension(size, "width")?;
    let height = parse_dimension(size, "height")?;

    let filename = child(root, "filename")
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let objects = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "object")
        .enumerate()
        .map(|(idx, node)| parse_object(idx, node))
        .collect::<Result<Vec<_>>>()?;

    Ok(Annotation {
        filename,
        width,
        height,
        objects,
    })
}

fn parse_object(idx: usize, node: Node) -> Result<AnnotatedObject> {
    let name = child_text(node, "name")
        .ok_or_else(|| missing(&format!("object[{idx}]/name")))?
        .to_string();
    let bndbox = child(node, "bndbox").ok_or_else(|| missing(&format!("object[{idx}]/bndbox")))?;

    let coord = |tag: &str| -> Result<f64> {
        let field = format!("object[{idx}]/bndbox/{tag}");
        let text = child_text(bndbox, tag).ok_or_else(|| missing(&field))?;
        let value: f64 = text.trim().parse().map_err(|_| {
            DatasetError::MalformedAnnotation(format!("{field}: not a number: {text:?}"))
        })?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DatasetError::MalformedAnnotation(format!(
                "{field}: not finite: {text:?}"
            )))
        }
    };

    Ok(AnnotatedObject {
        name,
        bbox: BoundingBox::new(coord("xmin")?, coord("ymin")?, coord("xmax")?, coord("ymax")?),
    })
}

fn parse_dimension(size: Node, tag: &str) -> Result<u32> {
    let text = child_text(size, tag).ok_or_else(|| missing(&format!("size/{tag}")))?;
    text.trim().parse().map_err(|_| {
        DatasetError::MalformedAnnotation(format!("size/{tag}: not an integer: {text:?}"))
    })
}

fn child<'a, 'input>(parent: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn child_text<'a>(parent: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(parent, tag).and_then(|n| n.text())
}

fn missing(field: &str) -> DatasetError {
    DatasetError::MalformedAnnotation(format!("missing {field}"))
}
