/// HTML element and attribute helpers for the publication transform.
use crate::ast::AttributeValue;
use indexmap::IndexMap;

/// Void elements: cannot have children or a closing tag.
/// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Attributes whose values accumulate instead of being replaced.
const MULTI_VALUE_ATTRIBUTES: &[&str] = &["class", "style"];

/// Binding labels that target the component itself rather than an attribute.
pub const RESERVED_PROPERTIES: &[&str] = &["innerHTML", "condition", "condition2", "__data"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_multi_value_attribute(name: &str) -> bool {
    MULTI_VALUE_ATTRIBUTES.contains(&name)
}

/// A binding label is an attribute name unless it is reserved
pub fn is_attribute(label: &str) -> bool {
    !RESERVED_PROPERTIES.contains(&label)
}

/// Attribute produced by a binding, its value is Liquid source
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedAttribute {
    pub label: String,
    pub value: String,
}

impl ComputedAttribute {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Escape a static attribute value for a double quoted attribute
pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Render one attribute, empty for `false`
pub fn make_attribute(name: &str, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Flag(true) => name.to_string(),
        AttributeValue::Flag(false) => String::new(),
        AttributeValue::Text(text) => format!("{}=\"{}\"", name, text),
    }
}

/// Merge static attributes with computed ones, in first-seen order.
/// `class` and `style` concatenate, other attributes are overridden.
pub fn build_attributes(base: &IndexMap<String, AttributeValue>, computed: &[ComputedAttribute]) -> String {
    let mut merged: IndexMap<String, AttributeValue> = base.clone();

    for attribute in computed {
        let value = AttributeValue::Text(attribute.value.clone());
        match merged.get_mut(&attribute.label) {
            Some(AttributeValue::Text(existing)) if is_multi_value_attribute(&attribute.label) => {
                if !existing.is_empty() {
                    existing.push(' ');
                }
                existing.push_str(&attribute.value);
            }
            Some(existing) => *existing = value,
            None => {
                merged.insert(attribute.label.clone(), value);
            }
        }
    }

    merged
        .iter()
        .map(|(name, value)| make_attribute(name, value))
        .filter(|attribute| !attribute.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_attributes_override_and_concat() {
        let mut base = IndexMap::new();
        base.insert("href".to_string(), AttributeValue::from("original-value"));
        base.insert("class".to_string(), AttributeValue::from("original-value"));
        let computed = vec![
            ComputedAttribute::new("href", "new-value"),
            ComputedAttribute::new("class", "new-value"),
        ];
        assert_eq!(
            build_attributes(&base, &computed),
            r#"href="new-value" class="original-value new-value""#
        );
    }

    #[test]
    fn test_build_attributes_flags() {
        let mut base = IndexMap::new();
        base.insert("disabled".to_string(), AttributeValue::Flag(true));
        base.insert("hidden".to_string(), AttributeValue::Flag(false));
        base.insert("title".to_string(), AttributeValue::from("t"));
        assert_eq!(build_attributes(&base, &[]), r#"disabled title="t""#);
    }

    #[test]
    fn test_build_attributes_new_in_order() {
        let base = IndexMap::new();
        let computed = vec![
            ComputedAttribute::new("style", "color: red"),
            ComputedAttribute::new("style", "margin: 0"),
            ComputedAttribute::new("src", "a.png"),
        ];
        assert_eq!(
            build_attributes(&base, &computed),
            r#"style="color: red margin: 0" src="a.png""#
        );
    }

    #[test]
    fn test_reserved_labels() {
        assert!(!is_attribute("innerHTML"));
        assert!(!is_attribute("__data"));
        assert!(is_attribute("href"));
        assert!(is_void_element("IMG"));
        assert!(!is_void_element("div"));
    }
}
