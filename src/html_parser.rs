use anyhow::{Context, Result};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::rc::Rc;
use tracing::debug;
use url::Url;

/// A parsed page whose element attributes can be rewritten in place.
pub struct PageDocument {
    dom: RcDom,
}

impl PageDocument {
    pub fn parse(html_content: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html_content);
        inline_template_contents(&dom.document);
        Self { dom }
    }

    pub fn serialize(&self) -> Result<String> {
        let mut bytes = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut bytes, &document, SerializeOpts::default())
            .context("Failed to serialize document")?;
        String::from_utf8(bytes).context("Serialized document is not valid UTF-8")
    }

    /// All element nodes in document order.
    pub fn elements(&self) -> Vec<Handle> {
        let mut elements = Vec::new();
        collect_elements(&self.dom.document, &mut elements);
        elements
    }
}

/// The tree builder keeps `<template>` content in a separate fragment that is
/// neither walked nor serialized; move it under the template element itself.
fn inline_template_contents(node: &Handle) {
    if let NodeData::Element { ref template_contents, .. } = node.data {
        if let Some(contents) = template_contents.borrow_mut().take() {
            let moved: Vec<Handle> = contents.children.borrow_mut().drain(..).collect();
            for child in &moved {
                child.parent.set(Some(Rc::downgrade(node)));
            }
            node.children.borrow_mut().extend(moved);
        }
    }
    for child in node.children.borrow().iter() {
        inline_template_contents(child);
    }
}

fn collect_elements(node: &Handle, elements: &mut Vec<Handle>) {
    if let NodeData::Element { .. } = node.data {
        elements.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        collect_elements(child, elements);
    }
}

pub fn tag_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

pub fn get_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Replaces the value of an existing attribute. Returns `false` when the node
/// has no such attribute.
pub fn set_attr(node: &Handle, attr_name: &str, value: &str) -> bool {
    match node.data {
        NodeData::Element { ref attrs, .. } => {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|attr| &*attr.name.local == attr_name) {
                Some(attr) => {
                    attr.value = value.into();
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Relation matching policy for stylesheet links: a case-insensitive
/// substring test, so `alternate stylesheet` and `StyleSheet` both qualify.
pub fn is_stylesheet_rel(rel: &str) -> bool {
    rel.to_ascii_lowercase().contains("stylesheet")
}

/// A `<link>` element referencing an external stylesheet.
#[derive(Debug, Clone)]
pub struct StylesheetLink {
    pub node: Handle,
    pub href: String,
}

/// Outcome of the `src` absolutization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRewrite {
    pub rewritten: usize,
    pub skipped: Vec<String>,
}

#[derive(Clone)]
pub struct HtmlParser {
    base_url: Url,
}

impl HtmlParser {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Failed to parse base URL: {}", base_url))?;

        Ok(Self { base_url })
    }

    pub fn from_url(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Resolves a reference the way a browser would: absolute URLs pass
    /// through, scheme-relative and path-relative ones are joined to the base.
    pub fn resolve_url(&self, url: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(url)
    }

    /// Stylesheet links in document order.
    pub fn stylesheet_links(&self, document: &PageDocument) -> Vec<StylesheetLink> {
        document
            .elements()
            .into_iter()
            .filter(|node| tag_name(node).as_deref() == Some("link"))
            .filter(|node| get_attr(node, "rel").map_or(false, |rel| is_stylesheet_rel(&rel)))
            .filter_map(|node| {
                let href = get_attr(&node, "href")?;
                if href.trim().is_empty() {
                    return None;
                }
                Some(StylesheetLink { node, href })
            })
            .collect()
    }

    /// Rewrites every `src` attribute to its absolute form. Values that do not
    /// resolve are left as they are.
    pub fn absolutize_sources(&self, document: &PageDocument) -> SourceRewrite {
        let mut report = SourceRewrite::default();

        for node in document.elements() {
            let Some(src) = get_attr(&node, "src") else {
                continue;
            };
            match self.resolve_url(&src) {
                Ok(absolute) => {
                    set_attr(&node, "src", absolute.as_str());
                    report.rewritten += 1;
                }
                Err(e) => {
                    debug!(src = %src, error = %e, "leaving unresolvable src untouched");
                    report.skipped.push(src);
                }
            }
        }

        report
    }
}
