//! Parsing of WebDAV `PROPFIND` multistatus responses.

use anyhow::{Context, Result, bail};
use roxmltree::{Document, Node};

const DAV_NS: &str = "DAV:";

/// Request body asking for the properties [`PropfindEntry`] understands.
pub const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:getlastmodified/>
    <d:getcontentlength/>
    <d:getcontenttype/>
    <d:getetag/>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

/// One `<d:response>` element, reduced to its `200 OK` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropfindEntry {
  /// Raw (still percent-encoded) href.
  pub href: String,
  pub last_modified: Option<String>,
  pub content_length: Option<u64>,
  pub content_type: Option<String>,
  /// Entity tag with the surrounding quotes removed.
  pub etag: Option<String>,
  pub is_collection: bool,
}

/// Parse a multistatus document into its response entries.
///
/// Responses without any successful propstat (e.g., per-member 404s) are
/// dropped.
///
/// # Errors
/// Returns an error when the body is not XML or its root is not
/// `DAV:multistatus`.
pub fn parse_multistatus(xml: &str) -> Result<Vec<PropfindEntry>> {
  let document = Document::parse(xml).context("Failed to parse WebDAV multistatus response")?;
  let root = document.root_element();

  if !is_dav(root, "multistatus") {
    bail!(
      "Expected a DAV:multistatus document, found <{}>",
      root.tag_name().name()
    );
  }

  Ok(
    root
      .children()
      .filter(|node| is_dav(*node, "response"))
      .filter_map(parse_response)
      .collect(),
  )
}

fn parse_response(response: Node) -> Option<PropfindEntry> {
  let href = dav_child(response, "href").and_then(text_of)?;

  let mut entry = PropfindEntry {
    href,
    ..PropfindEntry::default()
  };
  let mut has_ok_propstat = false;

  for propstat in response.children().filter(|node| is_dav(*node, "propstat")) {
    let status_ok = dav_child(propstat, "status")
      .and_then(text_of)
      .is_some_and(|status| status.split_whitespace().nth(1) == Some("200"));
    if !status_ok {
      continue;
    }
    has_ok_propstat = true;

    let Some(prop) = dav_child(propstat, "prop") else {
      continue;
    };

    for property in prop.children().filter(|node| node.tag_name().namespace() == Some(DAV_NS)) {
      match property.tag_name().name() {
        "getlastmodified" => entry.last_modified = text_of(property),
        "getcontentlength" => entry.content_length = text_of(property).and_then(|len| len.parse().ok()),
        "getcontenttype" => entry.content_type = text_of(property),
        "getetag" => entry.etag = text_of(property).map(|etag| etag.trim_matches('"').to_string()),
        "resourcetype" => entry.is_collection = property.children().any(|node| is_dav(node, "collection")),
        _ => {}
      }
    }
  }

  has_ok_propstat.then_some(entry)
}

/// Human-readable reason from a WebDAV error body.
///
/// ownCloud answers failures with a Sabre `<d:error>` document whose
/// `<s:message>` explains the problem; short plain-text bodies are used as-is.
pub fn error_message(body: &str) -> Option<String> {
  let body = body.trim();
  if body.is_empty() {
    return None;
  }

  if let Ok(document) = Document::parse(body) {
    return document
      .descendants()
      .find(|node| node.is_element() && node.tag_name().name() == "message")
      .and_then(text_of);
  }

  (body.len() <= 200 && !body.starts_with('<')).then(|| body.to_string())
}

fn is_dav(node: Node, name: &str) -> bool {
  node.is_element() && node.tag_name().namespace() == Some(DAV_NS) && node.tag_name().name() == name
}

fn dav_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
  node.children().find(|child| is_dav(*child, name))
}

fn text_of(node: Node) -> Option<String> {
  node
    .text()
    .map(str::trim)
    .filter(|text| !text.is_empty())
    .map(str::to_string)
}
