use crate::filter::AssetFilter;
use crate::results::{
    AssetKind, AssetReference, DiscoveredAssets, ResolvedAsset, SkipReason, SkippedElement,
};
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;

/// Elements that may carry an asset reference, in document order
///
/// `<link>` elements only count when they load a stylesheet. Both discovery
/// and rewriting number candidates through this function so that an
/// `element_index` points at the same element in either pass.
fn candidate_elements(doc: &Html) -> Vec<(ElementRef<'_>, AssetKind)> {
    let selector = Selector::parse("img, link, script").unwrap();
    doc.select(&selector)
        .filter_map(|element| {
            let kind = AssetKind::from_tag(element.value().name())?;
            if kind == AssetKind::Stylesheet && !is_stylesheet(&element) {
                return None;
            }
            Some((element, kind))
        })
        .collect()
}

/// Check whether a `<link>` element's rel tokens include `stylesheet`
fn is_stylesheet(element: &ElementRef) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .unwrap_or(false)
}

/// Finds every image, stylesheet and script reference in the markup
///
/// Elements without a usable URL attribute are reported in `skipped` and
/// logged as warnings; they never fail the scan.
pub fn discover_assets(html: &str, filter: &AssetFilter) -> DiscoveredAssets {
    let doc = Html::parse_document(html);
    let mut discovered = DiscoveredAssets::default();

    for (element_index, (element, kind)) in candidate_elements(&doc).into_iter().enumerate() {
        let attribute = kind.attribute();
        let value = element.value().attr(attribute).unwrap_or_default();

        if let Some(reason) = filter.check(value) {
            match reason {
                SkipReason::MissingAttribute => ::log::warn!(
                    "Element {} at index {} does not have a valid {} attribute",
                    kind.tag(),
                    element_index,
                    attribute
                ),
                SkipReason::NotFetchable => ::log::warn!(
                    "Element {} at index {} has a non-fetchable {}: {}",
                    kind.tag(),
                    element_index,
                    attribute,
                    truncate(value, 60)
                ),
                SkipReason::Excluded => ::log::warn!(
                    "Element {} at index {} excluded by pattern: {}",
                    kind.tag(),
                    element_index,
                    value
                ),
            }
            discovered.skipped.push(SkippedElement {
                element_index,
                kind,
                reason,
            });
            continue;
        }

        discovered.references.push(AssetReference {
            element_index,
            kind,
            original_url: value.to_string(),
        });
    }

    ::log::debug!(
        "HTML parser found {} asset references, skipped {}",
        discovered.references.len(),
        discovered.skipped.len()
    );

    discovered
}

/// Points each resolved asset's attribute at its local path and re-serializes the document
pub fn rewrite_assets(html: &str, assets: &[ResolvedAsset]) -> String {
    let mut doc = Html::parse_document(html);
    let by_index: HashMap<usize, &ResolvedAsset> = assets
        .iter()
        .map(|asset| (asset.reference.element_index, asset))
        .collect();

    let targets: Vec<_> = candidate_elements(&doc)
        .into_iter()
        .enumerate()
        .filter_map(|(index, (element, _))| {
            by_index.get(&index).map(|asset| (element.id(), *asset))
        })
        .collect();

    if targets.len() != by_index.len() {
        ::log::warn!(
            "Markup changed between scans: {} of {} references located",
            targets.len(),
            by_index.len()
        );
    }

    for (node_id, asset) in targets {
        if let Some(mut node) = doc.tree.get_mut(node_id) {
            if let Node::Element(element) = node.value() {
                set_attribute(element, asset.reference.kind.attribute(), &asset.local_path);
            }
        }
    }

    doc.html()
}

/// Replaces the value of an existing attribute
fn set_attribute(element: &mut Element, name: &str, value: &str) {
    for (attr_name, attr_value) in element.attrs.iter_mut() {
        if &*attr_name.local == name {
            *attr_value = value.into();
        }
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &value[..end]),
        None => value.to_string(),
    }
}
