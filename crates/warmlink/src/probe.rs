//! Capability probe

use warmlink_dom::Document;

/// Whether `<link rel=prefetch>` is natively supported.
///
/// Tests `relList.supports("prefetch")` on a throwaway link element that is
/// never attached to the document. Missing `relList` or a missing
/// `supports` function both count as unsupported.
pub fn has_prefetch(document: &Document) -> bool {
    let link = document.create_element("link");
    document
        .rel_list(link)
        .and_then(|list| list.supports("prefetch"))
        .unwrap_or(false)
}
